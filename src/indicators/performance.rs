//! Composite Performance Index
//!
//! 登録イベント数と更新イベント数の合算から地域のサービス拠点負荷を
//! 推定する。最大活動量の地域を 100 とする正規化の後、固定閾値で
//! 3段階の稼働ティアへ分類する。

use crate::aggregate::count_by_region;
use crate::error::Result;
use crate::table::{Record, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// 稼働ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    /// スコア 80 以上: 拡張が必要な高負荷
    HighLoad,
    /// スコア 40 以上 80 未満: 適正稼働
    Optimal,
    /// スコア 40 未満: 低稼働
    UnderUtilized,
}

impl PerformanceTier {
    /// スコアからティアを判定（境界は 80 と 40、いずれも含む）
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            PerformanceTier::HighLoad
        } else if score >= 40.0 {
            PerformanceTier::Optimal
        } else {
            PerformanceTier::UnderUtilized
        }
    }
}

impl std::fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PerformanceTier::HighLoad => "High Load (Expansion Needed)",
            PerformanceTier::Optimal => "Optimal",
            PerformanceTier::UnderUtilized => "Under-Utilized",
        };
        write!(f, "{label}")
    }
}

/// 稼働パフォーマンス指標の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    /// 地域キー
    pub region: Region,
    /// 登録イベント数
    pub enrollment_vol: f64,
    /// 更新イベント数
    pub update_vol: f64,
    /// 合計活動量
    pub total_activity: f64,
    /// 最大比スコア（0〜100、小数1桁へ丸め）
    pub performance_score: f64,
    /// 稼働ティア
    pub status: PerformanceTier,
}

/// 稼働パフォーマンス指標を計算する
///
/// 地域で外部結合し、片側欠損はゼロ扱い。スコア降順で返す。
pub fn performance(enrollment: &[Record], update: &[Record]) -> Result<Vec<PerformanceRow>> {
    let enrollment_counts = count_by_region(enrollment)?;
    let update_counts = count_by_region(update)?;

    // 外部結合: どちらかに現れる地域すべて
    let regions: BTreeSet<Region> = enrollment_counts
        .keys()
        .chain(update_counts.keys())
        .cloned()
        .collect();

    let mut rows: Vec<PerformanceRow> = regions
        .into_iter()
        .map(|region| {
            let enrollment_vol = enrollment_counts.get(&region).copied().unwrap_or(0.0);
            let update_vol = update_counts.get(&region).copied().unwrap_or(0.0);
            PerformanceRow {
                region,
                enrollment_vol,
                update_vol,
                total_activity: enrollment_vol + update_vol,
                performance_score: 0.0,
                status: PerformanceTier::UnderUtilized,
            }
        })
        .collect();

    let max_activity = rows
        .iter()
        .map(|r| r.total_activity)
        .fold(f64::NEG_INFINITY, f64::max);
    for row in &mut rows {
        let score = row.total_activity / max_activity * 100.0;
        row.performance_score = (score * 10.0).round() / 10.0;
        row.status = PerformanceTier::from_score(row.performance_score);
    }

    rows.sort_by(|a, b| {
        b.performance_score
            .partial_cmp(&a.performance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    debug!(regions = rows.len(), "performance index computed");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn rows_for(state: &str, district: &str, count: usize) -> Vec<Record> {
        (0..count)
            .map(|_| Record::new(Region::new(state, district), None))
            .collect()
    }

    #[test]
    fn test_max_activity_region_scores_exactly_100() {
        let mut enroll = rows_for("Kerala", "Idukki", 60);
        enroll.extend(rows_for("Bihar", "Patna", 10));
        let mut update = rows_for("Kerala", "Idukki", 40);
        update.extend(rows_for("Bihar", "Patna", 10));

        let rows = performance(&enroll, &update).unwrap();
        assert_eq!(rows[0].region.district, "Idukki");
        assert_eq!(rows[0].performance_score, 100.0);
        assert_eq!(rows[0].status, PerformanceTier::HighLoad);
    }

    #[test]
    fn test_outer_join_missing_side_counts_zero() {
        let enroll = rows_for("Kerala", "Idukki", 50);
        let update = rows_for("Bihar", "Patna", 50);

        let rows = performance(&enroll, &update).unwrap();
        assert_eq!(rows.len(), 2);
        let idukki = rows.iter().find(|r| r.region.district == "Idukki").unwrap();
        assert_eq!(idukki.update_vol, 0.0);
        assert_eq!(idukki.total_activity, 50.0);
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(PerformanceTier::from_score(100.0), PerformanceTier::HighLoad);
        assert_eq!(PerformanceTier::from_score(80.0), PerformanceTier::HighLoad);
        assert_eq!(PerformanceTier::from_score(79.9), PerformanceTier::Optimal);
        assert_eq!(PerformanceTier::from_score(40.0), PerformanceTier::Optimal);
        assert_eq!(PerformanceTier::from_score(39.9), PerformanceTier::UnderUtilized);
        assert_eq!(PerformanceTier::from_score(0.0), PerformanceTier::UnderUtilized);
    }

    #[test]
    fn test_score_rounded_to_one_decimal() {
        let mut enroll = rows_for("Kerala", "Idukki", 3);
        enroll.extend(rows_for("Bihar", "Patna", 7));
        let rows = performance(&enroll, &enroll.clone()).unwrap();
        let idukki = rows.iter().find(|r| r.region.district == "Idukki").unwrap();
        // 6/14 * 100 = 42.857... → 42.9
        assert_eq!(idukki.performance_score, 42.9);
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(
            PerformanceTier::HighLoad.to_string(),
            "High Load (Expansion Needed)"
        );
        assert_eq!(PerformanceTier::Optimal.to_string(), "Optimal");
        assert_eq!(PerformanceTier::UnderUtilized.to_string(), "Under-Utilized");
    }

    #[test]
    fn test_empty_table_fails() {
        let enroll = rows_for("Kerala", "Idukki", 5);
        let err = performance(&enroll, &[]).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }
}

//! Continuity / Risk Index
//!
//! 幼児期登録量と年少期更新量の比から継続性リスクを推定する。
//! 登録が多いのに後年の更新が少ない地域ほどリスクが高い。
//! 縦断的な個人追跡ではなく、集計ベースの近似指標。

use super::{min_max_scores, DEMO_AGE_5_17, ENROLLMENT_AGE_0_5};
use crate::aggregate::sum_by_region;
use crate::error::{Error, Result};
use crate::table::{require_columns, Record, Region};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 継続性リスク指標の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityRiskRow {
    /// 地域キー
    pub region: Region,
    /// 幼児期（0〜5歳）登録量
    pub enrollment_vol: f64,
    /// 年少期（5〜17歳）更新量
    pub update_vol: f64,
    /// 継続率: update_vol / (enrollment_vol + 1)
    pub continuity_ratio: f64,
    /// 逆数リスク: 1 / (continuity_ratio + 0.001)
    pub risk_index: f64,
    /// min-max 正規化スコア（0〜100）
    pub risk_score: f64,
}

/// 継続性リスク指標を計算する
///
/// 両テーブルを地域で内部結合し、リスクスコア降順で返す。
pub fn continuity_risk(
    enrollment: &[Record],
    demographic: &[Record],
) -> Result<Vec<ContinuityRiskRow>> {
    require_columns(enrollment, "enrollment", &[ENROLLMENT_AGE_0_5])?;
    require_columns(demographic, "demographic", &[DEMO_AGE_5_17])?;

    let enrollment_by_region = sum_by_region(enrollment, ENROLLMENT_AGE_0_5)?;
    let updates_by_region = sum_by_region(demographic, DEMO_AGE_5_17)?;

    // 内部結合: 両テーブルに現れる地域のみ
    let mut rows: Vec<ContinuityRiskRow> = enrollment_by_region
        .into_iter()
        .filter_map(|(region, enrollment_vol)| {
            updates_by_region.get(&region).map(|update_vol| {
                let continuity_ratio = update_vol / (enrollment_vol + 1.0);
                let risk_index = 1.0 / (continuity_ratio + 0.001);
                ContinuityRiskRow {
                    region,
                    enrollment_vol,
                    update_vol: *update_vol,
                    continuity_ratio,
                    risk_index,
                    risk_score: 0.0,
                }
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(Error::InsufficientData(
            "enrollment and demographic tables share no regions".to_string(),
        ));
    }

    let indices: Vec<f64> = rows.iter().map(|r| r.risk_index).collect();
    for (row, score) in rows.iter_mut().zip(min_max_scores(&indices)) {
        row.risk_score = score;
    }

    rows.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    debug!(regions = rows.len(), "continuity risk index computed");
    Ok(rows)
}

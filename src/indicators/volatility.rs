//! Volatility / Migration Index
//!
//! 日次更新件数の分散から地域ごとの変動性を測る。短期間に更新が
//! 集中する地域は移住シグナルの候補。スコアは地域横断の Z-score。

use super::z_scores;
use crate::aggregate::{aggregate, sample_variance, GroupKey, Reduction};
use crate::error::Result;
use crate::table::{Record, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// 変動性指標の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityRow {
    /// 地域キー
    pub region: Region,
    /// 日次更新件数の標本分散
    pub raw_volatility: f64,
    /// 地域横断 Z-score（非有界、標準偏差ゼロなら 0.0）
    pub volatility_score: f64,
}

/// 変動性指標を計算する
///
/// 日付欠損行は日次集計の段階で捨てられる。活動日が1日だけの
/// 地域は分散 0.0 として扱う。スコア降順で返す。
pub fn volatility(demographic: &[Record]) -> Result<Vec<VolatilityRow>> {
    // 地域 × 日付の更新件数
    let daily = aggregate(
        demographic,
        &[GroupKey::State, GroupKey::District, GroupKey::Date],
        None,
        Reduction::Count,
    )?;

    let mut counts_by_region: BTreeMap<Region, Vec<f64>> = BTreeMap::new();
    for row in daily {
        if let Some(region) = row.group.region() {
            counts_by_region.entry(region).or_default().push(row.value);
        }
    }

    let mut rows: Vec<VolatilityRow> = counts_by_region
        .into_iter()
        .map(|(region, counts)| VolatilityRow {
            region,
            raw_volatility: sample_variance(&counts),
            volatility_score: 0.0,
        })
        .collect();

    let variances: Vec<f64> = rows.iter().map(|r| r.raw_volatility).collect();
    for (row, score) in rows.iter_mut().zip(z_scores(&variances)) {
        row.volatility_score = score;
    }

    rows.sort_by(|a, b| {
        b.volatility_score
            .partial_cmp(&a.volatility_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    debug!(regions = rows.len(), "volatility index computed");
    Ok(rows)
}

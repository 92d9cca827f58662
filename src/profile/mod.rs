//! Dataset Profiling
//!
//! データセットの概況把握。行数・列構成・日付範囲の要約と、
//! 時系列トレンドおよび州別分布のインサイト計算を提供する。
//! 図表の描画は対象外（提示層の責務）。

use crate::aggregate::{aggregate, sum_by_state, GroupKey, Reduction};
use crate::error::{Error, Result};
use crate::table::{column_names, distinct_regions, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 変化率がこの割合未満なら安定トレンドとみなす
const STABILITY_THRESHOLD_PCT: f64 = 1.0;

/// データセット要約
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// 行数
    pub rows: usize,
    /// 数値活動列の一覧
    pub columns: Vec<String>,
    /// 相異なる地域数
    pub regions: usize,
    /// 日付範囲（日付付き行が無ければ None）
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// トレンド方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    /// 増加
    Increasing,
    /// 減少
    Decreasing,
    /// 安定
    Stable,
}

/// 時系列トレンドのインサイト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendInsight {
    /// 期間始点から終点への変化率（%）
    pub change_pct: f64,
    /// トレンド方向
    pub direction: TrendDirection,
    /// ピーク日
    pub peak_date: NaiveDate,
    /// ピーク日の合計値
    pub peak_value: f64,
}

impl TrendInsight {
    /// 一行の説明文を生成
    pub fn headline(&self, value_column: &str) -> String {
        let verb = match self.direction {
            TrendDirection::Increasing => "increased",
            TrendDirection::Decreasing => "decreased",
            TrendDirection::Stable => "remained stable",
        };
        format!(
            "{} {} by {:.1}% over the period; peak on {} with {:.0} records",
            value_column,
            verb,
            self.change_pct.abs(),
            self.peak_date,
            self.peak_value
        )
    }
}

/// 州別分布のインサイト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionInsight {
    /// 最大寄与の州
    pub top_state: String,
    /// その州の合計値
    pub top_value: f64,
    /// 全体に占める割合（%、合計ゼロなら 0.0）
    pub share_pct: f64,
}

/// データセットを要約する
pub fn summarize(records: &[Record]) -> DatasetSummary {
    let dates: Vec<NaiveDate> = records.iter().filter_map(|r| r.date).collect();
    let date_range = match (dates.iter().min(), dates.iter().max()) {
        (Some(min), Some(max)) => Some((*min, *max)),
        _ => None,
    };
    DatasetSummary {
        rows: records.len(),
        columns: column_names(records).into_iter().collect(),
        regions: distinct_regions(records),
        date_range,
    }
}

/// 時系列トレンドのインサイトを計算する
///
/// 日付付き行を日次合計に集計し、始点→終点の変化率とピークを返す。
pub fn trend_insight(records: &[Record], value_column: &str) -> Result<TrendInsight> {
    let daily = aggregate(records, &[GroupKey::Date], Some(value_column), Reduction::Sum)?;
    // BTreeMap 由来なので日付昇順
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return Err(Error::InsufficientData(
            "no dated rows available for trend analysis".to_string(),
        ));
    };

    let change_pct = if first.value != 0.0 {
        (last.value - first.value) / first.value * 100.0
    } else {
        0.0
    };
    let direction = if change_pct.abs() < STABILITY_THRESHOLD_PCT {
        TrendDirection::Stable
    } else if change_pct > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    let peak = daily
        .iter()
        .max_by(|a, b| {
            a.value
                .partial_cmp(&b.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.group.date.cmp(&a.group.date))
        })
        .unwrap_or(first);
    let peak_date = peak.group.date.ok_or_else(|| {
        Error::InsufficientData("daily aggregation produced a dateless row".to_string())
    })?;

    debug!(days = daily.len(), change_pct, "trend insight computed");
    Ok(TrendInsight {
        change_pct,
        direction,
        peak_date,
        peak_value: peak.value,
    })
}

/// 州別分布のインサイトを計算する
pub fn distribution_insight(records: &[Record], value_column: &str) -> Result<DistributionInsight> {
    let by_state = sum_by_state(records, value_column)?;
    let total: f64 = by_state.values().sum();
    let (top_state, top_value) = by_state
        .into_iter()
        .max_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.cmp(&a.0))
        })
        .ok_or_else(|| Error::InsufficientData("no states present".to_string()))?;

    let share_pct = if total > 0.0 {
        top_value / total * 100.0
    } else {
        0.0
    };
    Ok(DistributionInsight {
        top_state,
        top_value,
        share_pct,
    })
}

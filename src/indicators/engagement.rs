//! Engagement Gap
//!
//! 州単位で年少層の人口統計更新量と成人層の生体更新量の乖離を測る。
//! ギャップは絶対差で、非有界値として返す（正規化しない）。

use super::{BIO_AGE_17_PLUS, DEMO_AGE_5_17};
use crate::aggregate::sum_by_state;
use crate::error::{Error, Result};
use crate::table::{require_columns, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 関与ギャップ指標の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementGapRow {
    /// 州識別子
    pub state: String,
    /// 年少層（5〜17歳）人口統計更新量
    pub demo_updates: f64,
    /// 成人層（17歳以上）生体更新量
    pub bio_updates: f64,
    /// 絶対差（非有界）
    pub engagement_gap: f64,
}

/// 関与ギャップ指標を計算する
///
/// 州で内部結合し、ギャップ降順で返す。
pub fn engagement_gap(
    demographic: &[Record],
    biometric: &[Record],
) -> Result<Vec<EngagementGapRow>> {
    require_columns(demographic, "demographic", &[DEMO_AGE_5_17])?;
    require_columns(biometric, "biometric", &[BIO_AGE_17_PLUS])?;

    let demo_by_state = sum_by_state(demographic, DEMO_AGE_5_17)?;
    let bio_by_state = sum_by_state(biometric, BIO_AGE_17_PLUS)?;

    let mut rows: Vec<EngagementGapRow> = demo_by_state
        .into_iter()
        .filter_map(|(state, demo_updates)| {
            bio_by_state.get(&state).map(|bio_updates| EngagementGapRow {
                state,
                demo_updates,
                bio_updates: *bio_updates,
                engagement_gap: (demo_updates - bio_updates).abs(),
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(Error::InsufficientData(
            "demographic and biometric tables share no states".to_string(),
        ));
    }

    rows.sort_by(|a, b| {
        b.engagement_gap
            .partial_cmp(&a.engagement_gap)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.state.cmp(&b.state))
    });
    debug!(states = rows.len(), "engagement gap computed");
    Ok(rows)
}

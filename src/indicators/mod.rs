//! Governance Indicators
//!
//! 地域レベルの複合指標エンジン。4つの独立した純粋計算
//! （継続性リスク・関与ギャップ・変動性・稼働パフォーマンス）を提供する。
//!
//! 共通方針:
//! - 必須列の欠損は `Schema` エラー（空テーブルを黙って返さない）
//! - 空入力は `InsufficientData` エラー
//! - 分母はゼロ保護（+1 または微小 ε）
//! - min-max 正規化の退化ケース（全値同一）は全スコア 0.0
//! - 主要スコアの降順で整列

mod continuity;
mod engagement;
mod performance;
mod volatility;

pub use continuity::{continuity_risk, ContinuityRiskRow};
pub use engagement::{engagement_gap, EngagementGapRow};
pub use performance::{performance, PerformanceRow, PerformanceTier};
pub use volatility::{volatility, VolatilityRow};

/// 登録テーブルの幼児コホート列
pub const ENROLLMENT_AGE_0_5: &str = "age_0_5";
/// 人口統計更新テーブルの年少コホート列
pub const DEMO_AGE_5_17: &str = "demo_age_5_17";
/// 生体更新テーブルの成人コホート列
pub const BIO_AGE_17_PLUS: &str = "bio_age_17_plus";

/// min-max 正規化で [0, 100] へ写像
///
/// 全値が同一の退化系列は全要素 0.0 を返す。
pub(crate) fn min_max_scores(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range * 100.0).collect()
}

/// Z-score 正規化
///
/// 分散分布の標準偏差がゼロの場合は NaN ではなく全要素 0.0。
pub(crate) fn z_scores(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev <= f64::EPSILON {
        return vec![0.0; n];
    }
    values.iter().map(|v| (v - mean) / std_dev).collect()
}

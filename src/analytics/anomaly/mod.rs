//! Volume Anomaly Detection
//!
//! 集計済み活動量系列に対する教師なし異常検知。
//!
//! ## 主要機能
//!
//! - **集計値の学習**: 集計行の値を1特徴量の観測点として扱う
//! - **Isolation Forest**: シード固定の分離木アンサンブルでスコアリング
//! - **ラベル付け**: contamination 比率に基づき異常行をフラグ
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use enrollment_insight::aggregate::{aggregate, GroupKey, Reduction};
//! use enrollment_insight::analytics::VolumeAnomalyDetector;
//!
//! # fn example(records: &[enrollment_insight::table::Record]) -> enrollment_insight::Result<()> {
//! let daily = aggregate(
//!     records,
//!     &[GroupKey::State, GroupKey::Date],
//!     Some("demo_age_5_17"),
//!     Reduction::Sum,
//! )?;
//! let detector = VolumeAnomalyDetector::new(0.05)?;
//! for point in detector.detect(&daily)? {
//!     if point.anomaly {
//!         println!("spike: {:?} score={}", point.group, point.anomaly_score);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod detector;
mod isolation;

pub use detector::{LabeledPoint, VolumeAnomalyDetector};
pub use isolation::IsolationForest;

//! Analytics Module
//!
//! 異常検知・地域クラスタリングの分析エンジン。

pub mod anomaly;
pub mod clustering;

pub use anomaly::{LabeledPoint, VolumeAnomalyDetector};
pub use clustering::{ClusterCenter, ClusterOutcome, RegionCluster, RegionClusterer};

//! Region Clustering
//!
//! 地域の行動プロファイルによる教師なしグルーピング。
//!
//! ## 主要機能
//!
//! - **地域プロファイル集計**: 特徴量列を地域ごとに合計
//! - **標準化**: 集計データ自身から平均0・分散1へ変換
//! - **K-Means 分割**: シード固定の k-means++ 初期化と Lloyd 反復
//! - **中心の逆変換**: クラスタ中心を元の単位へ復元

mod clusterer;
mod kmeans;
mod scaler;

pub use clusterer::{ClusterCenter, ClusterOutcome, RegionCluster, RegionClusterer};
pub use kmeans::KMeans;
pub use scaler::StandardScaler;

//! Region Clusterer
//!
//! 地域プロファイルのクラスタリング実装。地域ごとに特徴量列を合計し、
//! 標準化した空間で K-Means 分割した後、中心を元の単位へ逆変換する。

use super::kmeans::KMeans;
use super::scaler::StandardScaler;
use crate::aggregate::sum_by_region;
use crate::error::{Error, Result};
use crate::table::{require_columns, Record, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// 既定の乱数シード
const DEFAULT_SEED: u64 = 42;

/// 地域のクラスタ割り当て
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCluster {
    /// 地域キー
    pub region: Region,
    /// 特徴量値（元の単位）
    pub features: Vec<f64>,
    /// クラスタ ID（[0, k)）
    pub cluster_id: usize,
}

/// クラスタ中心（元の単位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCenter {
    /// クラスタ ID
    pub cluster_id: usize,
    /// 各特徴量の中心値
    pub features: Vec<f64>,
}

/// クラスタリング結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutcome {
    /// 特徴量列名（`features` の並び順）
    pub feature_names: Vec<String>,
    /// 地域ごとの割り当て
    pub assignments: Vec<RegionCluster>,
    /// k 行の中心テーブル
    pub centers: Vec<ClusterCenter>,
}

/// 地域クラスタラ
///
/// k は構築時に固定され、再学習なしに変更できない。
/// モデルとスケーラは呼び出しごとに学習し直す。
#[derive(Debug, Clone)]
pub struct RegionClusterer {
    /// 目標クラスタ数
    k: usize,
    /// 乱数シード
    seed: u64,
}

impl RegionClusterer {
    /// 新しいクラスタラを作成（k ≥ 1）
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::Configuration(
                "cluster count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            k,
            seed: DEFAULT_SEED,
        })
    }

    /// 乱数シードを差し替える
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 地域プロファイルをクラスタリングする
    pub fn cluster(&self, records: &[Record], feature_columns: &[&str]) -> Result<ClusterOutcome> {
        if feature_columns.is_empty() {
            return Err(Error::Configuration(
                "at least one feature column is required".to_string(),
            ));
        }
        if feature_columns.len() == 1 {
            warn!(
                column = feature_columns[0],
                "clustering on a single feature degenerates to 1-D binning"
            );
        }
        require_columns(records, "record", feature_columns)?;

        // 地域 × 特徴量のプロファイル行列を組み立てる
        let mut profiles: BTreeMap<Region, Vec<f64>> = BTreeMap::new();
        for (i, column) in feature_columns.iter().enumerate() {
            for (region, total) in sum_by_region(records, column)? {
                profiles
                    .entry(region)
                    .or_insert_with(|| vec![0.0; feature_columns.len()])[i] = total;
            }
        }

        if profiles.len() < self.k {
            return Err(Error::Configuration(format!(
                "cluster count {} exceeds distinct region count {}",
                self.k,
                profiles.len()
            )));
        }

        let regions: Vec<Region> = profiles.keys().cloned().collect();
        let matrix: Vec<Vec<f64>> = profiles.values().cloned().collect();

        let scaler = StandardScaler::fit(&matrix);
        let scaled = scaler.transform(&matrix);
        let fit = KMeans::new(self.k, self.seed).fit(&scaled)?;
        let centers = scaler.inverse_transform(&fit.centroids);

        info!(
            regions = regions.len(),
            k = self.k,
            features = feature_columns.len(),
            "region clustering completed"
        );

        Ok(ClusterOutcome {
            feature_names: feature_columns.iter().map(|c| c.to_string()).collect(),
            assignments: regions
                .into_iter()
                .zip(matrix)
                .zip(fit.labels)
                .map(|((region, features), cluster_id)| RegionCluster {
                    region,
                    features,
                    cluster_id,
                })
                .collect(),
            centers: centers
                .into_iter()
                .enumerate()
                .map(|(cluster_id, features)| ClusterCenter {
                    cluster_id,
                    features,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, district: &str, enroll: f64, update: f64) -> Record {
        Record::new(Region::new(state, district), None)
            .with_count("age_0_5", enroll)
            .with_count("demo_age_5_17", update)
    }

    fn two_group_records() -> Vec<Record> {
        vec![
            record("Kerala", "Idukki", 100.0, 300.0),
            record("Kerala", "Kollam", 110.0, 310.0),
            record("Bihar", "Patna", 600.0, 800.0),
            record("Bihar", "Gaya", 610.0, 790.0),
        ]
    }

    #[test]
    fn test_separated_regions_land_in_distinct_clusters() {
        let clusterer = RegionClusterer::new(2).unwrap();
        let outcome = clusterer
            .cluster(&two_group_records(), &["age_0_5", "demo_age_5_17"])
            .unwrap();

        let cluster_of = |district: &str| {
            outcome
                .assignments
                .iter()
                .find(|a| a.region.district == district)
                .unwrap()
                .cluster_id
        };
        assert_eq!(cluster_of("Idukki"), cluster_of("Kollam"));
        assert_eq!(cluster_of("Patna"), cluster_of("Gaya"));
        assert_ne!(cluster_of("Idukki"), cluster_of("Patna"));
    }

    #[test]
    fn test_center_table_has_k_rows_in_original_units() {
        let clusterer = RegionClusterer::new(2).unwrap();
        let outcome = clusterer
            .cluster(&two_group_records(), &["age_0_5", "demo_age_5_17"])
            .unwrap();

        assert_eq!(outcome.centers.len(), 2);
        // 逆変換後の中心はメンバーの元値の範囲内に収まる
        for center in &outcome.centers {
            let members: Vec<&RegionCluster> = outcome
                .assignments
                .iter()
                .filter(|a| a.cluster_id == center.cluster_id)
                .collect();
            for feature in 0..outcome.feature_names.len() {
                let min = members
                    .iter()
                    .map(|m| m.features[feature])
                    .fold(f64::INFINITY, f64::min);
                let max = members
                    .iter()
                    .map(|m| m.features[feature])
                    .fold(f64::NEG_INFINITY, f64::max);
                assert!(center.features[feature] >= min - 1e-6);
                assert!(center.features[feature] <= max + 1e-6);
            }
        }
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let clusterer = RegionClusterer::new(2).unwrap();
        let records = two_group_records();
        let first = clusterer.cluster(&records, &["age_0_5", "demo_age_5_17"]).unwrap();
        let second = clusterer.cluster(&records, &["age_0_5", "demo_age_5_17"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_k_exceeding_region_count_rejected() {
        let clusterer = RegionClusterer::new(5).unwrap();
        let err = clusterer
            .cluster(&two_group_records(), &["age_0_5"])
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_feature_list_rejected() {
        let clusterer = RegionClusterer::new(2).unwrap();
        let err = clusterer.cluster(&two_group_records(), &[]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_missing_feature_column_rejected() {
        let clusterer = RegionClusterer::new(2).unwrap();
        let err = clusterer
            .cluster(&two_group_records(), &["bio_age_17_plus"])
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_zero_cluster_count_rejected() {
        assert!(RegionClusterer::new(0).is_err());
    }

    #[test]
    fn test_zero_variance_feature_tolerated() {
        let records = vec![
            record("Kerala", "Idukki", 100.0, 50.0),
            record("Kerala", "Kollam", 100.0, 500.0),
            record("Bihar", "Patna", 100.0, 900.0),
        ];
        let clusterer = RegionClusterer::new(2).unwrap();
        let outcome = clusterer
            .cluster(&records, &["age_0_5", "demo_age_5_17"])
            .unwrap();
        assert!(outcome
            .assignments
            .iter()
            .all(|a| a.features.iter().all(|f| f.is_finite())));
    }
}

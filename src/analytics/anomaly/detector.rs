//! Volume Anomaly Detector
//!
//! 異常検知器の実装。集計行を1特徴量の観測点として扱い、
//! contamination 比率に従って異常行をラベル付けする。

use super::isolation::IsolationForest;
use crate::aggregate::{AggregateRow, GroupValues};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// 既定の分離木本数
const DEFAULT_TREES: usize = 100;
/// 既定のサブサンプルサイズ上限
const DEFAULT_SAMPLE_SIZE: usize = 256;
/// 既定の乱数シード
const DEFAULT_SEED: u64 = 42;

/// ラベル付き集計点
///
/// `anomaly_score` は決定関数値で、高いほど正常・低いほど異常。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    /// キー値の組
    pub group: GroupValues,
    /// 集計値
    pub value: f64,
    /// 異常フラグ
    pub anomaly: bool,
    /// 決定関数スコア
    pub anomaly_score: f64,
}

/// 活動量異常検知器
///
/// 呼び出しごとにモデルを学習し直す。呼び出し間で状態を持たない。
#[derive(Debug, Clone)]
pub struct VolumeAnomalyDetector {
    /// 想定される外れ値比率（0.0 < c < 0.5）
    contamination: f64,
    /// 乱数シード
    seed: u64,
}

impl VolumeAnomalyDetector {
    /// 新しい検知器を作成
    ///
    /// contamination が (0.0, 0.5) の範囲外なら設定エラー。
    pub fn new(contamination: f64) -> Result<Self> {
        if !(contamination > 0.0 && contamination < 0.5) {
            return Err(Error::Configuration(format!(
                "contamination must be in (0.0, 0.5), got {contamination}"
            )));
        }
        Ok(Self {
            contamination,
            seed: DEFAULT_SEED,
        })
    }

    /// 乱数シードを差し替える
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// 集計系列の異常検知を実行
    ///
    /// 全入力行を保持したままフラグとスコアを付けて返す。
    /// 相異なる値が2未満の退化系列は全行正常として返す（警告ログあり）。
    pub fn detect(&self, points: &[AggregateRow]) -> Result<Vec<LabeledPoint>> {
        if points.is_empty() {
            return Err(Error::InsufficientData(
                "anomaly detection requires at least one aggregate row".to_string(),
            ));
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let distinct: BTreeSet<u64> = values.iter().map(|v| v.to_bits()).collect();
        if distinct.len() < 2 {
            warn!(
                rows = points.len(),
                "degenerate series with fewer than 2 distinct values; labeling all rows normal"
            );
            return Ok(points
                .iter()
                .map(|p| LabeledPoint {
                    group: p.group.clone(),
                    value: p.value,
                    anomaly: false,
                    anomaly_score: 0.5,
                })
                .collect());
        }

        let mut forest = IsolationForest::new(DEFAULT_TREES, DEFAULT_SAMPLE_SIZE, self.seed);
        forest.fit(&values);

        // 決定関数: 0.5 − 分離スコア。高いほど正常。
        let decisions: Vec<f64> = values.iter().map(|v| 0.5 - forest.score(*v)).collect();

        // 決定スコアの低い方から ⌊contamination × n⌋ 行をフラグする
        let flag_count = (self.contamination * points.len() as f64).floor() as usize;
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|a, b| {
            decisions[*a]
                .partial_cmp(&decisions[*b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });
        let flagged: BTreeSet<usize> = order.into_iter().take(flag_count).collect();
        debug!(
            rows = points.len(),
            flagged = flagged.len(),
            contamination = self.contamination,
            "volume anomaly detection completed"
        );

        Ok(points
            .iter()
            .enumerate()
            .map(|(i, p)| LabeledPoint {
                group: p.group.clone(),
                value: p.value,
                anomaly: flagged.contains(&i),
                anomaly_score: decisions[i],
            })
            .collect())
    }
}

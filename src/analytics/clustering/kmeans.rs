//! K-Means Partitioning
//!
//! シード固定の K-Means 実装。k-means++ 初期化と Lloyd 反復で
//! クラスタ内二乗距離和を最小化する。同一シード・同一入力に対して
//! 割り当ては常に同一。

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// 収束判定の中心移動許容量
const TOLERANCE: f64 = 1e-4;
/// Lloyd 反復の上限
const MAX_ITERATIONS: usize = 100;

/// 学習結果
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// 各観測のクラスタ割り当て（[0, k)）
    pub labels: Vec<usize>,
    /// クラスタ中心（k 行）
    pub centroids: Vec<Vec<f64>>,
}

/// K-Means モデル
#[derive(Debug, Clone)]
pub struct KMeans {
    /// クラスタ数
    k: usize,
    /// 乱数シード
    seed: u64,
}

impl KMeans {
    /// 新しいモデルを作成
    pub fn new(k: usize, seed: u64) -> Self {
        Self { k, seed }
    }

    /// データ行列を k 個のクラスタへ分割する
    pub fn fit(&self, rows: &[Vec<f64>]) -> Result<KMeansFit> {
        if self.k == 0 {
            return Err(Error::Configuration(
                "cluster count must be at least 1".to_string(),
            ));
        }
        if rows.len() < self.k {
            return Err(Error::Configuration(format!(
                "cluster count {} exceeds observation count {}",
                self.k,
                rows.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.initial_centroids(rows, &mut rng);
        let mut labels = vec![0usize; rows.len()];

        for iteration in 0..MAX_ITERATIONS {
            for (i, row) in rows.iter().enumerate() {
                labels[i] = nearest_centroid(row, &centroids);
            }

            let mut shift: f64 = 0.0;
            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&Vec<f64>> = rows
                    .iter()
                    .zip(&labels)
                    .filter(|(_, label)| **label == cluster)
                    .map(|(row, _)| row)
                    .collect();
                // 空クラスタは中心を据え置く
                if members.is_empty() {
                    continue;
                }
                let updated = mean_point(&members);
                shift = shift.max(euclidean_distance(centroid, &updated));
                *centroid = updated;
            }

            if shift < TOLERANCE {
                debug!(iteration, "k-means converged");
                break;
            }
        }

        Ok(KMeansFit { labels, centroids })
    }

    /// k-means++ 初期化
    fn initial_centroids(&self, rows: &[Vec<f64>], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut centroids = vec![rows[rng.gen_range(0..rows.len())].clone()];
        while centroids.len() < self.k {
            let weights: Vec<f64> = rows
                .iter()
                .map(|row| {
                    centroids
                        .iter()
                        .map(|c| squared_distance(row, c))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = weights.iter().sum();
            let chosen = if total <= f64::EPSILON {
                // 全点が既存中心と一致する退化入力
                rng.gen_range(0..rows.len())
            } else {
                let mut target = rng.gen::<f64>() * total;
                let mut index = rows.len() - 1;
                for (i, weight) in weights.iter().enumerate() {
                    target -= weight;
                    if target <= 0.0 {
                        index = i;
                        break;
                    }
                }
                index
            };
            centroids.push(rows[chosen].clone());
        }
        centroids
    }
}

/// 最近傍中心（同距離は小さい添字を採用）
fn nearest_centroid(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0usize;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(row, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn mean_point(members: &[&Vec<f64>]) -> Vec<f64> {
    let dims = members[0].len();
    let mut mean = vec![0.0; dims];
    for member in members {
        for (i, value) in member.iter().enumerate() {
            mean[i] += value;
        }
    }
    for value in &mut mean {
        *value /= members.len() as f64;
    }
    mean
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// ユークリッド距離を計算
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_distance(a, b).sqrt()
}

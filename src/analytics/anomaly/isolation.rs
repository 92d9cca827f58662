//! Isolation Forest
//!
//! 1次元値系列向けの分離木アンサンブル。ランダムな分割で各点を
//! 孤立させるのに要する平均パス長から異常度を算出する。
//! 乱数はシード固定で、同一入力に対する再現性を保証する。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// オイラー・マスケローニ定数（調和数近似用）
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// 分離木のノード
#[derive(Debug, Clone)]
enum Node {
    /// 外部ノード（残存サンプル数を保持）
    Leaf { size: usize },
    /// ランダム分割点による内部ノード
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Isolation Forest モデル
#[derive(Debug, Clone)]
pub struct IsolationForest {
    /// 分離木の本数
    n_trees: usize,
    /// 各木のサブサンプルサイズ上限
    sample_size: usize,
    /// 乱数シード
    seed: u64,
    /// 学習済みの木
    trees: Vec<Node>,
    /// 正規化用の実効サブサンプルサイズ
    fitted_sample_size: usize,
}

impl IsolationForest {
    /// 新しいモデルを作成（未学習）
    pub fn new(n_trees: usize, sample_size: usize, seed: u64) -> Self {
        Self {
            n_trees,
            sample_size,
            seed,
            trees: Vec::new(),
            fitted_sample_size: 0,
        }
    }

    /// 値系列で木を構築する
    pub fn fit(&mut self, values: &[f64]) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample_size = self.sample_size.min(values.len()).max(1);
        // 深さ上限は ceil(log2(sample_size))
        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;

        self.fitted_sample_size = sample_size;
        self.trees = (0..self.n_trees)
            .map(|_| {
                let sample = subsample(values, sample_size, &mut rng);
                build_tree(sample, 0, max_depth, &mut rng)
            })
            .collect();
    }

    /// 異常度スコア（0〜1、高いほど異常）
    pub fn score(&self, value: f64) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let total_path: f64 = self.trees.iter().map(|tree| path_length(tree, value, 0)).sum();
        let mean_path = total_path / self.trees.len() as f64;
        let normalizer = average_path_length(self.fitted_sample_size);
        if normalizer <= 0.0 {
            return 0.5;
        }
        2.0_f64.powf(-mean_path / normalizer)
    }
}

/// 非復元抽出によるサブサンプル
fn subsample(values: &[f64], amount: usize, rng: &mut StdRng) -> Vec<f64> {
    if amount >= values.len() {
        return values.to_vec();
    }
    rand::seq::index::sample(rng, values.len(), amount)
        .into_iter()
        .map(|i| values[i])
        .collect()
}

fn build_tree(values: Vec<f64>, depth: usize, max_depth: usize, rng: &mut StdRng) -> Node {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.len() <= 1 || depth >= max_depth || (max - min) <= f64::EPSILON {
        return Node::Leaf { size: values.len() };
    }

    let threshold = rng.gen_range(min..max);
    let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|v| *v < threshold);
    Node::Split {
        threshold,
        left: Box::new(build_tree(left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, value: f64, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            threshold,
            left,
            right,
        } => {
            if value < *threshold {
                path_length(left, value, depth + 1)
            } else {
                path_length(right, value, depth + 1)
            }
        }
    }
}

/// 二分探索木における失敗探索の平均パス長 c(n)
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlier_scores_highest() {
        let values = vec![100.0, 105.0, 102.0, 5000.0, 101.0];
        let mut forest = IsolationForest::new(100, 256, 42);
        forest.fit(&values);

        let outlier_score = forest.score(5000.0);
        for v in [100.0, 105.0, 102.0, 101.0] {
            assert!(
                outlier_score > forest.score(v),
                "outlier must isolate faster than {v}"
            );
        }
    }

    #[test]
    fn test_scores_reproducible_for_fixed_seed() {
        let values: Vec<f64> = (0..50).map(|i| 100.0 + (i % 7) as f64).collect();
        let mut a = IsolationForest::new(100, 256, 42);
        let mut b = IsolationForest::new(100, 256, 42);
        a.fit(&values);
        b.fit(&values);
        for v in &values {
            assert_eq!(a.score(*v), b.score(*v));
        }
    }

    #[test]
    fn test_average_path_length_monotone() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }

    #[test]
    fn test_unfitted_model_returns_neutral_score() {
        let forest = IsolationForest::new(10, 64, 42);
        assert_eq!(forest.score(123.0), 0.5);
    }
}

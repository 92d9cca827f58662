//! Feature Standardization
//!
//! 特徴量ごとの標準化（平均0・分散1）と逆変換。

/// 標準化スケーラ
#[derive(Debug, Clone)]
pub struct StandardScaler {
    /// 各特徴量の平均値
    means: Vec<f64>,
    /// 各特徴量の標準偏差
    std_devs: Vec<f64>,
}

impl StandardScaler {
    /// データ行列からスケーラを学習する
    ///
    /// 行は観測、列は特徴量。空行列には空のスケーラを返す。
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let Some(first) = rows.first() else {
            return Self {
                means: Vec::new(),
                std_devs: Vec::new(),
            };
        };
        let feature_count = first.len();
        let n = rows.len() as f64;

        let mut means = vec![0.0; feature_count];
        for row in rows {
            for (i, value) in row.iter().enumerate() {
                means[i] += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut std_devs = vec![0.0; feature_count];
        for row in rows {
            for (i, value) in row.iter().enumerate() {
                std_devs[i] += (value - means[i]).powi(2);
            }
        }
        for std_dev in &mut std_devs {
            *std_dev = (*std_dev / n).sqrt();
            // 分散ゼロの特徴量はゼロ除算を避けるため下限を敷く
            if *std_dev < 1e-6 {
                *std_dev = 1e-6;
            }
        }

        Self { means, std_devs }
    }

    /// 標準化変換
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, value)| (value - self.means[i]) / self.std_devs[i])
                    .collect()
            })
            .collect()
    }

    /// 逆変換（標準化空間から元の単位へ）
    pub fn inverse_transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, value)| value * self.std_devs[i] + self.means[i])
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let rows = vec![vec![10.0, 100.0], vec![20.0, 200.0], vec![30.0, 300.0]];
        let scaler = StandardScaler::fit(&rows);
        let scaled = scaler.transform(&rows);

        for feature in 0..2 {
            let mean: f64 = scaled.iter().map(|r| r[feature]).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-9);
        }
        // 対称なデータなので両端は符号が逆
        assert!((scaled[0][0] + scaled[2][0]).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_transform_round_trip() {
        let rows = vec![vec![5.0, 40.0], vec![9.0, 80.0], vec![13.0, 60.0]];
        let scaler = StandardScaler::fit(&rows);
        let restored = scaler.inverse_transform(&scaler.transform(&rows));
        for (original, round_tripped) in rows.iter().zip(&restored) {
            for (a, b) in original.iter().zip(round_tripped) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_variance_feature_does_not_divide_by_zero() {
        let rows = vec![vec![7.0, 1.0], vec![7.0, 2.0], vec![7.0, 3.0]];
        let scaler = StandardScaler::fit(&rows);
        let scaled = scaler.transform(&rows);
        for row in &scaled {
            assert!(row[0].is_finite());
        }
    }
}

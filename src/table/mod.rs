//! Record Table Model
//!
//! 登録・更新トランザクションログのテーブルモデル。
//! 上流の取り込み層が正規化済みのレコードを供給する前提
//! （地域名はトリム・大文字小文字統一済み、数値欠損はゼロ埋め済み）。

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 行政地域（州 + 地区）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region {
    /// 州識別子
    pub state: String,
    /// 地区識別子
    pub district: String,
}

impl Region {
    /// 新しい地域キーを作成
    pub fn new(state: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            district: district.into(),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.state, self.district)
    }
}

/// ログレコード1行
///
/// `counts` はデータセット固有の数値活動列（年齢帯別件数など）。
/// 他の行が持つ列をこの行が持たない場合、値は 0.0 として読む。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 地域キー
    pub region: Region,
    /// 取引日（欠損あり）
    pub date: Option<NaiveDate>,
    /// 数値活動列（列名 → 件数）
    pub counts: BTreeMap<String, f64>,
}

impl Record {
    /// 新しいレコードを作成
    pub fn new(region: Region, date: Option<NaiveDate>) -> Self {
        Self {
            region,
            date,
            counts: BTreeMap::new(),
        }
    }

    /// 活動列を追加（ビルダー形式）
    pub fn with_count(mut self, column: impl Into<String>, value: f64) -> Self {
        self.counts.insert(column.into(), value);
        self
    }

    /// 列値を取得（欠損は 0.0）
    pub fn count(&self, column: &str) -> f64 {
        self.counts.get(column).copied().unwrap_or(0.0)
    }
}

/// テーブル内に存在する列名の集合
pub fn column_names(records: &[Record]) -> BTreeSet<String> {
    records
        .iter()
        .flat_map(|r| r.counts.keys().cloned())
        .collect()
}

/// 少なくとも1行が列を保持していれば存在とみなす
pub fn column_exists(records: &[Record], column: &str) -> bool {
    records.iter().any(|r| r.counts.contains_key(column))
}

/// 必須列の検証
///
/// 空テーブルは `InsufficientData`、欠損列は `Schema` エラー。
/// 欠損列で空テーブルを黙って返す挙動は採らない。
pub fn require_columns(records: &[Record], table: &str, columns: &[&str]) -> Result<()> {
    if records.is_empty() {
        return Err(Error::InsufficientData(format!("{table} table is empty")));
    }
    for column in columns {
        if !column_exists(records, column) {
            return Err(Error::missing_column(table, column));
        }
    }
    Ok(())
}

/// テーブル内の相異なる地域数
pub fn distinct_regions(records: &[Record]) -> usize {
    records
        .iter()
        .map(|r| &r.region)
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, district: &str) -> Record {
        Record::new(Region::new(state, district), None).with_count("age_0_5", 10.0)
    }

    #[test]
    fn test_count_missing_column_reads_zero() {
        let r = record("Kerala", "Idukki");
        assert_eq!(r.count("age_0_5"), 10.0);
        assert_eq!(r.count("demo_age_5_17"), 0.0);
    }

    #[test]
    fn test_require_columns_ok() {
        let records = vec![record("Kerala", "Idukki")];
        assert!(require_columns(&records, "enrollment", &["age_0_5"]).is_ok());
    }

    #[test]
    fn test_require_columns_missing() {
        let records = vec![record("Kerala", "Idukki")];
        let err = require_columns(&records, "enrollment", &["demo_age_5_17"]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_require_columns_empty_table() {
        let err = require_columns(&[], "enrollment", &["age_0_5"]).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_distinct_regions() {
        let records = vec![
            record("Kerala", "Idukki"),
            record("Kerala", "Idukki"),
            record("Kerala", "Kollam"),
        ];
        assert_eq!(distinct_regions(&records), 2);
    }
}

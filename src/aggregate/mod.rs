//! Aggregator
//!
//! グループ化キーによる集計エンジン。全分析コンポーネントが共有する
//! 純粋・ステートレスな縮約処理（合計・件数・分散）。

use crate::error::{Error, Result};
use crate::table::{column_exists, Record, Region};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// グループ化キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKey {
    /// 州
    State,
    /// 地区
    District,
    /// 取引日
    Date,
}

/// 縮約方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reduction {
    /// 合計
    Sum,
    /// 行数
    Count,
    /// 標本分散（n−1 分母、1行グループは 0.0）
    Variance,
}

/// グループキーの値の組
///
/// 集計に参加しなかったキーは `None`。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupValues {
    pub state: Option<String>,
    pub district: Option<String>,
    pub date: Option<NaiveDate>,
}

impl GroupValues {
    /// 州と地区が揃っていれば地域キーとして取り出す
    pub fn region(&self) -> Option<Region> {
        match (&self.state, &self.district) {
            (Some(state), Some(district)) => Some(Region::new(state.clone(), district.clone())),
            _ => None,
        }
    }
}

/// 集計結果1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// キー値の組
    pub group: GroupValues,
    /// 縮約値
    pub value: f64,
}

/// レコードテーブルをキーで集計する
///
/// 入力に現れるキー組み合わせごとに1行を返す（ゼロ埋めなし）。
/// 出力順はキーの昇順で安定。日付キーが集計に参加する場合、
/// 日付欠損行は捨てる（ドロップ方針）。
pub fn aggregate(
    records: &[Record],
    keys: &[GroupKey],
    value_column: Option<&str>,
    reduction: Reduction,
) -> Result<Vec<AggregateRow>> {
    if keys.is_empty() {
        return Err(Error::Configuration(
            "at least one grouping key is required".to_string(),
        ));
    }
    if records.is_empty() {
        return Err(Error::InsufficientData(
            "cannot aggregate an empty record table".to_string(),
        ));
    }
    match (value_column, reduction) {
        (None, Reduction::Count) => {}
        (None, _) => {
            return Err(Error::Configuration(
                "a value column is required for sum/variance reductions".to_string(),
            ));
        }
        (Some(column), _) => {
            if !column_exists(records, column) {
                return Err(Error::missing_column("record", column));
            }
        }
    }

    let by_state = keys.contains(&GroupKey::State);
    let by_district = keys.contains(&GroupKey::District);
    let by_date = keys.contains(&GroupKey::Date);

    let mut groups: BTreeMap<GroupValues, Vec<f64>> = BTreeMap::new();
    let mut dropped = 0usize;
    for record in records {
        if by_date && record.date.is_none() {
            dropped += 1;
            continue;
        }
        let group = GroupValues {
            state: by_state.then(|| record.region.state.clone()),
            district: by_district.then(|| record.region.district.clone()),
            date: if by_date { record.date } else { None },
        };
        let value = value_column.map(|c| record.count(c)).unwrap_or(0.0);
        groups.entry(group).or_default().push(value);
    }
    if dropped > 0 {
        debug!(dropped, "dropped records with a missing date grouping key");
    }
    if groups.is_empty() {
        return Err(Error::InsufficientData(
            "no records left after dropping rows with missing grouping keys".to_string(),
        ));
    }

    let rows = groups
        .into_iter()
        .map(|(group, values)| AggregateRow {
            group,
            value: reduce(&values, reduction),
        })
        .collect();
    Ok(rows)
}

fn reduce(values: &[f64], reduction: Reduction) -> f64 {
    match reduction {
        Reduction::Sum => values.iter().sum(),
        Reduction::Count => values.len() as f64,
        Reduction::Variance => sample_variance(values),
    }
}

/// 標本分散（n−1 分母）
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// 地域ごとの列合計
pub fn sum_by_region(records: &[Record], column: &str) -> Result<BTreeMap<Region, f64>> {
    let rows = aggregate(
        records,
        &[GroupKey::State, GroupKey::District],
        Some(column),
        Reduction::Sum,
    )?;
    Ok(rows
        .into_iter()
        .filter_map(|r| r.group.region().map(|region| (region, r.value)))
        .collect())
}

/// 州ごとの列合計
pub fn sum_by_state(records: &[Record], column: &str) -> Result<BTreeMap<String, f64>> {
    let rows = aggregate(records, &[GroupKey::State], Some(column), Reduction::Sum)?;
    Ok(rows
        .into_iter()
        .filter_map(|r| r.group.state.map(|state| (state, r.value)))
        .collect())
}

/// 地域ごとの行数
pub fn count_by_region(records: &[Record]) -> Result<BTreeMap<Region, f64>> {
    let rows = aggregate(
        records,
        &[GroupKey::State, GroupKey::District],
        None,
        Reduction::Count,
    )?;
    Ok(rows
        .into_iter()
        .filter_map(|r| r.group.region().map(|region| (region, r.value)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(state: &str, district: &str, day: Option<u32>, value: f64) -> Record {
        let date = day.and_then(|d| NaiveDate::from_ymd_opt(2025, 3, d));
        Record::new(Region::new(state, district), date).with_count("updates", value)
    }

    #[test]
    fn test_one_row_per_distinct_group() {
        let records = vec![
            record("Kerala", "Idukki", Some(1), 5.0),
            record("Kerala", "Idukki", Some(2), 7.0),
            record("Kerala", "Kollam", Some(1), 3.0),
            record("Bihar", "Patna", Some(1), 2.0),
        ];
        let rows = aggregate(
            &records,
            &[GroupKey::State, GroupKey::District],
            Some("updates"),
            Reduction::Sum,
        )
        .unwrap();
        // 入力中の相異なるキー組み合わせ数と一致する
        assert_eq!(rows.len(), 3);
        let idukki = rows
            .iter()
            .find(|r| r.group.district.as_deref() == Some("Idukki"))
            .unwrap();
        assert_eq!(idukki.value, 12.0);
    }

    #[test]
    fn test_count_without_value_column() {
        let records = vec![
            record("Kerala", "Idukki", Some(1), 5.0),
            record("Kerala", "Idukki", Some(2), 7.0),
        ];
        let rows = aggregate(
            &records,
            &[GroupKey::State, GroupKey::District],
            None,
            Reduction::Count,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 2.0);
    }

    #[test]
    fn test_missing_date_rows_dropped() {
        let records = vec![
            record("Kerala", "Idukki", Some(1), 5.0),
            record("Kerala", "Idukki", None, 9.0),
        ];
        let rows = aggregate(
            &records,
            &[GroupKey::State, GroupKey::Date],
            Some("updates"),
            Reduction::Sum,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 5.0);
    }

    #[test]
    fn test_missing_value_column_fails() {
        let records = vec![record("Kerala", "Idukki", Some(1), 5.0)];
        let err = aggregate(
            &records,
            &[GroupKey::State],
            Some("nonexistent"),
            Reduction::Sum,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_empty_keys_rejected() {
        let records = vec![record("Kerala", "Idukki", Some(1), 5.0)];
        let err = aggregate(&records, &[], Some("updates"), Reduction::Sum).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_table_rejected() {
        let err = aggregate(&[], &[GroupKey::State], Some("updates"), Reduction::Sum).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn test_variance_reduction() {
        let records = vec![
            record("Kerala", "Idukki", Some(1), 2.0),
            record("Kerala", "Idukki", Some(2), 4.0),
            record("Kerala", "Idukki", Some(3), 6.0),
        ];
        let rows = aggregate(
            &records,
            &[GroupKey::State, GroupKey::District],
            Some("updates"),
            Reduction::Variance,
        )
        .unwrap();
        // 標本分散: mean=4, ((4)+(0)+(4))/2 = 4
        assert!((rows[0].value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_row_variance_is_zero() {
        assert_eq!(sample_variance(&[5.0]), 0.0);
        assert_eq!(sample_variance(&[]), 0.0);
    }

    #[test]
    fn test_output_order_stable() {
        let records = vec![
            record("Kerala", "Kollam", Some(1), 1.0),
            record("Bihar", "Patna", Some(1), 1.0),
            record("Kerala", "Idukki", Some(1), 1.0),
        ];
        let rows = aggregate(
            &records,
            &[GroupKey::State, GroupKey::District],
            Some("updates"),
            Reduction::Sum,
        )
        .unwrap();
        let states: Vec<_> = rows.iter().map(|r| r.group.state.clone().unwrap()).collect();
        assert_eq!(states, vec!["Bihar", "Kerala", "Kerala"]);
    }
}

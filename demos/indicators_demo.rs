//! Governance Indicators Demo
//!
//! 合成レコードに対する分析エンジン一式のデモプログラム
//!
//! 実行方法:
//! ```bash
//! cargo run --example indicators_demo
//! ```

use chrono::NaiveDate;
use enrollment_insight::aggregate::{aggregate, GroupKey, Reduction};
use enrollment_insight::analytics::{RegionClusterer, VolumeAnomalyDetector};
use enrollment_insight::indicators::{
    continuity_risk, engagement_gap, performance, volatility, BIO_AGE_17_PLUS, DEMO_AGE_5_17,
    ENROLLMENT_AGE_0_5,
};
use enrollment_insight::profile::{summarize, trend_insight};
use enrollment_insight::{EngineConfig, Record, Region};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ロギング初期化
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Enrollment Insight Demo ===\n");

    let config = EngineConfig::default();
    config.validate()?;

    // 1. 合成データセットを生成
    println!("1. Generating synthetic datasets...");
    let enrollment = enrollment_records();
    let demographic = demographic_records();
    let biometric = biometric_records();
    let summary = summarize(&demographic);
    println!(
        "✓ demographic: {} rows, {} regions, range {:?}\n",
        summary.rows, summary.regions, summary.date_range
    );

    // 2. 日次更新量の異常検知
    println!("2. Detecting volume anomalies...");
    let daily = aggregate(
        &demographic,
        &[GroupKey::State, GroupKey::Date],
        Some(DEMO_AGE_5_17),
        Reduction::Sum,
    )?;
    let detector = VolumeAnomalyDetector::new(config.contamination)?;
    let labeled = detector.detect(&daily)?;
    for point in labeled.iter().filter(|p| p.anomaly) {
        println!(
            "  spike: state={:?} date={:?} volume={} score={:.3}",
            point.group.state, point.group.date, point.value, point.anomaly_score
        );
    }
    println!("✓ {} aggregate points scored\n", labeled.len());

    // 3. 地域クラスタリング
    println!("3. Clustering region profiles...");
    let clusterer = RegionClusterer::new(2)?;
    let outcome = clusterer.cluster(&demographic, &[DEMO_AGE_5_17])?;
    for center in &outcome.centers {
        println!("  cluster {} center: {:?}", center.cluster_id, center.features);
    }
    println!("✓ {} regions assigned\n", outcome.assignments.len());

    // 4. 統治指標
    println!("4. Computing governance indicators:");
    let risk = continuity_risk(&enrollment, &demographic)?;
    println!(
        "  highest continuity risk: {} (score {:.1})",
        risk[0].region, risk[0].risk_score
    );

    let gaps = engagement_gap(&demographic, &biometric)?;
    println!(
        "  widest engagement gap: {} (gap {})",
        gaps[0].state, gaps[0].engagement_gap
    );

    let moves = volatility(&demographic)?;
    println!(
        "  most volatile region: {} (z-score {:.2})",
        moves[0].region, moves[0].volatility_score
    );

    let load = performance(&enrollment, &demographic)?;
    println!(
        "  busiest region: {} (score {} -> {})",
        load[0].region, load[0].performance_score, load[0].status
    );

    // 5. トレンドインサイト
    println!("\n5. Trend insight:");
    let trend = trend_insight(&demographic, DEMO_AGE_5_17)?;
    println!("  {}", trend.headline(DEMO_AGE_5_17));

    println!("\n=== Demo completed successfully ===");
    Ok(())
}

fn date(day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 3, day)
}

/// 登録データ（幼児コホート中心）
fn enrollment_records() -> Vec<Record> {
    let mut records = Vec::new();
    for day in 1..=10 {
        records.push(
            Record::new(Region::new("Kerala", "Idukki"), date(day))
                .with_count(ENROLLMENT_AGE_0_5, 40.0 + day as f64),
        );
        records.push(
            Record::new(Region::new("Bihar", "Patna"), date(day))
                .with_count(ENROLLMENT_AGE_0_5, 55.0),
        );
    }
    records
}

/// 人口統計更新データ（1日だけ急増を仕込む）
fn demographic_records() -> Vec<Record> {
    let mut records = Vec::new();
    for day in 1..=10 {
        let spike = if day == 7 { 900.0 } else { 0.0 };
        records.push(
            Record::new(Region::new("Kerala", "Idukki"), date(day))
                .with_count(DEMO_AGE_5_17, 30.0 + spike),
        );
        records.push(
            Record::new(Region::new("Bihar", "Patna"), date(day)).with_count(DEMO_AGE_5_17, 4.0),
        );
    }
    records
}

/// 生体更新データ（成人コホート）
fn biometric_records() -> Vec<Record> {
    let mut records = Vec::new();
    for day in 1..=10 {
        records.push(
            Record::new(Region::new("Kerala", "Idukki"), date(day))
                .with_count(BIO_AGE_17_PLUS, 25.0),
        );
        records.push(
            Record::new(Region::new("Bihar", "Patna"), date(day))
                .with_count(BIO_AGE_17_PLUS, 90.0),
        );
    }
    records
}

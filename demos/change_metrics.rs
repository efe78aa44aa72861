//! Change metrics walkthrough with a synthetic metric source.
//!
//! Run with: cargo run --example change_metrics
//! Set RUST_LOG=chainmetrics=debug to see chunk requests.

use chainmetrics::change::{moving_average, moving_average_change, n_period_change_raw};
use chainmetrics::chart::DualAxisChart;
use chainmetrics::core::{MetricFrame, TimeSeries};
use chainmetrics::fetch::{DateChunk, MetricFetcher, MetricQuery};
use chainmetrics::Result;
use chrono::{Duration, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

/// Daily values following a noisy cycle, standing in for a metrics API.
fn synthetic_source(_query: &MetricQuery, chunk: &DateChunk) -> Result<TimeSeries> {
    let origin = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let start = Utc.from_utc_datetime(&chunk.start.and_hms_opt(0, 0, 0).unwrap());

    let timestamps: Vec<_> = (0..chunk.days()).map(|d| start + Duration::days(d)).collect();
    let values: Vec<f64> = timestamps
        .iter()
        .map(|t| {
            let day = (*t - origin).num_days() as f64;
            20_000.0 + 5_000.0 * (day / 45.0).sin() + 300.0 * (day * 1.7).cos()
        })
        .collect();

    TimeSeries::from_f64(timestamps, &values)
}

fn fmt(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{:.4}", v))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Change Metrics Example ===\n");

    // 1. Raw buffer change
    println!("--- N-period change on a raw buffer ---");
    let raw = [100.0, 110.0, 99.0, 108.0, 115.0];
    let changes = n_period_change_raw(&raw, 1)?;
    for (v, c) in raw.iter().zip(changes.iter()) {
        println!("{:>8.1} {:>10.4}", v, c);
    }

    // 2. Chunked fetch
    println!("\n--- Chunked fetch ---");
    let fetcher = MetricFetcher::new(synthetic_source);
    let query = MetricQuery::new("price_usd", "bitcoin", "1d");
    let price = fetcher.fetch_between(&query, "2023-01-01", "2023-12-31")?;
    println!(
        "{}: {} observations, frequency {:?}",
        price.name().unwrap_or("?"),
        price.len(),
        price.frequency()
    );

    // 3. Derived metrics
    println!("\n--- Derived metrics (last 5 days) ---");
    let change_7d = price.pct_change(7)?;
    let ma_30d = moving_average(&price, Duration::days(30), 1)?;
    let ma_30d_change = moving_average_change(&price, Duration::days(30), Duration::days(7))?;

    println!(
        "{:>12} {:>12} {:>10} {:>12} {:>12}",
        "Date", "Price", "7d chg", "MA(30d)", "MA chg 7d"
    );
    println!("{:-<62}", "");
    for i in price.len().saturating_sub(5)..price.len() {
        println!(
            "{:>12} {:>12} {:>10} {:>12} {:>12}",
            price.timestamps()[i].date_naive(),
            fmt(price.values()[i]),
            fmt(change_7d.values()[i]),
            fmt(ma_30d.values()[i]),
            fmt(ma_30d_change.values()[i]),
        );
    }

    // 4. Chart description
    let frame = MetricFrame::new()
        .with("price_usd", price.clone())
        .with("ma_30d", ma_30d)
        .with("ma_30d_change_7d", ma_30d_change);
    let events = vec![price.timestamps()[90], price.timestamps()[200]];

    let chart = DualAxisChart::new(["price_usd", "ma_30d"])
        .right("ma_30d_change_7d")
        .markers(events)
        .build(&frame)?;

    println!("\n--- Chart ---");
    println!(
        "{} left lines, right line: {}, {} markers spanning [{:.1}, {:.1}]",
        chart.left.len(),
        chart.right.as_ref().map_or("none", |l| l.metric.as_str()),
        chart.markers.len(),
        chart.markers[0].y_min,
        chart.markers[0].y_max,
    );

    Ok(())
}

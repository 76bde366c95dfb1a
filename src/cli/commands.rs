use anyhow::{bail, Context, Result};
use std::time::Duration;

use alphaedge::config::Config;
use alphaedge::cot::{self, ReportClient, SnapshotStore};
use alphaedge::market::{momentum_sentiment, BiasFeed, YahooHistoryClient};

/// Download both weekly reports and replace the persisted snapshot
pub async fn refresh(config: &Config) -> Result<()> {
    let client = ReportClient::new(config);
    let store = SnapshotStore::new(&config.snapshot_path);

    let outcome = cot::refresh(&client, &config.instruments, &store)
        .await
        .context("COT refresh failed; previous snapshot left in place")?;

    for (report_type, result) in &outcome.reports {
        match result {
            Ok(report) => println!(
                "  {} report {}: {} instruments ({} rows retained, {} ambiguous, {} dropped)",
                report_type,
                report.report_date,
                report.matched,
                report.rows_retained,
                report.ambiguous_matches,
                report.skipped_instruments.len(),
            ),
            Err(e) => println!("  {} report: no data ({e})", report_type),
        }
    }
    println!(
        "\n✅ Saved {} instruments to {}",
        outcome.total,
        store.path().display()
    );
    Ok(())
}

/// Print the persisted snapshot as a table
pub fn snapshot(config: &Config) -> Result<()> {
    let store = SnapshotStore::new(&config.snapshot_path);
    let Some(snapshot) = store.load()? else {
        println!("ℹ️  No snapshot found at {}. Run `alphaedge refresh`.", store.path().display());
        return Ok(());
    };

    println!(
        "{:<8} {:>12} {:>12} {:>9} {:>9} {:>8} {:>12}",
        "SYMBOL", "LONGS", "SHORTS", "LONG %", "SHORT %", "NET %", "OPEN INT"
    );
    for (symbol, record) in &snapshot {
        println!(
            "{:<8} {:>12.0} {:>12.0} {:>8.1}% {:>8.1}% {:>7.2}% {:>12.0}",
            symbol,
            record.long_pos,
            record.short_pos,
            record.long_pct,
            record.short_pct,
            record.net_pct,
            record.open_int,
        );
    }
    Ok(())
}

/// Compute and print the live bias batch
pub async fn bias(config: &Config) -> Result<()> {
    let provider = YahooHistoryClient::new(config.http_timeout_seconds);
    let feed = BiasFeed::new(
        provider,
        config.watchlist.clone(),
        Duration::from_secs(config.bias_cache_ttl_seconds),
    );

    let batch = feed.get_batch().await;
    if batch.is_empty() {
        println!("⚠️  No bias data available");
        return Ok(());
    }

    println!(
        "{:<12} {:<8} {:>6} {:<9} {:<11} {:>12}",
        "SYMBOL", "BIAS", "SCORE", "TREND", "TECH", "PRICE"
    );
    for record in batch.values() {
        println!(
            "{:<12} {:<8} {:>+6} {:<9} {:<11} {:>12.4}",
            record.symbol,
            record.bias.as_str(),
            record.score,
            record.trend,
            record.tech.as_str(),
            record.price,
        );
    }
    Ok(())
}

/// Print the momentum sentiment for one watchlist symbol
pub async fn sentiment(config: &Config, symbol: &str) -> Result<()> {
    let Some(entry) = config
        .watchlist
        .iter()
        .find(|e| e.symbol.eq_ignore_ascii_case(symbol))
    else {
        bail!("'{symbol}' is not on the watchlist");
    };

    let provider = YahooHistoryClient::new(config.http_timeout_seconds);
    let sentiment = momentum_sentiment(&provider, &entry.ticker).await;
    println!("{}: {}", entry.symbol, sentiment);
    Ok(())
}

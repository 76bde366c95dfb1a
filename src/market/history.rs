//! OHLC history capability.
//!
//! `HistoryProvider` is the seam the bias feed consumes; the production
//! implementation queries the Yahoo Finance v8 chart API, tests substitute a
//! fixture provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{MarketError, MarketResult};

/// One OHLC bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Capability for fetching ordered OHLC history for a ticker.
///
/// `range` and `interval` use the data source's tokens ("1d"/"5m",
/// "5d"/"1h", "1mo"/"1d"). Implementations return bars oldest-first and may
/// return an empty vector when the source has nothing for the window.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_history(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> MarketResult<Vec<Bar>>;
}

/// Yahoo Finance v8 chart API response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
}

pub struct YahooHistoryClient {
    client: reqwest::Client,
}

impl YahooHistoryClient {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent("Mozilla/5.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }
}

#[async_trait]
impl HistoryProvider for YahooHistoryClient {
    async fn fetch_history(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> MarketResult<Vec<Bar>> {
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}",
            ticker, range, interval
        );
        debug!(ticker, range, interval, "Fetching price history");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::Api {
                ticker: ticker.to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: ChartResponse = response.json().await?;
        let result = parsed
            .chart
            .result
            .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
            .ok_or_else(|| MarketError::no_data(ticker))?;

        Ok(assemble_bars(&result))
    }
}

/// Zip the parallel timestamp/quote arrays into bars, dropping buckets where
/// the source reported nulls (halted sessions, padding).
fn assemble_bars(result: &ChartResult) -> Vec<Bar> {
    let Some(timestamps) = result.timestamp.as_ref() else {
        return Vec::new();
    };
    let Some(quote) = result.indicators.quote.first() else {
        return Vec::new();
    };

    let empty: Vec<Option<f64>> = Vec::new();
    let opens = quote.open.as_ref().unwrap_or(&empty);
    let highs = quote.high.as_ref().unwrap_or(&empty);
    let lows = quote.low.as_ref().unwrap_or(&empty);
    let closes = quote.close.as_ref().unwrap_or(&empty);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            opens.get(i).copied(),
            highs.get(i).copied(),
            lows.get(i).copied(),
            closes.get(i).copied(),
        ) else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
        });
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_bars_skips_null_buckets() {
        let result = ChartResult {
            timestamp: Some(vec![1_700_000_000, 1_700_000_300, 1_700_000_600]),
            indicators: ChartIndicators {
                quote: vec![ChartQuote {
                    open: Some(vec![Some(1.0), None, Some(1.2)]),
                    high: Some(vec![Some(1.1), Some(1.2), Some(1.3)]),
                    low: Some(vec![Some(0.9), Some(1.0), Some(1.1)]),
                    close: Some(vec![Some(1.05), Some(1.15), Some(1.25)]),
                }],
            },
        };

        let bars = assemble_bars(&result);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 1.05);
        assert_eq!(bars[1].close, 1.25);
    }

    #[test]
    fn test_assemble_bars_empty_without_timestamps() {
        let result = ChartResult {
            timestamp: None,
            indicators: ChartIndicators { quote: vec![] },
        };
        assert!(assemble_bars(&result).is_empty());
    }
}

//! Trend bias computation and the TTL batch cache.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::errors::{MarketError, MarketResult};
use super::history::{Bar, HistoryProvider};
use super::WatchEntry;

const SMA_PERIOD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
}

impl Bias {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bias::Bullish => "BULLISH",
            Bias::Bearish => "BEARISH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl TechSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TechSignal::Overbought => "Overbought",
            TechSignal::Oversold => "Oversold",
            TechSignal::Neutral => "Neutral",
        }
    }
}

/// One row of the live dashboard table. Recomputed each refresh, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasRecord {
    pub symbol: String,
    pub bias: Bias,
    /// Signed momentum score, magnitude 1-10, negative when bearish.
    pub score: i32,
    pub trend: String,
    pub tech: TechSignal,
    pub price: f64,
}

/// Price vs 20-period SMA with a bounded momentum score.
///
/// With fewer than 20 bars the SMA falls back to the current price (neutral),
/// and a non-positive window open is replaced by the current price so the
/// percent change degrades to zero.
pub fn compute_bias(symbol: &str, bars: &[Bar]) -> MarketResult<BiasRecord> {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(MarketError::no_data(symbol));
    };

    let price = last.close;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let sma = sma(&closes, SMA_PERIOD).unwrap_or(price);
    let bias = if price > sma { Bias::Bullish } else { Bias::Bearish };

    let open = if first.open > 0.0 { first.open } else { price };
    let pct_change = if open > 0.0 {
        (price - open) / open * 100.0
    } else {
        0.0
    };

    let magnitude = (pct_change.abs() * 50.0).round().clamp(1.0, 10.0) as i32;
    let score = match bias {
        Bias::Bullish => magnitude,
        Bias::Bearish => -magnitude,
    };

    let tech = if score >= 8 {
        TechSignal::Overbought
    } else if score <= -8 {
        TechSignal::Oversold
    } else {
        TechSignal::Neutral
    };

    Ok(BiasRecord {
        symbol: symbol.to_string(),
        bias,
        score,
        trend: match bias {
            Bias::Bullish => "Upward".to_string(),
            Bias::Bearish => "Downward".to_string(),
        },
        tech,
        price,
    })
}

/// Simple moving average of the last `period` values; `None` when there are
/// not enough values.
fn sma(values: &[f64], period: usize) -> Option<f64> {
    if values.len() < period || period == 0 {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

struct CacheSlot {
    computed_at: Instant,
    batch: BTreeMap<String, BiasRecord>,
}

/// Read-through cache over the whole watchlist: one TTL for the batch, full
/// recomputation on expiry, no per-symbol invalidation.
pub struct BiasFeed<P: HistoryProvider> {
    provider: P,
    watchlist: Vec<WatchEntry>,
    ttl: Duration,
    cache: Mutex<Option<CacheSlot>>,
}

impl<P: HistoryProvider> BiasFeed<P> {
    pub fn new(provider: P, watchlist: Vec<WatchEntry>, ttl: Duration) -> Self {
        Self {
            provider,
            watchlist,
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// The current batch, recomputing when the cached one has expired.
    pub async fn get_batch(&self) -> BTreeMap<String, BiasRecord> {
        let mut slot = self.cache.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.computed_at.elapsed() < self.ttl {
                debug!(symbols = cached.batch.len(), "Serving cached bias batch");
                return cached.batch.clone();
            }
        }

        let batch = self.compute_batch().await;
        *slot = Some(CacheSlot {
            computed_at: Instant::now(),
            batch: batch.clone(),
        });
        batch
    }

    /// Lookup into the (possibly refreshed) batch.
    pub async fn get_bias(&self, symbol: &str) -> Option<BiasRecord> {
        self.get_batch().await.get(symbol).cloned()
    }

    async fn compute_batch(&self) -> BTreeMap<String, BiasRecord> {
        let mut batch = BTreeMap::new();
        for entry in &self.watchlist {
            match self.compute_one(entry).await {
                Ok(record) => {
                    batch.insert(entry.symbol.clone(), record);
                }
                Err(e) => {
                    // Partial batches are expected; the symbol just sits out
                    // this refresh.
                    warn!(symbol = %entry.symbol, "Bias computation skipped: {e}");
                }
            }
        }
        batch
    }

    async fn compute_one(&self, entry: &WatchEntry) -> MarketResult<BiasRecord> {
        let mut bars = self.provider.fetch_history(&entry.ticker, "1d", "5m").await?;
        if bars.is_empty() {
            bars = self.provider.fetch_history(&entry.ticker, "5d", "1h").await?;
        }
        compute_bias(&entry.symbol, &bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars_from_closes(open: f64, closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 300, 0).unwrap(),
                open: if i == 0 { open } else { close },
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    #[test]
    fn test_score_clamped_at_ten() {
        // 25% intraday move: |25| * 50 would be 1250 without the clamp.
        let mut closes = vec![100.0; 19];
        closes.push(125.0);
        let bars = bars_from_closes(100.0, &closes);
        let record = compute_bias("BTC", &bars).unwrap();
        assert_eq!(record.bias, Bias::Bullish);
        assert_eq!(record.score, 10);
        assert_eq!(record.tech, TechSignal::Overbought);
    }

    #[test]
    fn test_bearish_score_is_negative() {
        let bars = bars_from_closes(100.0, &[100.0, 95.0, 75.0]);
        let record = compute_bias("EUR/USD", &bars).unwrap();
        assert_eq!(record.bias, Bias::Bearish);
        assert_eq!(record.score, -10);
        assert_eq!(record.tech, TechSignal::Oversold);
        assert_eq!(record.trend, "Downward");
    }

    #[test]
    fn test_sma_falls_back_to_price_when_short() {
        // Two bars, last close above the window open but equal to the SMA
        // fallback, so price > sma is false.
        let bars = bars_from_closes(100.0, &[100.0, 101.0]);
        let record = compute_bias("GOLD", &bars).unwrap();
        assert_eq!(record.bias, Bias::Bearish);
    }

    #[test]
    fn test_sma_uses_last_twenty_closes() {
        // 19 flat closes at 100 then a pop to 120: SMA(20) = 101, price 120.
        let mut closes = vec![100.0; 19];
        closes.push(120.0);
        let bars = bars_from_closes(100.0, &closes);
        let record = compute_bias("SPX", &bars).unwrap();
        assert_eq!(record.bias, Bias::Bullish);
        assert_eq!(record.trend, "Upward");
    }

    #[test]
    fn test_non_positive_open_degrades_to_zero_change() {
        let mut bars = bars_from_closes(0.0, &[100.0, 100.0]);
        bars[0].open = 0.0;
        let record = compute_bias("VIX", &bars).unwrap();
        // Zero change still scores the minimum magnitude.
        assert_eq!(record.score.abs(), 1);
    }

    #[test]
    fn test_empty_bars_is_no_data() {
        let err = compute_bias("EUR/USD", &[]).unwrap_err();
        assert!(matches!(err, MarketError::NoData { .. }));
    }
}

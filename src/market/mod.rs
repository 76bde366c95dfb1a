//! Live market bias pipeline
//! Fetches short-interval price history per watchlist symbol, derives a trend
//! bias and momentum score, and serves the batch from a TTL cache.

pub mod bias;
pub mod errors;
pub mod history;
pub mod sentiment;

// Re-export commonly used types
pub use bias::{Bias, BiasFeed, BiasRecord, TechSignal};
pub use errors::{MarketError, MarketResult};
pub use history::{Bar, HistoryProvider, YahooHistoryClient};
pub use sentiment::{momentum_sentiment, Sentiment};

use serde::{Deserialize, Serialize};

/// One watchlist entry: the symbol shown on the dashboard and the ticker the
/// market-data source knows it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub symbol: String,
    pub ticker: String,
}

impl WatchEntry {
    pub fn new(symbol: &str, ticker: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ticker: ticker.to_string(),
        }
    }
}

/// Built-in watchlist served by the bias feed.
pub fn default_watchlist() -> Vec<WatchEntry> {
    vec![
        // Forex
        WatchEntry::new("EUR/USD", "EURUSD=X"),
        WatchEntry::new("GBP/USD", "GBPUSD=X"),
        WatchEntry::new("USD/JPY", "USDJPY=X"),
        WatchEntry::new("USD/CHF", "USDCHF=X"),
        WatchEntry::new("AUD/USD", "AUDUSD=X"),
        WatchEntry::new("USD/CAD", "USDCAD=X"),
        WatchEntry::new("NZD/USD", "NZDUSD=X"),
        WatchEntry::new("USD/ZAR", "USDZAR=X"),
        WatchEntry::new("GBP/ZAR", "GBPZAR=X"),
        // Index futures
        WatchEntry::new("S&P 500", "ES=F"),
        WatchEntry::new("NASDAQ 100", "NQ=F"),
        WatchEntry::new("US 30", "YM=F"),
        WatchEntry::new("VIX", "^VIX"),
        // Commodities
        WatchEntry::new("GOLD", "GC=F"),
        WatchEntry::new("SILVER", "SI=F"),
        WatchEntry::new("OIL (WTI)", "CL=F"),
        WatchEntry::new("NAT GAS", "NG=F"),
        // Crypto
        WatchEntry::new("BITCOIN", "BTC-USD"),
        WatchEntry::new("ETHEREUM", "ETH-USD"),
        WatchEntry::new("SOLANA", "SOL-USD"),
    ]
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::cot::instruments::{default_instruments, Instrument};
use crate::market::{default_watchlist, WatchEntry};

const DEFAULT_SNAPSHOT_PATH: &str = "cot_live.json";
const DEFAULT_DISAGG_URL: &str = "https://www.cftc.gov/dea/newcot/f_disagg.txt";
const DEFAULT_FINANCIAL_URL: &str = "https://www.cftc.gov/dea/newcot/FinFutWk.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the merged COT snapshot is persisted.
    pub snapshot_path: PathBuf,
    /// Disaggregated (commodities) weekly report.
    pub disagg_url: String,
    /// Traders in Financial Futures weekly report.
    pub financial_url: String,
    pub http_timeout_seconds: u64,
    pub bias_cache_ttl_seconds: u64,
    /// Keyword catalog scanned against both report types.
    pub instruments: Vec<Instrument>,
    /// Symbols served by the bias feed, with their market-data tickers.
    pub watchlist: Vec<WatchEntry>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        let config = Config {
            snapshot_path: env::var("COT_SNAPSHOT_PATH")
                .unwrap_or_else(|_| DEFAULT_SNAPSHOT_PATH.to_string())
                .into(),
            disagg_url: env::var("COT_DISAGG_URL")
                .unwrap_or_else(|_| DEFAULT_DISAGG_URL.to_string()),
            financial_url: env::var("COT_FINANCIAL_URL")
                .unwrap_or_else(|_| DEFAULT_FINANCIAL_URL.to_string()),
            http_timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid HTTP_TIMEOUT_SECONDS value")?,
            bias_cache_ttl_seconds: env::var("BIAS_CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("Invalid BIAS_CACHE_TTL_SECONDS value")?,
            instruments: default_instruments(),
            watchlist: default_watchlist(),
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: DEFAULT_SNAPSHOT_PATH.into(),
            disagg_url: DEFAULT_DISAGG_URL.to_string(),
            financial_url: DEFAULT_FINANCIAL_URL.to_string(),
            http_timeout_seconds: 30,
            bias_cache_ttl_seconds: 60,
            instruments: default_instruments(),
            watchlist: default_watchlist(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.snapshot_path, PathBuf::from("cot_live.json"));
        assert_eq!(config.http_timeout_seconds, 30);
        assert_eq!(config.bias_cache_ttl_seconds, 60);
        assert!(!config.instruments.is_empty());
        assert!(!config.watchlist.is_empty());
    }
}

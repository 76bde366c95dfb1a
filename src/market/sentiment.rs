//! 14-day momentum sentiment.
//!
//! A coarse label for the dashboard's metric tile. Deliberately infallible:
//! any fetch or compute problem collapses to Neutral so the tile always
//! renders.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::errors::MarketResult;
use super::history::HistoryProvider;

const MOMENTUM_DAYS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    StrongBuy,
    Bullish,
    Neutral,
    Bearish,
    StrongSell,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::StrongBuy => "Strong Buy",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
            Sentiment::StrongSell => "Strong Sell",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a 14-day percent change into the five sentiment tiers.
///
/// Boundaries are exclusive: a change of exactly 1.0% is still Neutral.
pub fn bucket_momentum(change_pct: f64) -> Sentiment {
    if change_pct > 5.0 {
        Sentiment::StrongBuy
    } else if change_pct > 1.0 {
        Sentiment::Bullish
    } else if change_pct < -5.0 {
        Sentiment::StrongSell
    } else if change_pct < -1.0 {
        Sentiment::Bearish
    } else {
        Sentiment::Neutral
    }
}

/// Sentiment from the percent change across the last 14 daily closes.
///
/// Never raises: failures and thin history both come back as Neutral.
pub async fn momentum_sentiment<P: HistoryProvider + ?Sized>(
    provider: &P,
    ticker: &str,
) -> Sentiment {
    match fetch_momentum(provider, ticker).await {
        Ok(sentiment) => sentiment,
        Err(e) => {
            debug!(ticker, "Momentum sentiment fell back to neutral: {e}");
            Sentiment::Neutral
        }
    }
}

async fn fetch_momentum<P: HistoryProvider + ?Sized>(
    provider: &P,
    ticker: &str,
) -> MarketResult<Sentiment> {
    // The source's range tokens don't include "14 days"; fetch a month of
    // daily bars and keep the last 14.
    let bars = provider.fetch_history(ticker, "1mo", "1d").await?;
    if bars.len() < MOMENTUM_DAYS {
        return Ok(Sentiment::Neutral);
    }

    let window = &bars[bars.len() - MOMENTUM_DAYS..];
    let start = window[0].close;
    let end = window[MOMENTUM_DAYS - 1].close;
    if start <= 0.0 {
        return Ok(Sentiment::Neutral);
    }

    Ok(bucket_momentum((end - start) / start * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_momentum(5.5), Sentiment::StrongBuy);
        assert_eq!(bucket_momentum(5.0), Sentiment::Bullish);
        assert_eq!(bucket_momentum(1.0), Sentiment::Neutral);
        assert_eq!(bucket_momentum(1.1), Sentiment::Bullish);
        assert_eq!(bucket_momentum(-1.0), Sentiment::Neutral);
        assert_eq!(bucket_momentum(-2.0), Sentiment::Bearish);
        assert_eq!(bucket_momentum(-6.0), Sentiment::StrongSell);
        assert_eq!(bucket_momentum(0.0), Sentiment::Neutral);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Sentiment::StrongBuy.to_string(), "Strong Buy");
        assert_eq!(Sentiment::StrongSell.as_str(), "Strong Sell");
    }
}

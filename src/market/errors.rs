use thiserror::Error;

/// Error types for market-data operations
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market data request for {ticker} failed with status {status}")]
    Api { ticker: String, status: u16 },

    #[error("no history available for {ticker}")]
    NoData { ticker: String },

    #[error("parse error: {message}")]
    Parse { message: String },
}

/// Result type for market-data operations
pub type MarketResult<T> = Result<T, MarketError>;

impl MarketError {
    pub fn no_data<S: Into<String>>(ticker: S) -> Self {
        MarketError::NoData {
            ticker: ticker.into(),
        }
    }

    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        MarketError::Parse {
            message: message.into(),
        }
    }
}

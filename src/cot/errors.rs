use thiserror::Error;

use super::schema::ReportType;

/// Error types for COT report ingestion and snapshot persistence
#[derive(Error, Debug)]
pub enum CotError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("report request for {report} failed with status {status}")]
    Status { report: ReportType, status: u16 },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("no data: {context}")]
    NoData { context: String },

    #[error("extraction error: {message}")]
    Extraction { message: String },

    #[error("report layout drift: schema needs at least {required} columns, widest row has {observed}")]
    Schema { required: usize, observed: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for COT operations
pub type CotResult<T> = Result<T, CotError>;

impl CotError {
    /// Create a parse error with context
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        CotError::Parse {
            message: message.into(),
        }
    }

    /// Create an extraction error with context
    pub fn extraction_error<S: Into<String>>(message: S) -> Self {
        CotError::Extraction {
            message: message.into(),
        }
    }

    /// Create a no-data error with context
    pub fn no_data<S: Into<String>>(context: S) -> Self {
        CotError::NoData {
            context: context.into(),
        }
    }
}

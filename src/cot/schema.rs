//! Column layouts for the two weekly report files.
//!
//! The feeds are headerless, so fields are addressed by position. Each layout
//! is written out as an explicit named-field table and checked against the
//! observed row width so a provider-side format revision fails loudly instead
//! of extracting the wrong columns.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{CotError, CotResult};

/// Which of the two weekly publications a row set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// Disaggregated report (metals, energy, agriculture); long/short are the
    /// managed-money columns.
    Commodities,
    /// Traders in Financial Futures report (currencies, indices, crypto);
    /// long/short are the leveraged-funds columns.
    Financials,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Commodities => "commodities",
            ReportType::Financials => "financials",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based column indices for the fields we extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSchema {
    pub name: usize,
    pub date: usize,
    pub open_interest: usize,
    pub change_oi: usize,
    pub long: usize,
    pub short: usize,
    pub change_long: usize,
    pub change_short: usize,
}

impl ReportSchema {
    /// Layout for the given report type, as observed in the published files.
    pub fn for_report(report_type: ReportType) -> Self {
        match report_type {
            ReportType::Commodities => ReportSchema {
                name: 0,
                date: 2,
                open_interest: 7,
                change_oi: 24,
                long: 12,
                short: 13,
                change_long: 29,
                change_short: 30,
            },
            ReportType::Financials => ReportSchema {
                name: 0,
                date: 2,
                open_interest: 7,
                change_oi: 24,
                long: 14,
                short: 15,
                change_long: 31,
                change_short: 32,
            },
        }
    }

    /// Minimum row width this layout can be extracted from.
    pub fn min_columns(&self) -> usize {
        let max_index = self
            .name
            .max(self.date)
            .max(self.open_interest)
            .max(self.change_oi)
            .max(self.long)
            .max(self.short)
            .max(self.change_long)
            .max(self.change_short);
        max_index + 1
    }

    /// Reject a row set whose widest row cannot hold every schema column.
    pub fn validate_width(&self, observed: usize) -> CotResult<()> {
        let required = self.min_columns();
        if observed < required {
            return Err(CotError::Schema { required, observed });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_columns_per_report() {
        assert_eq!(ReportSchema::for_report(ReportType::Commodities).min_columns(), 31);
        assert_eq!(ReportSchema::for_report(ReportType::Financials).min_columns(), 33);
    }

    #[test]
    fn test_validate_width_rejects_narrow_layout() {
        let schema = ReportSchema::for_report(ReportType::Financials);
        let err = schema.validate_width(20).unwrap_err();
        assert!(matches!(err, CotError::Schema { required: 33, observed: 20 }));
        assert!(schema.validate_width(33).is_ok());
    }
}

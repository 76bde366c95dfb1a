//! CFTC Commitments of Traders ingestion pipeline
//! Downloads the two weekly report files, extracts positioning per configured
//! instrument, and maintains the persisted snapshot consumed by the dashboard.

pub mod errors;
pub mod ingest;
pub mod instruments;
pub mod schema;
pub mod snapshot;

// Re-export commonly used types
pub use errors::{CotError, CotResult};
pub use ingest::{ingest_report, IngestReport, ReportClient, ReportSource};
pub use instruments::Instrument;
pub use schema::{ReportSchema, ReportType};
pub use snapshot::{refresh, RefreshOutcome, Snapshot, SnapshotStore};

use serde::{Deserialize, Serialize};

/// The six numeric fields pulled straight out of a report row, before any
/// derived math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPositions {
    pub long: f64,
    pub short: f64,
    pub change_long: f64,
    pub change_short: f64,
    pub open_interest: f64,
    pub change_oi: f64,
}

/// Per-instrument positioning as persisted in the snapshot file.
///
/// The field set and names are the wire contract with the dashboard layer;
/// do not rename or reorder without updating the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositioningRecord {
    pub long_pos: f64,
    pub short_pos: f64,
    pub change_long: f64,
    pub change_short: f64,
    pub long_pct: f64,
    pub short_pct: f64,
    pub net_pct: f64,
    pub net_pos: f64,
    pub open_int: f64,
    pub change_oi: f64,
}

impl PositioningRecord {
    /// Derive the persisted record from raw extracted fields.
    ///
    /// `long_pct`/`short_pct` are shares of long+short only and sum to 100
    /// when that total is positive; `net_pct` is net position over open
    /// interest, 0 when open interest is not positive.
    pub fn from_raw(raw: RawPositions) -> Self {
        let net_pos = raw.long - raw.short;
        let total = raw.long + raw.short;
        let (long_pct, short_pct) = if total > 0.0 {
            (raw.long / total * 100.0, raw.short / total * 100.0)
        } else {
            (0.0, 0.0)
        };
        let net_pct = if raw.open_interest > 0.0 {
            net_pos / raw.open_interest * 100.0
        } else {
            0.0
        };

        Self {
            long_pos: raw.long,
            short_pos: raw.short,
            change_long: raw.change_long,
            change_short: raw.change_short,
            long_pct,
            short_pct,
            net_pct,
            net_pos,
            open_int: raw.open_interest,
            change_oi: raw.change_oi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(long: f64, short: f64, oi: f64) -> RawPositions {
        RawPositions {
            long,
            short,
            change_long: 0.0,
            change_short: 0.0,
            open_interest: oi,
            change_oi: 0.0,
        }
    }

    #[test]
    fn test_pct_invariant() {
        let record = PositioningRecord::from_raw(raw(61_234.0, 38_766.0, 250_000.0));
        assert!((record.long_pct + record.short_pct - 100.0).abs() < 0.01);
        assert!((record.net_pos - 22_468.0).abs() < f64::EPSILON);
        assert!((record.net_pct - 22_468.0 / 250_000.0 * 100.0).abs() < 0.01);
    }

    #[test]
    fn test_zero_total_yields_zero_pcts() {
        let record = PositioningRecord::from_raw(raw(0.0, 0.0, 100.0));
        assert_eq!(record.long_pct, 0.0);
        assert_eq!(record.short_pct, 0.0);
    }

    #[test]
    fn test_net_pct_guarded_when_open_interest_not_positive() {
        let record = PositioningRecord::from_raw(raw(500.0, 100.0, 0.0));
        assert_eq!(record.net_pct, 0.0);

        let record = PositioningRecord::from_raw(raw(500.0, 100.0, -10.0));
        assert_eq!(record.net_pct, 0.0);
    }

    #[test]
    fn test_snapshot_json_shape() {
        // The dashboard reads these exact field names; values chosen so every
        // derived number is exactly representable.
        let record = PositioningRecord::from_raw(raw(750.0, 250.0, 2_000.0));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            "{\"long_pos\":750.0,\"short_pos\":250.0,\"change_long\":0.0,\
             \"change_short\":0.0,\"long_pct\":75.0,\"short_pct\":25.0,\
             \"net_pct\":25.0,\"net_pos\":500.0,\"open_int\":2000.0,\
             \"change_oi\":0.0}"
        );
    }
}

//! Snapshot persistence and refresh orchestration.
//!
//! The snapshot file is the single integration point with the dashboard
//! layer: a JSON object keyed by instrument symbol. Writers replace it
//! atomically; readers treat a missing file as "no snapshot yet".

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::errors::{CotError, CotResult};
use super::ingest::{ingest_report, IngestReport, ReportSource};
use super::instruments::Instrument;
use super::schema::ReportType;
use super::PositioningRecord;

/// Ordered so repeated serialization of identical input is byte-identical.
pub type Snapshot = BTreeMap<String, PositioningRecord>;

/// Load/save access to the persisted snapshot file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Union over symbols; later maps overwrite earlier ones on collision.
    pub fn merge(maps: Vec<BTreeMap<String, PositioningRecord>>) -> Snapshot {
        let mut merged = Snapshot::new();
        for map in maps {
            merged.extend(map);
        }
        merged
    }

    /// Serialize next to the destination and atomically replace it, so a
    /// concurrent reader sees either the old snapshot or the new one.
    pub fn save(&self, snapshot: &Snapshot) -> CotResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, snapshot)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| CotError::Io(e.error))?;

        Ok(())
    }

    pub fn load(&self) -> CotResult<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// What a refresh run did, per report and overall.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub total: usize,
    pub reports: Vec<(ReportType, Result<IngestReport, CotError>)>,
}

/// Run both ingestions, merge whatever succeeded, and persist the result.
///
/// A failure in one report type never blocks the other. The prior snapshot
/// is only replaced when the merge is non-empty; an empty merge is surfaced
/// as `CotError::NoData` and leaves the file untouched.
pub async fn refresh(
    source: &dyn ReportSource,
    instruments: &[Instrument],
    store: &SnapshotStore,
) -> CotResult<RefreshOutcome> {
    let mut merged_inputs = Vec::new();
    let mut reports = Vec::new();

    for report_type in [ReportType::Commodities, ReportType::Financials] {
        let result = match source.fetch(report_type).await {
            Ok(text) => ingest_report(report_type, &text, instruments),
            Err(e) => Err(e),
        };

        match result {
            Ok((records, report)) => {
                merged_inputs.push(records);
                reports.push((report_type, Ok(report)));
            }
            Err(e) => {
                warn!(report = report_type.as_str(), "Report contributed nothing: {e}");
                reports.push((report_type, Err(e)));
            }
        }
    }

    let merged = SnapshotStore::merge(merged_inputs);
    if merged.is_empty() {
        warn!("Refresh matched no instruments; previous snapshot left in place");
        return Err(CotError::no_data(
            "refresh matched no instruments across both reports",
        ));
    }

    store.save(&merged)?;
    info!(total = merged.len(), path = %store.path().display(), "Snapshot refreshed");

    Ok(RefreshOutcome {
        total: merged.len(),
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cot::RawPositions;

    fn record(long: f64, short: f64) -> PositioningRecord {
        PositioningRecord::from_raw(RawPositions {
            long,
            short,
            change_long: 0.0,
            change_short: 0.0,
            open_interest: 1_000.0,
            change_oi: 0.0,
        })
    }

    #[test]
    fn test_merge_later_sources_win() {
        let mut first = BTreeMap::new();
        first.insert("EUR".to_string(), record(100.0, 50.0));
        let mut second = BTreeMap::new();
        second.insert("EUR".to_string(), record(700.0, 300.0));
        second.insert("Gold".to_string(), record(10.0, 5.0));

        let merged = SnapshotStore::merge(vec![first, second]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["EUR"].long_pos, 700.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cot_live.json"));

        let mut snapshot = Snapshot::new();
        snapshot.insert("EUR".to_string(), record(600.0, 400.0));
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, Some(snapshot));
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("cot_live.json"));

        let mut first = Snapshot::new();
        first.insert("EUR".to_string(), record(600.0, 400.0));
        first.insert("Gold".to_string(), record(10.0, 5.0));
        store.save(&first).unwrap();

        let mut second = Snapshot::new();
        second.insert("BTC".to_string(), record(30.0, 20.0));
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("BTC"));
    }
}

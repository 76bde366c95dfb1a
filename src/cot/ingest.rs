//! Report download and row extraction.
//!
//! `ReportClient` fetches the raw weekly files; `ingest_report` is a pure
//! function of the report text, so the parsing pipeline is testable against
//! fixture content without any network.

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::errors::{CotError, CotResult};
use super::instruments::Instrument;
use super::schema::{ReportSchema, ReportType};
use super::{PositioningRecord, RawPositions};
use crate::config::Config;

/// Capability seam for fetching report text, so refresh orchestration can be
/// driven by fixture content in tests.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch(&self, report_type: ReportType) -> CotResult<String>;
}

/// HTTP client for the published report files.
pub struct ReportClient {
    client: reqwest::Client,
    disagg_url: String,
    financial_url: String,
}

impl ReportClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_seconds))
            .user_agent("Mozilla/5.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            disagg_url: config.disagg_url.clone(),
            financial_url: config.financial_url.clone(),
        }
    }

    fn url_for(&self, report_type: ReportType) -> &str {
        match report_type {
            ReportType::Commodities => &self.disagg_url,
            ReportType::Financials => &self.financial_url,
        }
    }
}

#[async_trait]
impl ReportSource for ReportClient {
    async fn fetch(&self, report_type: ReportType) -> CotResult<String> {
        let url = self.url_for(report_type);
        info!(report = report_type.as_str(), url, "Downloading report");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CotError::Status {
                report: report_type,
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Per-report observability record returned alongside the extracted mapping.
#[derive(Debug)]
pub struct IngestReport {
    pub report_type: ReportType,
    pub report_date: NaiveDate,
    pub rows_scanned: usize,
    pub rows_retained: usize,
    pub rows_skipped: usize,
    /// Instruments successfully extracted.
    pub matched: usize,
    /// Instruments whose keyword set matched more than one row.
    pub ambiguous_matches: usize,
    /// Instruments dropped because a field could not be extracted.
    pub skipped_instruments: Vec<(String, CotError)>,
}

/// Parse one report and extract positioning for every matched instrument.
///
/// Recovery granularity follows the pipeline stages: unreadable rows are
/// skipped, rows without a parseable date fall out of latest-date selection,
/// and a bad numeric field drops only that instrument. Only "no row carries a
/// date" and "the layout is too narrow for the schema" fail the whole report.
pub fn ingest_report(
    report_type: ReportType,
    text: &str,
    instruments: &[Instrument],
) -> CotResult<(BTreeMap<String, PositioningRecord>, IngestReport)> {
    let schema = ReportSchema::for_report(report_type);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<(Option<NaiveDate>, StringRecord)> = Vec::new();
    let mut rows_scanned = 0usize;
    let mut rows_skipped = 0usize;

    for result in reader.records() {
        rows_scanned += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                rows_skipped += 1;
                warn!(report = report_type.as_str(), "Skipping unreadable row: {e}");
                continue;
            }
        };
        let date = record.get(schema.date).and_then(parse_report_date);
        rows.push((date, record));
    }

    let report_date = rows
        .iter()
        .filter_map(|(date, _)| *date)
        .max()
        .ok_or_else(|| {
            CotError::no_data(format!("no parseable report dates in {report_type} report"))
        })?;

    // Weekly cutover: only rows from the latest publication date are kept.
    let retained: Vec<&StringRecord> = rows
        .iter()
        .filter(|(date, _)| *date == Some(report_date))
        .map(|(_, record)| record)
        .collect();

    let widest = retained.iter().map(|r| r.len()).max().unwrap_or(0);
    schema.validate_width(widest)?;

    let names: Vec<String> = retained
        .iter()
        .map(|record| record.get(schema.name).unwrap_or("").to_uppercase())
        .collect();

    let mut extracted = BTreeMap::new();
    let mut ambiguous_matches = 0usize;
    let mut skipped_instruments = Vec::new();

    for instrument in instruments {
        let mut matching = names
            .iter()
            .enumerate()
            .filter(|(_, name)| instrument.matches(name.as_str()));

        let Some((row_idx, _)) = matching.next() else {
            continue;
        };

        let extra = matching.count();
        if extra > 0 {
            ambiguous_matches += 1;
            warn!(
                report = report_type.as_str(),
                symbol = %instrument.symbol,
                extra,
                "Keyword set matched multiple rows; taking the first"
            );
        }

        match extract_raw(retained[row_idx], &schema) {
            Ok(raw) => {
                extracted.insert(instrument.symbol.clone(), PositioningRecord::from_raw(raw));
            }
            Err(e) => {
                warn!(
                    report = report_type.as_str(),
                    symbol = %instrument.symbol,
                    "Dropping instrument: {e}"
                );
                skipped_instruments.push((instrument.symbol.clone(), e));
            }
        }
    }

    info!(
        report = report_type.as_str(),
        date = %report_date,
        matched = extracted.len(),
        "Report ingested"
    );

    let report = IngestReport {
        report_type,
        report_date,
        rows_scanned,
        rows_retained: retained.len(),
        rows_skipped,
        matched: extracted.len(),
        ambiguous_matches,
        skipped_instruments,
    };

    Ok((extracted, report))
}

fn extract_raw(record: &StringRecord, schema: &ReportSchema) -> CotResult<RawPositions> {
    Ok(RawPositions {
        long: field_f64(record, schema.long)?,
        short: field_f64(record, schema.short)?,
        change_long: field_f64(record, schema.change_long)?,
        change_short: field_f64(record, schema.change_short)?,
        open_interest: field_f64(record, schema.open_interest)?,
        change_oi: field_f64(record, schema.change_oi)?,
    })
}

fn field_f64(record: &StringRecord, index: usize) -> CotResult<f64> {
    let raw = record
        .get(index)
        .ok_or_else(|| CotError::extraction_error(format!("missing column {index}")))?;
    let trimmed = raw.trim();
    trimmed.parse::<f64>().map_err(|_| {
        CotError::extraction_error(format!("non-numeric value '{trimmed}' in column {index}"))
    })
}

fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

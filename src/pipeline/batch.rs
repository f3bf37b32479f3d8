//! Delimited-text batch ingestion.
//!
//! Accepts a comma-separated upload with a header row. The measured-depth
//! column may be named `MD`, `md`, or `md_m`; inclination `INC` or
//! `inc_deg`; azimuth `AZI` or `azi_deg` (all case-insensitive). Missing or
//! empty angle cells default to 0.0, matching manual-entry behavior for
//! vertical sections.

use serde::Serialize;

use crate::error::SurveyError;
use crate::types::InputSource;

use super::{IngestRequest, SurveyPipeline};

/// A row that failed to ingest. `line` is the 1-based line number in the
/// uploaded file (the header is line 1).
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Batch result: every committed row is counted, every failed row reported.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub rows_inserted: usize,
    pub errors: Vec<RowError>,
}

struct ColumnMap {
    md: usize,
    inc: Option<usize>,
    azi: Option<usize>,
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

fn parse_header(line: &str) -> Result<ColumnMap, SurveyError> {
    let headers: Vec<String> = line.split(',').map(|h| h.trim().to_string()).collect();

    let md = find_column(&headers, &["md", "md_m"]).ok_or_else(|| {
        SurveyError::Validation("upload is missing a measured-depth column (MD/md/md_m)".to_string())
    })?;
    let inc = find_column(&headers, &["inc", "inc_deg"]);
    let azi = find_column(&headers, &["azi", "azi_deg"]);

    Ok(ColumnMap { md, inc, azi })
}

/// Parse the measured-depth cell, which every row must carry.
fn parse_md(fields: &[&str], idx: usize) -> Result<f64, String> {
    let raw = fields
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing measured-depth value".to_string())?;
    raw.parse::<f64>()
        .map_err(|_| format!("unparsable MD value: {raw:?}"))
}

/// Parse an angle cell; an absent or empty cell yields 0.0.
fn parse_cell(fields: &[&str], idx: Option<usize>, name: &str) -> Result<f64, String> {
    let raw = match idx.and_then(|i| fields.get(i)) {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return Ok(0.0),
    };
    raw.parse::<f64>()
        .map_err(|_| format!("unparsable {name} value: {raw:?}"))
}

pub(super) async fn ingest_csv(
    pipeline: &SurveyPipeline,
    well_id: &str,
    text: &str,
) -> Result<BatchOutcome, SurveyError> {
    let mut lines = text.lines().enumerate();

    let header = lines
        .by_ref()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| SurveyError::Validation("empty upload".to_string()))?;
    let columns = parse_header(header.1)?;

    let mut outcome = BatchOutcome {
        rows_inserted: 0,
        errors: Vec::new(),
    };

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split(',').collect();

        let parsed = parse_md(&fields, columns.md).and_then(|md_m| {
            let inc = parse_cell(&fields, columns.inc, "INC")?;
            let azi = parse_cell(&fields, columns.azi, "AZI")?;
            Ok((md_m, inc, azi))
        });
        let (md_m, inc_deg, azi_deg) = match parsed {
            Ok(values) => values,
            Err(message) => {
                outcome.errors.push(RowError {
                    line: line_no,
                    message,
                });
                continue;
            }
        };

        let req = IngestRequest {
            well_id: well_id.to_string(),
            md_m,
            inc_deg: Some(inc_deg),
            azi_deg: Some(azi_deg),
            sensors: None,
            toolface_deg: None,
            run_id: None,
            source: InputSource::Csv,
        };
        match pipeline.ingest(req).await {
            Ok(_) => outcome.rows_inserted += 1,
            Err(e) => outcome.errors.push(RowError {
                line: line_no,
                message: e.to_string(),
            }),
        }
    }

    tracing::info!(
        well = %well_id,
        rows_inserted = outcome.rows_inserted,
        row_errors = outcome.errors.len(),
        "Batch upload processed"
    );
    Ok(outcome)
}

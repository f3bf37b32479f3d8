//! Survey context: versioned calibration/quality metadata per well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Coordinate-system parameters for the well's local grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid/CRS name (e.g. "UTM31N").
    #[serde(default)]
    pub name: Option<String>,
    /// Grid convergence angle. Required for a complete grid definition;
    /// absence is flagged GRID_INCOMPLETE by the verifier.
    #[serde(default)]
    pub convergence_deg: Option<f64>,
}

/// Magnetic reference model metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagField {
    /// Model name (e.g. "IGRF-13", "BGGM").
    #[serde(default)]
    pub model: Option<String>,
    /// Model issue date, RFC 3339 or bare `YYYY-MM-DD`. Parsed leniently by
    /// the verifier — an unparsable date is treated as missing.
    #[serde(default)]
    pub model_date: Option<String>,
    /// Declination at the wellsite, if surveyed.
    #[serde(default)]
    pub declination_deg: Option<f64>,
}

/// One calibration/configuration epoch for a well.
///
/// Contexts are immutable once created. Updating a well's context means
/// inserting a new row; the active context at time T is the row with the
/// greatest `active_from <= T`. A well may have zero contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyContext {
    pub id: Uuid,
    pub well_id: String,
    pub mwd_tool_family: String,
    #[serde(default)]
    pub grid: Option<GridConfig>,
    /// Depth datums by name (meters). The "KB" (kelly bushing) reference is
    /// required; its absence is flagged DATUM_INCOMPLETE.
    #[serde(default)]
    pub datums: BTreeMap<String, f64>,
    #[serde(default)]
    pub formation: Option<serde_json::Value>,
    #[serde(default)]
    pub mag_field: MagField,
    #[serde(default)]
    pub tool_cal: Option<serde_json::Value>,
    #[serde(default)]
    pub quality_tags: Vec<String>,
    #[serde(default)]
    pub provenance: serde_json::Value,
    pub active_from: DateTime<Utc>,
}

impl SurveyContext {
    /// Datum key that every complete context must carry.
    pub const KB_DATUM: &'static str = "KB";

    pub fn has_kb_datum(&self) -> bool {
        self.datums.contains_key(Self::KB_DATUM)
    }
}

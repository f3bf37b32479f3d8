//! Survey input/solution ledger rows and quality-control vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Raw MWD sensor channels for one station. All channels optional — a tool
/// may report a partial set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorReadings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
}

impl SensorReadings {
    /// True when no channel carries a value.
    pub fn is_empty(&self) -> bool {
        self.mx.is_none()
            && self.my.is_none()
            && self.mz.is_none()
            && self.gx.is_none()
            && self.gy.is_none()
            && self.gz.is_none()
            && self.temp_c.is_none()
    }
}

/// Where a station came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    Manual,
    #[serde(rename = "CSV")]
    Csv,
    Sensor,
}

/// One ingested survey station, immutable once created.
///
/// Invariant: at least one of {non-empty `sensors`, both `inc_deg` and
/// `azi_deg` present} holds — the pipeline rejects anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyInput {
    pub id: Uuid,
    pub well_id: String,
    pub time: DateTime<Utc>,
    /// Measured depth — the station-chain ordering driver.
    pub md_m: f64,
    #[serde(default)]
    pub sensors: Option<SensorReadings>,
    #[serde(default)]
    pub inc_deg: Option<f64>,
    #[serde(default)]
    pub azi_deg: Option<f64>,
    #[serde(default)]
    pub toolface_deg: Option<f64>,
    #[serde(default)]
    pub run_id: Option<String>,
    /// The well's active context at ingestion time, if any.
    #[serde(default)]
    pub context_id: Option<Uuid>,
    pub source: InputSource,
}

/// Coarse quality score attached to each solution.
///
/// `Bad` is reserved — no current verifier rule produces it, but the enum
/// stays open for future fatal conditions. Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Bad = 0,
    Suspect = 1,
    Good = 2,
}

impl Serialize for Quality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Quality::Bad),
            1 => Ok(Quality::Suspect),
            2 => Ok(Quality::Good),
            other => Err(serde::de::Error::custom(format!(
                "invalid quality value: {other}"
            ))),
        }
    }
}

/// Quality-control flag codes emitted by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityFlag {
    /// No verification has been performed against a context.
    Unverified,
    /// No context existed for the well; defaults were assumed.
    ContextFallback,
    /// Magnetic reference model date absent or unparsable.
    MagModelMissing,
    /// Magnetic reference model older than the configured maximum age.
    MagModelStale,
    /// Grid configured without a convergence angle.
    GridIncomplete,
    /// Required "KB" depth datum absent.
    DatumIncomplete,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::Unverified => "UNVERIFIED",
            QualityFlag::ContextFallback => "CONTEXT_FALLBACK",
            QualityFlag::MagModelMissing => "MAG_MODEL_MISSING",
            QualityFlag::MagModelStale => "MAG_MODEL_STALE",
            QualityFlag::GridIncomplete => "GRID_INCOMPLETE",
            QualityFlag::DatumIncomplete => "DATUM_INCOMPLETE",
        }
    }
}

impl std::fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed trajectory solution — exactly one per [`SurveyInput`], produced
/// synchronously at ingestion time, immutable once created.
///
/// Positions are relative to the immediately preceding station *by measured
/// depth* for the same well. The chain root (shallowest station) sits at
/// N=E=TVD=0 with zero dogleg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySolution {
    pub id: Uuid,
    pub input_id: Uuid,
    #[serde(default)]
    pub context_id: Option<Uuid>,
    /// Measured depth copied from the input for depth-ordered listing.
    pub md_m: f64,
    pub inc_deg: f64,
    pub azi_deg: f64,
    pub tvd_m: f64,
    pub northing_m: f64,
    pub easting_m: f64,
    pub dogleg_deg30m: f64,
    /// Reference frame of the position columns. Always "LOCAL" today.
    pub frame: String,
    pub quality: Quality,
    pub flags: Vec<QualityFlag>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_roundtrip_as_integer() {
        let json = serde_json::to_string(&Quality::Good).unwrap();
        assert_eq!(json, "2");
        let q: Quality = serde_json::from_str("1").unwrap();
        assert_eq!(q, Quality::Suspect);
        assert!(serde_json::from_str::<Quality>("7").is_err());
    }

    #[test]
    fn test_flag_wire_format() {
        let json = serde_json::to_string(&QualityFlag::ContextFallback).unwrap();
        assert_eq!(json, "\"CONTEXT_FALLBACK\"");
        let flag: QualityFlag = serde_json::from_str("\"MAG_MODEL_STALE\"").unwrap();
        assert_eq!(flag, QualityFlag::MagModelStale);
        assert_eq!(flag.to_string(), "MAG_MODEL_STALE");
    }

    #[test]
    fn test_sensor_emptiness() {
        assert!(SensorReadings::default().is_empty());
        let partial = SensorReadings {
            gz: Some(9.81),
            ..Default::default()
        };
        assert!(!partial.is_empty());
    }
}

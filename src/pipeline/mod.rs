//! Ingestion pipeline orchestration.
//!
//! One ingest call: validate → resolve active context → verify → find the
//! previous solution by depth → minimum-curvature step → persist input +
//! solution. The previous-solution read and the persist run under a per-well
//! async mutex; ingests for different wells proceed in parallel, two ingests
//! for the same well never interleave steps 4–6 (that would let both read
//! the same predecessor and fork the chain).

mod batch;

pub use batch::{BatchOutcome, RowError};

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::SurveyError;
use crate::storage::SurveyStore;
use crate::trajectory::{compute_step, Position, Station};
use crate::types::{InputSource, QualityFlag, SensorReadings, SurveyInput, SurveySolution};
use crate::verifier::verify;

/// One station to ingest.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub well_id: String,
    pub md_m: f64,
    pub inc_deg: Option<f64>,
    pub azi_deg: Option<f64>,
    pub sensors: Option<SensorReadings>,
    pub toolface_deg: Option<f64>,
    pub run_id: Option<String>,
    pub source: InputSource,
}

/// Identifiers and flags returned to the caller after a successful ingest.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestOutcome {
    pub input_id: Uuid,
    pub solution_id: Uuid,
    pub flags: Vec<QualityFlag>,
}

/// Orchestrates survey ingestion over a [`SurveyStore`].
pub struct SurveyPipeline {
    store: SurveyStore,
    well_locks: DashMap<String, Arc<Mutex<()>>>,
    mag_model_max_age_days: i64,
}

impl SurveyPipeline {
    pub fn new(store: SurveyStore, mag_model_max_age_days: i64) -> Self {
        Self {
            store,
            well_locks: DashMap::new(),
            mag_model_max_age_days,
        }
    }

    pub fn store(&self) -> &SurveyStore {
        &self.store
    }

    /// Ingest a single station and synchronously compute its solution.
    pub async fn ingest(&self, req: IngestRequest) -> Result<IngestOutcome, SurveyError> {
        validate_request(&req)?;

        // Context resolution is read-only and deliberately outside the
        // per-well lock: contexts are append-only, so a race at worst picks
        // between two valid recent epochs.
        let context = self.store.active_context(&req.well_id)?;
        let (flags, quality) = verify(context.as_ref(), self.mag_model_max_age_days, Utc::now());

        // Stations carrying only sensor readings compute with zero angles
        // until a derivation stage fills them in.
        let inc_deg = req.inc_deg.unwrap_or(0.0);
        let azi_deg = req.azi_deg.unwrap_or(0.0);
        let station = Station {
            md_m: req.md_m,
            inc_deg,
            azi_deg,
        };

        let well_lock = self.well_lock(&req.well_id);
        let _guard = well_lock.lock().await;

        let prev = self.store.previous_solution(&req.well_id, req.md_m)?;
        let step = match &prev {
            Some(p) => {
                let prev_station = Station {
                    md_m: p.md_m,
                    inc_deg: p.inc_deg,
                    azi_deg: p.azi_deg,
                };
                let prev_pos = Position {
                    northing_m: p.northing_m,
                    easting_m: p.easting_m,
                    tvd_m: p.tvd_m,
                };
                compute_step(Some((&prev_station, prev_pos)), &station)
            }
            None => compute_step(None, &station),
        };

        let context_id = context.as_ref().map(|c| c.id);
        let now = Utc::now();
        let input = SurveyInput {
            id: Uuid::new_v4(),
            well_id: req.well_id.clone(),
            time: now,
            md_m: req.md_m,
            sensors: req.sensors,
            inc_deg: req.inc_deg,
            azi_deg: req.azi_deg,
            toolface_deg: req.toolface_deg,
            run_id: req.run_id,
            context_id,
            source: req.source,
        };
        let solution = SurveySolution {
            id: Uuid::new_v4(),
            input_id: input.id,
            context_id,
            md_m: req.md_m,
            inc_deg,
            azi_deg,
            tvd_m: step.position.tvd_m,
            northing_m: step.position.northing_m,
            easting_m: step.position.easting_m,
            dogleg_deg30m: step.dogleg_deg30m,
            frame: "LOCAL".to_string(),
            quality,
            flags: flags.clone(),
            created_at: now,
        };

        self.store.put_survey(&input, &solution)?;

        tracing::info!(
            well = %req.well_id,
            md_m = req.md_m,
            dls = step.dogleg_deg30m,
            quality = quality as u8,
            flag_count = flags.len(),
            "Ingested survey station"
        );

        Ok(IngestOutcome {
            input_id: input.id,
            solution_id: solution.id,
            flags,
        })
    }

    /// Ingest a delimited-text upload row by row, in file order.
    ///
    /// Best-effort: malformed rows are reported per row instead of aborting
    /// the batch, so callers always know exactly which rows committed.
    pub async fn ingest_csv(&self, well_id: &str, text: &str) -> Result<BatchOutcome, SurveyError> {
        batch::ingest_csv(self, well_id, text).await
    }

    fn well_lock(&self, well_id: &str) -> Arc<Mutex<()>> {
        self.well_locks
            .entry(well_id.to_string())
            .or_default()
            .clone()
    }
}

fn validate_request(req: &IngestRequest) -> Result<(), SurveyError> {
    if req.well_id.is_empty() || req.well_id.contains('\0') {
        return Err(SurveyError::Validation("invalid well_id".to_string()));
    }
    if !req.md_m.is_finite() {
        return Err(SurveyError::Validation(
            "md_m must be a finite number".to_string(),
        ));
    }
    for (name, angle) in [("inc_deg", req.inc_deg), ("azi_deg", req.azi_deg)] {
        if let Some(v) = angle {
            if !v.is_finite() {
                return Err(SurveyError::Validation(format!(
                    "{name} must be a finite number"
                )));
            }
        }
    }

    let has_sensors = req.sensors.as_ref().is_some_and(|s| !s.is_empty());
    let has_angles = req.inc_deg.is_some() && req.azi_deg.is_some();
    if !has_sensors && !has_angles {
        return Err(SurveyError::Validation(
            "a station must carry either a non-empty sensor set or both inc_deg and azi_deg"
                .to_string(),
        ));
    }
    Ok(())
}

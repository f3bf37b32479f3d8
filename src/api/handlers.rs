//! HTTP handlers for the survey service.
//!
//! All handlers return `Response` via the shared envelope, except `/health`
//! which keeps its legacy bare shape.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::envelope;
use crate::error::SurveyError;
use crate::pipeline::{IngestRequest, SurveyPipeline};
use crate::storage::SurveyStore;
use crate::types::{GridConfig, InputSource, MagField, SensorReadings, SurveyContext};

/// Shared state for all survey routes.
#[derive(Clone)]
pub struct ApiState {
    pub store: SurveyStore,
    pub pipeline: Arc<SurveyPipeline>,
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub well_id: String,
    #[serde(default = "default_tool_family")]
    pub mwd_tool_family: String,
    #[serde(default)]
    pub grid: Option<GridConfig>,
    #[serde(default)]
    pub datums: BTreeMap<String, f64>,
    #[serde(default)]
    pub formation: Option<serde_json::Value>,
    #[serde(default)]
    pub mag_field: MagField,
    #[serde(default)]
    pub tool_cal: Option<serde_json::Value>,
    #[serde(default)]
    pub provenance: serde_json::Value,
}

fn default_tool_family() -> String {
    "Tensor".to_string()
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub well_id: String,
    pub md_m: f64,
    #[serde(default)]
    pub inc_deg: Option<f64>,
    #[serde(default)]
    pub azi_deg: Option<f64>,
    #[serde(default)]
    pub sensors: Option<SensorReadings>,
    #[serde(default)]
    pub toolface_deg: Option<f64>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default = "default_source")]
    pub source: InputSource,
}

fn default_source() -> InputSource {
    InputSource::Manual
}

#[derive(Debug, Deserialize)]
pub struct CsvUploadRequest {
    pub well_id: String,
    pub csv: String,
}

#[derive(Debug, Deserialize)]
pub struct SolutionsQuery {
    pub well_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health — liveness probe (legacy bare shape, no envelope).
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok", "service": "borealis-survey"}))
}

/// POST /surveys/contexts — insert a new context epoch for a well.
pub async fn put_context(
    State(state): State<ApiState>,
    Json(req): Json<ContextRequest>,
) -> Response {
    if req.well_id.is_empty() || req.well_id.contains('\0') {
        return envelope::bad_request("invalid well_id");
    }

    let ctx = SurveyContext {
        id: Uuid::new_v4(),
        well_id: req.well_id,
        mwd_tool_family: req.mwd_tool_family,
        grid: req.grid,
        datums: req.datums,
        formation: req.formation,
        mag_field: req.mag_field,
        tool_cal: req.tool_cal,
        // New epochs start unverified; the verifier scores them per ingest.
        quality_tags: vec!["UNVERIFIED".to_string()],
        provenance: req.provenance,
        active_from: Utc::now(),
    };

    match state.store.put_context(&ctx) {
        Ok(id) => envelope::ok(serde_json::json!({"id": id})),
        Err(e) => e.into_response(),
    }
}

/// GET /surveys/contexts/:well_id/active — the most recent context epoch.
pub async fn active_context(
    State(state): State<ApiState>,
    Path(well_id): Path<String>,
) -> Response {
    match state.store.active_context(&well_id) {
        Ok(Some(ctx)) => envelope::ok(ctx),
        Ok(None) => {
            SurveyError::NotFound(format!("no context for well {well_id}")).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /surveys/inputs — ingest one station and compute its solution.
pub async fn post_input(State(state): State<ApiState>, Json(req): Json<InputRequest>) -> Response {
    let request = IngestRequest {
        well_id: req.well_id,
        md_m: req.md_m,
        inc_deg: req.inc_deg,
        azi_deg: req.azi_deg,
        sensors: req.sensors,
        toolface_deg: req.toolface_deg,
        run_id: req.run_id,
        source: req.source,
    };
    match state.pipeline.ingest(request).await {
        Ok(outcome) => envelope::ok(outcome),
        Err(e) => e.into_response(),
    }
}

/// POST /surveys/inputs/csv — batch ingest a delimited-text upload.
pub async fn post_inputs_csv(
    State(state): State<ApiState>,
    Json(req): Json<CsvUploadRequest>,
) -> Response {
    match state.pipeline.ingest_csv(&req.well_id, &req.csv).await {
        Ok(outcome) => envelope::ok(outcome),
        Err(e) => e.into_response(),
    }
}

/// GET /surveys/solutions?well_id= — all solutions, ascending by depth.
pub async fn list_solutions(
    State(state): State<ApiState>,
    Query(query): Query<SolutionsQuery>,
) -> Response {
    match state.store.solutions(&query.well_id) {
        Ok(rows) => envelope::ok(rows),
        Err(e) => e.into_response(),
    }
}

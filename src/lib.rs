//! Borealis Survey: Directional-Drilling Survey Service
//!
//! Ingests survey stations (measured depth + inclination/azimuth), attaches
//! each to a versioned calibration context, computes the well trajectory
//! with the minimum-curvature method, and tags every solution with
//! quality-control flags.
//!
//! ## Architecture
//!
//! - **Trajectory Engine**: Pure minimum-curvature stepping between stations
//! - **Verifier**: Pure context quality checks (flags + coarse score)
//! - **Storage**: Append-only sled trees for contexts, inputs, solutions
//! - **Pipeline**: Ingestion orchestration with per-well serialization
//! - **API**: Axum HTTP surface with a uniform response envelope

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod trajectory;
pub mod types;
pub mod verifier;

// Re-export service configuration
pub use config::SurveyConfig;

// Re-export commonly used types
pub use types::{
    GridConfig, InputSource, MagField, Quality, QualityFlag, SensorReadings, SurveyContext,
    SurveyInput, SurveySolution,
};

// Re-export the pipeline and storage entry points
pub use error::SurveyError;
pub use pipeline::{BatchOutcome, IngestOutcome, IngestRequest, SurveyPipeline};
pub use storage::SurveyStore;

// Re-export pure computation
pub use trajectory::{compute_step, Position, Station, TrajectoryStep};
pub use verifier::verify;

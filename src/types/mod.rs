//! Domain types for the survey pipeline.

mod context;
mod survey;

pub use context::{GridConfig, MagField, SurveyContext};
pub use survey::{InputSource, Quality, QualityFlag, SensorReadings, SurveyInput, SurveySolution};

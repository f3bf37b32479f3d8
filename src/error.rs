//! Service error types.
//!
//! Missing calibration data is never an error here — the verifier models it
//! as quality flags. Only structurally invalid input, missing records, and
//! storage faults surface as [`SurveyError`].

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::envelope;

/// Errors surfaced by the survey core.
#[derive(Debug, Error)]
pub enum SurveyError {
    /// Malformed or under-specified input (missing both sensors and angles,
    /// unparsable values). No partial state results for a single-input call.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reference to a well/context/input/solution that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        match self {
            SurveyError::Validation(msg) => envelope::bad_request(msg),
            SurveyError::NotFound(msg) => envelope::not_found(msg),
            SurveyError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                envelope::internal("storage failure")
            }
            SurveyError::Serialization(e) => {
                tracing::error!(error = %e, "serialization failure");
                envelope::internal("serialization failure")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404_envelope() {
        let resp = SurveyError::NotFound("no context for well W1".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let v = body_json(resp).await;
        assert_eq!(v["error"]["code"], "NOT_FOUND");
        assert_eq!(v["error"]["message"], "no context for well W1");
    }

    #[tokio::test]
    async fn test_validation_maps_to_400_internal_faults_to_500() {
        let resp = SurveyError::Validation("invalid well_id".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp =
            SurveyError::Storage(sled::Error::Unsupported("tree gone".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert_eq!(v["error"]["code"], "INTERNAL_ERROR");
        // Internal detail stays out of the response body
        assert_eq!(v["error"]["message"], "storage failure");
    }
}

//! Survey API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Build the survey API router.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Contexts
        .route("/surveys/contexts", post(handlers::put_context))
        .route(
            "/surveys/contexts/:well_id/active",
            get(handlers::active_context),
        )
        // Inputs
        .route("/surveys/inputs", post(handlers::post_input))
        .route("/surveys/inputs/csv", post(handlers::post_inputs_csv))
        // Solutions
        .route("/surveys/solutions", get(handlers::list_solutions))
        .with_state(state)
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::optimization::handlers as optimization;
use crate::scoring::handlers as scoring;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring API (pure)
        .route("/api/v1/ats/score", post(scoring::handle_score))
        .route("/api/v1/ats/estimate", post(scoring::handle_estimate))
        // Optimization API (LLM-backed)
        .route("/api/v1/ats/analyze", post(optimization::handle_analyze))
        .route("/api/v1/ats/optimize", post(optimization::handle_optimize))
        .route("/api/v1/ats/run", post(optimization::handle_run))
        .with_state(state)
}

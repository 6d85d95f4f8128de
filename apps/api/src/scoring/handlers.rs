//! Axum route handlers for the Scoring API.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::analysis::AtsAnalysis;
use crate::models::section::Section;
use crate::scoring::engine::{score_breakdown, ScoreBreakdown};
use crate::scoring::estimator::{estimate, projected_score};
use crate::validation::{validate_document, validate_score};

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: u32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub analysis: AtsAnalysis,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub estimated_improvement: u32,
    pub projected_score: u32,
}

/// POST /api/v1/ats/score
///
/// Heuristic ATS score with a per-factor breakdown. Empty input is valid.
pub async fn handle_score(
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    validate_document(&request.sections, &request.job_description)?;

    let breakdown = score_breakdown(&request.sections, &request.job_description);

    Ok(Json(ScoreResponse {
        score: breakdown.total,
        breakdown,
    }))
}

/// POST /api/v1/ats/estimate
///
/// Advisory gain for an existing analysis. No LLM call.
pub async fn handle_estimate(
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    validate_score(request.analysis.current_score)?;

    Ok(Json(EstimateResponse {
        estimated_improvement: estimate(&request.analysis),
        projected_score: projected_score(&request.analysis),
    }))
}

//! Axum route handlers for the Optimization API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{AtsAnalysis, ContentRewrite, OptimizationResult};
use crate::models::section::Section;
use crate::optimization::analyzer::analyze_issues;
use crate::optimization::optimizer::optimize_content;
use crate::optimization::orchestrator::{run_optimization, PipelineStage};
use crate::scoring::engine;
use crate::scoring::estimator::{estimate, projected_score};
use crate::state::AppState;
use crate::validation::{validate_for_analysis, validate_for_optimization};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Shared body of analyze and run. `current_score` is computed when omitted.
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub sections: Vec<Section>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub current_score: Option<u32>,
}

impl DocumentRequest {
    fn resolved_score(&self) -> u32 {
        self.current_score
            .unwrap_or_else(|| engine::score(&self.sections, &self.job_description))
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: AtsAnalysis,
    /// Advisory only. The real after-score comes from a run.
    pub estimated_improvement: u32,
    pub projected_score: u32,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub sections: Vec<Section>,
    #[serde(default)]
    pub job_description: String,
    pub analysis: AtsAnalysis,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    /// Always `complete`; failed runs surface as errors.
    pub stage: PipelineStage,
    pub result: OptimizationResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ats/analyze
///
/// Structured critique plus an advisory estimate of what a rewrite could gain.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_for_analysis(
        &request.sections,
        &request.job_description,
        request.current_score,
    )?;

    let current_score = request.resolved_score();
    let analysis = analyze_issues(
        state.generator.as_ref(),
        &request.sections,
        &request.job_description,
        current_score,
    )
    .await?;

    Ok(Json(AnalyzeResponse {
        estimated_improvement: estimate(&analysis),
        projected_score: projected_score(&analysis),
        analysis,
    }))
}

/// POST /api/v1/ats/optimize
///
/// Rewrites eligible sections using a previously obtained analysis. No rescore.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<ContentRewrite>, AppError> {
    validate_for_optimization(
        &request.sections,
        &request.job_description,
        Some(request.analysis.current_score),
    )?;

    let rewrite = optimize_content(
        state.generator.as_ref(),
        &request.sections,
        &request.job_description,
        &request.analysis,
    )
    .await?;

    Ok(Json(rewrite))
}

/// POST /api/v1/ats/run
///
/// Full pipeline: analyze → optimize → rescore. Returns before/after scores.
/// Persisting `optimized_sections` is the caller's job.
pub async fn handle_run(
    State(state): State<AppState>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<RunResponse>, AppError> {
    validate_for_optimization(
        &request.sections,
        &request.job_description,
        request.current_score,
    )?;

    let current_score = request.resolved_score();
    let (run, result) = run_optimization(
        state.generator.as_ref(),
        &request.sections,
        &request.job_description,
        current_score,
    )
    .await?;

    Ok(Json(RunResponse {
        run_id: run.run_id,
        stage: run.stage(),
        result,
    }))
}

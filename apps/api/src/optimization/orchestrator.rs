//! Optimization Orchestrator — runs Analyze → Optimize → Rescore for one request.
//!
//! Flow: analyze_issues → optimize_content → score_engine::score(optimized).
//!
//! `before_score` is the caller's score; `after_score` is always a fresh rescore
//! of the optimized sections, even when it comes out lower. A failed run is
//! terminal: callers start a new run from `Idle`.

use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::analysis::OptimizationResult;
use crate::models::section::Section;
use crate::optimization::analyzer::analyze_issues;
use crate::optimization::optimizer::optimize_content;
use crate::scoring::engine;

// ────────────────────────────────────────────────────────────────────────────
// Run state machine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Analyzing,
    AnalysisReady,
    Optimizing,
    Complete,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Failed)
    }

    /// Legal transitions. Terminal stages have none.
    pub fn can_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (self, next),
            (Idle, Analyzing)
                | (Analyzing, AnalysisReady)
                | (Analyzing, Failed)
                | (AnalysisReady, Optimizing)
                | (Optimizing, Complete)
                | (Optimizing, Failed)
        )
    }
}

/// Tracks one request through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    stage: PipelineStage,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stage: PipelineStage::Idle,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn advance(&mut self, next: PipelineStage) -> Result<(), AppError> {
        if self.stage.is_terminal() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Run {} already finished as {:?}; start a new run",
                self.run_id,
                self.stage
            )));
        }
        if !self.stage.can_advance_to(next) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Illegal pipeline transition {:?} -> {:?} (run {})",
                self.stage,
                next,
                self.run_id
            )));
        }
        info!("Run {}: {:?} -> {:?}", self.run_id, self.stage, next);
        self.stage = next;
        Ok(())
    }

    fn fail(&mut self) {
        if self.stage.can_advance_to(PipelineStage::Failed) {
            self.stage = PipelineStage::Failed;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full pipeline on a fresh `PipelineRun` and hands the finished run back.
pub async fn run_optimization(
    generator: &dyn TextGenerator,
    sections: &[Section],
    job_description: &str,
    current_score: u32,
) -> Result<(PipelineRun, OptimizationResult), AppError> {
    let mut run = PipelineRun::new();
    let span = info_span!("optimization_run", run_id = %run.run_id);
    let result = execute(&mut run, generator, sections, job_description, current_score)
        .instrument(span)
        .await?;
    Ok((run, result))
}

/// Drives `run` from `Idle` to `Complete`, or to `Failed` on the first error.
pub async fn execute(
    run: &mut PipelineRun,
    generator: &dyn TextGenerator,
    sections: &[Section],
    job_description: &str,
    current_score: u32,
) -> Result<OptimizationResult, AppError> {
    run.advance(PipelineStage::Analyzing)?;
    let analysis = match analyze_issues(generator, sections, job_description, current_score).await
    {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Run {} failed during analysis: {e}", run.run_id);
            run.fail();
            return Err(e);
        }
    };
    run.advance(PipelineStage::AnalysisReady)?;

    run.advance(PipelineStage::Optimizing)?;
    let rewrite = match optimize_content(generator, sections, job_description, &analysis).await {
        Ok(rewrite) => rewrite,
        Err(e) => {
            error!("Run {} failed during optimization: {e}", run.run_id);
            run.fail();
            return Err(match e {
                AppError::Generation(failure) => AppError::Optimization(failure),
                other => other,
            });
        }
    };

    let after_score = engine::score(&rewrite.optimized_sections, job_description);
    if after_score < current_score {
        warn!(
            "Run {}: score regressed {} -> {}",
            run.run_id, current_score, after_score
        );
    }
    run.advance(PipelineStage::Complete)?;

    info!(
        "Run {} complete: {} -> {} ({} improvements)",
        run.run_id,
        current_score,
        after_score,
        rewrite.improvements.len()
    );

    Ok(OptimizationResult {
        optimized_sections: rewrite.optimized_sections,
        improvements: rewrite.improvements,
        before_score: current_score,
        after_score,
        changes_summary: rewrite.changes_summary,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

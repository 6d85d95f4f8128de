//! Improvement Estimator — advisory score delta shown before the costly rewrite step.
//!
//! Never a substitute for a real rescore: the orchestrator always recomputes.

use crate::models::analysis::{AtsAnalysis, Severity};

const HIGH_WEIGHT: u32 = 12;
const MEDIUM_WEIGHT: u32 = 6;
const LOW_WEIGHT: u32 = 3;
const MISSING_KEYWORD_WEIGHT: u32 = 2;
const MAX_SCORE: u32 = 100;

/// Estimated points a rewrite could gain, capped so `current_score + delta <= 100`.
pub fn estimate(analysis: &AtsAnalysis) -> u32 {
    let weighted = |count: usize, weight: u32| (count as u32).saturating_mul(weight);

    let raw = weighted(analysis.count_severity(Severity::High), HIGH_WEIGHT)
        .saturating_add(weighted(analysis.count_severity(Severity::Medium), MEDIUM_WEIGHT))
        .saturating_add(weighted(analysis.count_severity(Severity::Low), LOW_WEIGHT))
        .saturating_add(weighted(analysis.missing_keywords.len(), MISSING_KEYWORD_WEIGHT));

    raw.min(MAX_SCORE.saturating_sub(analysis.current_score))
}

/// Score the user would see if the estimate held.
pub fn projected_score(analysis: &AtsAnalysis) -> u32 {
    analysis.current_score.min(MAX_SCORE) + estimate(analysis)
}

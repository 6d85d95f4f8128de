//! Score Engine — heuristic ATS compatibility score for a document vs a job description.
//!
//! Pure, deterministic, and total: every input shape yields a score in 0..=100.
//!
//! Five independent factors, summed then rounded and clamped:
//! 1. keyword match       0–40
//! 2. section completeness 0–20
//! 3. content length band  0–15
//! 4. action-verb density  0–15
//! 5. formatting signal    0–10
//!
//! Matching is raw substring containment on purpose: "led" also matches inside
//! "skilled". Tightening it changes every stored score, so it stays permissive.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::section::{flatten_sections, Section};

const KEYWORD_MAX: f64 = 40.0;
/// Awarded when the job description yields no usable keywords.
const KEYWORD_FALLBACK: f64 = 20.0;
const MIN_KEYWORD_LEN: usize = 4;

const STOPWORDS: &[&str] = &["this", "that", "with", "from", "have", "will", "your", "their"];

const ACTION_VERBS: &[&str] = &[
    "achieved",
    "managed",
    "led",
    "developed",
    "created",
    "improved",
    "increased",
    "decreased",
    "delivered",
    "implemented",
    "designed",
    "coordinated",
    "executed",
    "optimized",
    "streamlined",
    "launched",
];
const ACTION_VERB_POINTS: u32 = 2;
const ACTION_VERB_MAX: u32 = 15;

const BULLET_MARKERS: &[char] = &['•', '◦', '▪', '▸', '●', '■', '‣'];
const FORMATTING_POINTS: f64 = 10.0;

/// (section type, points), awarded once per type when non-empty content exists.
const COMPLETENESS_POINTS: &[(&str, f64)] = &[("experience", 8.0), ("skills", 6.0), ("summary", 6.0)];

// ────────────────────────────────────────────────────────────────────────────
// Output model
// ────────────────────────────────────────────────────────────────────────────

/// Per-factor view of a score, returned alongside the total by the score endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: u32,
    pub keyword_points: f64,
    pub completeness_points: f64,
    pub length_points: f64,
    pub action_verb_points: f64,
    pub formatting_points: f64,
    pub keyword_count: usize,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub action_verb_count: usize,
    pub content_length: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────────────────

/// Computes the 0–100 compatibility score.
pub fn score(sections: &[Section], job_description: &str) -> u32 {
    score_breakdown(sections, job_description).total
}

/// Computes every factor and the clamped total.
pub fn score_breakdown(sections: &[Section], job_description: &str) -> ScoreBreakdown {
    let text = flatten_sections(sections);
    let keywords = extract_keywords(job_description);

    let (matched_keywords, missing_keywords): (Vec<String>, Vec<String>) =
        keywords.into_iter().partition(|k| text.contains(k.as_str()));
    let keyword_count = matched_keywords.len() + missing_keywords.len();
    let keyword_points = keyword_factor(matched_keywords.len(), keyword_count);

    let completeness_points = completeness_factor(sections);

    let content_length = text.chars().count();
    let length_points = length_factor(content_length);

    let action_verb_count = count_action_verbs(&text);
    let action_verb_points = (action_verb_count as u32)
        .saturating_mul(ACTION_VERB_POINTS)
        .min(ACTION_VERB_MAX) as f64;

    let formatting_points = if sections.iter().any(|s| has_bullet_formatting(&s.content.flatten()))
    {
        FORMATTING_POINTS
    } else {
        0.0
    };

    let sum = keyword_points + completeness_points + length_points + action_verb_points
        + formatting_points;
    let total = sum.round().clamp(0.0, 100.0) as u32;

    ScoreBreakdown {
        total,
        keyword_points,
        completeness_points,
        length_points,
        action_verb_points,
        formatting_points,
        keyword_count,
        matched_keywords,
        missing_keywords,
        action_verb_count,
        content_length,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Factors
// ────────────────────────────────────────────────────────────────────────────

/// Unique, lowercased, stopword-filtered tokens longer than three characters.
/// Sorted so breakdowns are stable across calls.
pub fn extract_keywords(job_description: &str) -> BTreeSet<String> {
    job_description
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|t| !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

fn keyword_factor(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return KEYWORD_FALLBACK;
    }
    (matched as f64 / total as f64) * KEYWORD_MAX
}

fn completeness_factor(sections: &[Section]) -> f64 {
    COMPLETENESS_POINTS
        .iter()
        .filter(|(section_type, _)| {
            sections
                .iter()
                .any(|s| s.section_type == *section_type && !s.content.is_empty())
        })
        .map(|(_, points)| points)
        .sum()
}

/// Not too thin, not excessively long.
fn length_factor(length: usize) -> f64 {
    if length > 1000 && length < 5000 {
        15.0
    } else if length > 500 {
        10.0
    } else {
        5.0
    }
}

fn count_action_verbs(text: &str) -> usize {
    ACTION_VERBS.iter().map(|verb| text.matches(verb).count()).sum()
}

fn has_bullet_formatting(content: &str) -> bool {
    content.contains(BULLET_MARKERS)
        || content.lines().any(|line| line.trim_start().starts_with('-'))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

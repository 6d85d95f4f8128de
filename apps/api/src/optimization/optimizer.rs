//! Content Optimizer — rewrites the summary, experience, and skills sections via the LLM.
//!
//! INVARIANT: the returned list holds exactly the input sections, in input order.
//! Non-editable sections are cloned from the input, never round-tripped through
//! the model. Editable sections take the model's content only when it passes the
//! fact guard; otherwise they keep their original content.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::{AppError, GenerationFailure, GenerationStage};
use crate::llm_client::prompts::{json_only_system, FACT_PRESERVATION_INSTRUCTION};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::analysis::{AtsAnalysis, ContentRewrite};
use crate::models::section::{Section, SectionContent};
use crate::optimization::prompts::{
    EMPTY_JOB_DESCRIPTION, OPTIMIZATION_PROMPT_TEMPLATE, OPTIMIZATION_SYSTEM,
};

/// Fields of structured entries that carry facts: copied back from the original
/// after every rewrite.
const PROTECTED_FIELDS: &[&str] = &[
    "title",
    "position",
    "role",
    "company",
    "employer",
    "organization",
    "location",
    "start_date",
    "end_date",
    "startDate",
    "endDate",
    "date",
    "dates",
    "degree",
    "institution",
    "school",
];

// ────────────────────────────────────────────────────────────────────────────
// Response models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawRewrite {
    #[serde(default, alias = "optimizedSections", alias = "sections")]
    optimized_sections: Option<Vec<Value>>,
    #[serde(default)]
    improvements: Option<Vec<Value>>,
    #[serde(default, alias = "changesSummary")]
    changes_summary: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RewrittenSection {
    #[serde(rename = "type")]
    section_type: String,
    #[serde(default)]
    order: Option<i32>,
    content: SectionContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Optimizer
// ────────────────────────────────────────────────────────────────────────────

/// Rewrites the editable sections of `sections` guided by `analysis`.
/// The returned rewrite carries no scores; the orchestrator rescores.
pub async fn optimize_content(
    generator: &dyn TextGenerator,
    sections: &[Section],
    job_description: &str,
    analysis: &AtsAnalysis,
) -> Result<ContentRewrite, AppError> {
    let prompt = build_optimization_prompt(sections, job_description, analysis)?;

    let response = generator
        .generate_json(&prompt, &json_only_system(OPTIMIZATION_SYSTEM))
        .await
        .map_err(|e| GenerationFailure::new(GenerationStage::Optimize, e))?;

    let raw = parse_rewrite(response)
        .map_err(|e| GenerationFailure::new(GenerationStage::Optimize, e))?;

    let rewrites: Vec<RewrittenSection> = raw
        .optimized_sections
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(section) => Some(section),
            Err(e) => {
                warn!("Dropping malformed rewritten section: {e}");
                None
            }
        })
        .collect();

    let (optimized_sections, rewritten_count) = merge_rewrites(sections, rewrites);
    let editable_count = sections.iter().filter(|s| s.is_editable()).count();

    let improvements = raw
        .improvements
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect();

    let changes_summary = raw
        .changes_summary
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!("Rewrote {rewritten_count} of {editable_count} eligible sections.")
        });

    info!(
        "Optimization ready: {}/{} eligible sections rewritten",
        rewritten_count, editable_count
    );

    Ok(ContentRewrite {
        optimized_sections,
        improvements,
        changes_summary,
    })
}

fn parse_rewrite(response: Value) -> Result<RawRewrite, LlmError> {
    if !response.is_object() {
        return Err(LlmError::UnexpectedShape(
            "rewrite must be a JSON object".to_string(),
        ));
    }
    Ok(serde_json::from_value(response)?)
}

/// Builds the rewrite prompt. Only editable sections are shown to the model.
fn build_optimization_prompt(
    sections: &[Section],
    job_description: &str,
    analysis: &AtsAnalysis,
) -> Result<String, AppError> {
    let editable: Vec<&Section> = sections.iter().filter(|s| s.is_editable()).collect();

    let sections_json = serde_json::to_string_pretty(&editable)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize sections: {e}")))?;
    let issues_json = serde_json::to_string_pretty(&analysis.issues)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize issues: {e}")))?;
    let missing_keywords_json = serde_json::to_string(&analysis.missing_keywords)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize keywords: {e}")))?;

    let job_description = if job_description.trim().is_empty() {
        EMPTY_JOB_DESCRIPTION
    } else {
        job_description
    };

    Ok(OPTIMIZATION_PROMPT_TEMPLATE
        .replace("{fact_instruction}", FACT_PRESERVATION_INSTRUCTION)
        .replace("{issues_json}", &issues_json)
        .replace("{missing_keywords_json}", &missing_keywords_json)
        .replace("{sections_json}", &sections_json)
        .replace("{job_description}", job_description))
}

// ────────────────────────────────────────────────────────────────────────────
// Merge + fact guard
// ────────────────────────────────────────────────────────────────────────────

/// Lays rewrites over the original sections. Returns the new list and the number
/// of sections whose content was replaced.
fn merge_rewrites(original: &[Section], rewrites: Vec<RewrittenSection>) -> (Vec<Section>, usize) {
    let mut pending: Vec<Option<RewrittenSection>> = rewrites.into_iter().map(Some).collect();
    let mut rewritten_count = 0;

    let merged: Vec<Section> = original
        .iter()
        .map(|section| {
            if !section.is_editable() {
                return section.clone();
            }

            let Some(rewrite) = take_rewrite(&mut pending, section) else {
                warn!(
                    "No rewrite returned for {} section (order {}), keeping original",
                    section.section_type, section.order
                );
                return section.clone();
            };

            match guard_facts(&section.content, rewrite.content) {
                Ok(content) => {
                    rewritten_count += 1;
                    Section {
                        content,
                        ..section.clone()
                    }
                }
                Err(reason) => {
                    warn!(
                        "Rejected rewrite of {} section (order {}, {} content): {}",
                        section.section_type,
                        section.order,
                        section.content.kind(),
                        reason
                    );
                    section.clone()
                }
            }
        })
        .collect();

    let unused = pending.iter().flatten().count();
    if unused > 0 {
        warn!("Discarded {unused} rewritten sections with no matching input section");
    }

    (merged, rewritten_count)
}

/// Picks the rewrite for `section`: same type and order first, then the next
/// unused rewrite of the same type.
fn take_rewrite(
    pending: &mut [Option<RewrittenSection>],
    section: &Section,
) -> Option<RewrittenSection> {
    let same_type = |r: &RewrittenSection| r.section_type == section.section_type;

    let index = pending
        .iter()
        .position(|slot| {
            slot.as_ref()
                .is_some_and(|r| same_type(r) && r.order == Some(section.order))
        })
        .or_else(|| {
            pending
                .iter()
                .position(|slot| slot.as_ref().is_some_and(same_type))
        })?;

    pending[index].take()
}

/// Accepts `rewritten` only if it keeps the original's shape, then restores
/// protected fields of structured entries.
fn guard_facts(
    original: &SectionContent,
    rewritten: SectionContent,
) -> Result<SectionContent, &'static str> {
    if rewritten.is_empty() && !original.is_empty() {
        return Err("rewritten content is empty");
    }

    match (original, rewritten) {
        (SectionContent::Text(_), rewritten @ SectionContent::Text(_)) => Ok(rewritten),
        (SectionContent::List(before), SectionContent::List(mut after)) => {
            let structured = before.iter().any(Value::is_object);
            if structured {
                if before.len() != after.len() {
                    return Err("number of entries changed");
                }
                for (old, new) in before.iter().zip(after.iter_mut()) {
                    restore_entry(old, new)?;
                }
            }
            Ok(SectionContent::List(after))
        }
        (SectionContent::Map(before), SectionContent::Map(mut after)) => {
            restore_protected_fields(before, &mut after);
            Ok(SectionContent::Map(after))
        }
        _ => Err("content shape changed"),
    }
}

fn restore_entry(old: &Value, new: &mut Value) -> Result<(), &'static str> {
    match (old, new) {
        (Value::Object(before), Value::Object(after)) => {
            restore_protected_fields(before, after);
            Ok(())
        }
        (Value::Object(_), _) => Err("structured entry replaced by a different shape"),
        _ => Ok(()),
    }
}

fn restore_protected_fields(before: &Map<String, Value>, after: &mut Map<String, Value>) {
    for &field in PROTECTED_FIELDS {
        if let Some(value) = before.get(field) {
            after.insert(field.to_string(), value.clone());
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

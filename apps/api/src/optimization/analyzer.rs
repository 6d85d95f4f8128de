//! Issue Analyzer — structured ATS critique of a document via the LLM.
//!
//! Lenient on partial output: a missing or mistyped list defaults to empty and
//! malformed issues are dropped. Strict on total failure: no JSON object means
//! no analysis.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{AppError, GenerationFailure, GenerationStage};
use crate::llm_client::prompts::json_only_system;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::analysis::{AtsAnalysis, Issue};
use crate::models::section::Section;
use crate::optimization::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, EMPTY_JOB_DESCRIPTION,
};

/// Response shape as the model may return it. Every field is optional and
/// untyped until `list_field` checks it is an array.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    issues: Option<Value>,
    #[serde(default)]
    recommendations: Option<Value>,
    #[serde(default, alias = "missingKeywords")]
    missing_keywords: Option<Value>,
    #[serde(default, alias = "structureIssues")]
    structure_issues: Option<Value>,
}

/// Asks the LLM for a critique of `sections` against `job_description`.
///
/// `current_score` is echoed into the result as given; the model's own opinion
/// of the score is ignored.
pub async fn analyze_issues(
    generator: &dyn TextGenerator,
    sections: &[Section],
    job_description: &str,
    current_score: u32,
) -> Result<AtsAnalysis, AppError> {
    let prompt = build_analysis_prompt(sections, job_description, current_score)?;

    let response = generator
        .generate_json(&prompt, &json_only_system(ANALYSIS_SYSTEM))
        .await
        .map_err(|e| GenerationFailure::new(GenerationStage::Analyze, e))?;

    let analysis = parse_analysis(response, current_score)
        .map_err(|e| GenerationFailure::new(GenerationStage::Analyze, e))?;

    info!(
        "Analysis ready: {} issues, {} missing keywords",
        analysis.issues.len(),
        analysis.missing_keywords.len()
    );

    Ok(analysis)
}

fn build_analysis_prompt(
    sections: &[Section],
    job_description: &str,
    current_score: u32,
) -> Result<String, AppError> {
    let sections_json = serde_json::to_string_pretty(sections)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize sections: {e}")))?;

    let job_description = if job_description.trim().is_empty() {
        EMPTY_JOB_DESCRIPTION
    } else {
        job_description
    };

    Ok(ANALYSIS_PROMPT_TEMPLATE
        .replace("{current_score}", &current_score.to_string())
        .replace("{sections_json}", &sections_json)
        .replace("{job_description}", job_description))
}

fn parse_analysis(response: Value, current_score: u32) -> Result<AtsAnalysis, LlmError> {
    if !response.is_object() {
        return Err(LlmError::UnexpectedShape(
            "analysis must be a JSON object".to_string(),
        ));
    }

    let raw: RawAnalysis = serde_json::from_value(response)?;

    let issues = list_field("issues", raw.issues)
        .into_iter()
        .filter_map(parse_issue)
        .collect();

    Ok(AtsAnalysis {
        current_score,
        issues,
        recommendations: string_list(list_field("recommendations", raw.recommendations)),
        missing_keywords: string_list(list_field("missing_keywords", raw.missing_keywords)),
        structure_issues: string_list(list_field("structure_issues", raw.structure_issues)),
    })
}

/// Items of an array field. Absent, null, or non-array values count as empty.
fn list_field(name: &str, value: Option<Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!("Ignoring analysis field `{name}`: expected an array, got {other}");
            Vec::new()
        }
    }
}

/// Parses one issue, normalizing the case of its enum fields.
/// Issues outside the fixed category/severity sets are dropped.
fn parse_issue(value: Value) -> Option<Issue> {
    let value = match value {
        Value::Object(mut map) => {
            for key in ["category", "severity"] {
                if let Some(Value::String(s)) = map.get_mut(key) {
                    *s = s.trim().to_lowercase();
                }
            }
            Value::Object(map)
        }
        other => other,
    };

    match serde_json::from_value::<Issue>(value) {
        Ok(issue) => Some(issue),
        Err(e) => {
            warn!("Dropping malformed issue from analysis: {e}");
            None
        }
    }
}

fn string_list(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubGenerator;
    use crate::models::analysis::{IssueCategory, Severity};
    use crate::models::section::SectionContent;
    use serde_json::json;

    fn sections() -> Vec<Section> {
        vec![Section {
            section_type: "experience".to_string(),
            title: "Experience".to_string(),
            content: SectionContent::Text("Built payment APIs in Go".to_string()),
            order: 0,
        }]
    }

    #[tokio::test]
    async fn test_analyze_parses_full_response() {
        let stub = StubGenerator::new(vec![Ok(json!({
            "issues": [
                {"category": "keywords", "severity": "high", "description": "No Rust", "impact": "Filtered out"}
            ],
            "recommendations": ["Mention Rust"],
            "missing_keywords": ["rust"],
            "structure_issues": ["No summary"]
        }))]);

        let analysis = analyze_issues(&stub, &sections(), "Rust engineer", 41)
            .await
            .unwrap();

        assert_eq!(analysis.current_score, 41);
        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].category, IssueCategory::Keywords);
        assert_eq!(analysis.issues[0].severity, Severity::High);
        assert_eq!(analysis.missing_keywords, vec!["rust".to_string()]);
        assert_eq!(analysis.structure_issues, vec!["No summary".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_sends_sections_and_job_description() {
        let stub = StubGenerator::new(vec![Ok(json!({}))]);
        analyze_issues(&stub, &sections(), "Rust engineer at Ferrous", 12)
            .await
            .unwrap();

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, json_only_system(ANALYSIS_SYSTEM));
        assert!(calls[0].prompt.contains("Built payment APIs in Go"));
        assert!(calls[0].prompt.contains("Rust engineer at Ferrous"));
        assert!(calls[0].prompt.contains("12/100"));
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let stub = StubGenerator::new(vec![Ok(json!({"recommendations": null}))]);
        let analysis = analyze_issues(&stub, &sections(), "", 30).await.unwrap();
        assert!(analysis.issues.is_empty());
        assert!(analysis.recommendations.is_empty());
        assert!(analysis.missing_keywords.is_empty());
        assert!(analysis.structure_issues.is_empty());
    }

    #[tokio::test]
    async fn test_camel_case_keys_accepted() {
        let stub = StubGenerator::new(vec![Ok(json!({
            "missingKeywords": ["terraform"],
            "structureIssues": ["Dates missing"]
        }))]);
        let analysis = analyze_issues(&stub, &sections(), "", 30).await.unwrap();
        assert_eq!(analysis.missing_keywords, vec!["terraform".to_string()]);
        assert_eq!(analysis.structure_issues, vec!["Dates missing".to_string()]);
    }

    #[tokio::test]
    async fn test_model_score_is_ignored() {
        let stub = StubGenerator::new(vec![Ok(json!({"current_score": 99}))]);
        let analysis = analyze_issues(&stub, &sections(), "", 30).await.unwrap();
        assert_eq!(analysis.current_score, 30);
    }

    #[test]
    fn test_issue_enum_case_is_normalized() {
        let issue = parse_issue(json!({"category": " Skills", "severity": "LOW"})).unwrap();
        assert_eq!(issue.category, IssueCategory::Skills);
        assert_eq!(issue.severity, Severity::Low);
    }

    #[test]
    fn test_unknown_severity_issue_is_dropped() {
        let analysis = parse_analysis(
            json!({"issues": [
                {"category": "content", "severity": "critical"},
                {"category": "formatting", "severity": "medium"},
                "not an object"
            ]}),
            10,
        )
        .unwrap();
        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].category, IssueCategory::Formatting);
    }

    #[test]
    fn test_non_string_list_items_are_skipped() {
        let analysis =
            parse_analysis(json!({"missing_keywords": ["kafka", 3, null, "  "]}), 10).unwrap();
        assert_eq!(analysis.missing_keywords, vec!["kafka".to_string()]);
    }

    #[tokio::test]
    async fn test_non_object_response_is_generation_failure() {
        let stub = StubGenerator::new(vec![Ok(json!(["not", "an", "object"]))]);
        let err = analyze_issues(&stub, &sections(), "", 30).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationFailure {
                stage: GenerationStage::Analyze,
                source: LlmError::UnexpectedShape(_),
            })
        ));
    }

    #[tokio::test]
    async fn test_mistyped_field_is_dropped_and_rest_kept() {
        let stub = StubGenerator::new(vec![Ok(json!({
            "issues": [
                {"category": "keywords", "severity": "high", "description": "No Rust", "impact": "Filtered out"}
            ],
            "missing_keywords": ["rust"],
            "recommendations": "Add Rust to your summary"
        }))]);

        let analysis = analyze_issues(&stub, &sections(), "Rust engineer", 30)
            .await
            .unwrap();

        assert_eq!(analysis.issues.len(), 1);
        assert_eq!(analysis.issues[0].severity, Severity::High);
        assert_eq!(analysis.missing_keywords, vec!["rust".to_string()]);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_non_array_issues_default_to_empty() {
        let analysis =
            parse_analysis(json!({"issues": "none", "structure_issues": {"a": 1}}), 10).unwrap();
        assert!(analysis.issues.is_empty());
        assert!(analysis.structure_issues.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_generation_failure() {
        let stub = StubGenerator::new(vec![Err(LlmError::Timeout)]);
        let err = analyze_issues(&stub, &sections(), "", 30).await.unwrap_err();
        match err {
            AppError::Generation(failure) => assert!(failure.is_timeout()),
            other => panic!("expected generation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_job_description_uses_placeholder() {
        let prompt = build_analysis_prompt(&sections(), "  ", 0).unwrap();
        assert!(prompt.contains(EMPTY_JOB_DESCRIPTION));
    }
}

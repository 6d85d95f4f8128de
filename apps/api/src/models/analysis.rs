use serde::{Deserialize, Serialize};

use crate::models::section::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Keywords,
    Structure,
    Formatting,
    Content,
    Skills,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// One problem found in a document, as reported by the issue analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
}

/// Structured critique of a document against a job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub current_score: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub structure_issues: Vec<String>,
}

impl AtsAnalysis {
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Output of the content optimizer. Scores are filled in by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRewrite {
    pub optimized_sections: Vec<Section>,
    pub improvements: Vec<String>,
    pub changes_summary: String,
}

/// Before/after report of one full optimization run.
///
/// `after_score` always comes from a fresh rescore of `optimized_sections`
/// and may be lower than `before_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimized_sections: Vec<Section>,
    pub improvements: Vec<String>,
    pub before_score: u32,
    pub after_score: u32,
    pub changes_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_enums_use_lowercase_wire_values() {
        let issue: Issue = serde_json::from_str(
            r#"{"category": "formatting", "severity": "medium", "description": "No bullets", "impact": "Harder to scan"}"#,
        )
        .unwrap();
        assert_eq!(issue.category, IssueCategory::Formatting);
        assert_eq!(issue.severity, Severity::Medium);
    }

    #[test]
    fn test_issue_rejects_unknown_severity() {
        let result: Result<Issue, _> =
            serde_json::from_str(r#"{"category": "content", "severity": "critical"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_analysis_lists_default_to_empty() {
        let analysis: AtsAnalysis = serde_json::from_str(r#"{"current_score": 42}"#).unwrap();
        assert_eq!(analysis.current_score, 42);
        assert!(analysis.issues.is_empty());
        assert!(analysis.missing_keywords.is_empty());
        assert!(analysis.structure_issues.is_empty());
    }

    #[test]
    fn test_count_severity() {
        let issue = |severity| Issue {
            category: IssueCategory::Keywords,
            severity,
            description: String::new(),
            impact: String::new(),
        };
        let analysis = AtsAnalysis {
            current_score: 50,
            issues: vec![issue(Severity::High), issue(Severity::Low), issue(Severity::High)],
            ..Default::default()
        };
        assert_eq!(analysis.count_severity(Severity::High), 2);
        assert_eq!(analysis.count_severity(Severity::Medium), 0);
        assert_eq!(analysis.count_severity(Severity::Low), 1);
    }
}

//! Request validation — rejects malformed input before any scoring or LLM call.
//!
//! The score engine itself tolerates any shape; these limits bound request size
//! and stop generation calls that could not possibly succeed.

use crate::errors::AppError;
use crate::models::section::Section;

pub const MAX_SECTIONS: usize = 100;
pub const MAX_SECTION_TYPE_LEN: usize = 64;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 20_000;
pub const MAX_SCORE: u32 = 100;

/// Size and identifier checks shared by every endpoint. Empty input passes.
pub fn validate_document(sections: &[Section], job_description: &str) -> Result<(), AppError> {
    if sections.len() > MAX_SECTIONS {
        return Err(AppError::Validation(format!(
            "Too many sections: {} (max {MAX_SECTIONS})",
            sections.len()
        )));
    }

    for (index, section) in sections.iter().enumerate() {
        let section_type = section.section_type.trim();
        if section_type.is_empty() {
            return Err(AppError::Validation(format!(
                "Section {index} has an empty type"
            )));
        }
        if section_type.chars().count() > MAX_SECTION_TYPE_LEN {
            return Err(AppError::Validation(format!(
                "Section {index} type exceeds {MAX_SECTION_TYPE_LEN} characters"
            )));
        }
        if section.title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::Validation(format!(
                "Section {index} title exceeds {MAX_TITLE_LEN} characters"
            )));
        }
    }

    let jd_chars = job_description.chars().count();
    if jd_chars > MAX_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "job_description is {jd_chars} characters (max {MAX_JOB_DESCRIPTION_CHARS})"
        )));
    }

    Ok(())
}

/// Checks for requests that reach the issue analyzer.
pub fn validate_for_analysis(
    sections: &[Section],
    job_description: &str,
    current_score: Option<u32>,
) -> Result<(), AppError> {
    validate_document(sections, job_description)?;

    if sections.is_empty() {
        return Err(AppError::Validation(
            "At least one section is required for analysis".to_string(),
        ));
    }

    if let Some(score) = current_score {
        validate_score(score)?;
    }

    Ok(())
}

/// Checks for requests that reach the content optimizer.
pub fn validate_for_optimization(
    sections: &[Section],
    job_description: &str,
    current_score: Option<u32>,
) -> Result<(), AppError> {
    validate_for_analysis(sections, job_description, current_score)?;

    if !sections.iter().any(Section::is_editable) {
        return Err(AppError::Validation(
            "Nothing to optimize: add a summary, experience, or skills section".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_score(score: u32) -> Result<(), AppError> {
    if score > MAX_SCORE {
        return Err(AppError::Validation(format!(
            "current_score must be between 0 and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::section::SectionContent;

    fn section(section_type: &str) -> Section {
        Section {
            section_type: section_type.to_string(),
            title: "Title".to_string(),
            content: SectionContent::Text("content".to_string()),
            order: 0,
        }
    }

    #[test]
    fn test_empty_document_is_valid_for_scoring() {
        assert!(validate_document(&[], "").is_ok());
    }

    #[test]
    fn test_too_many_sections_rejected() {
        let sections: Vec<_> = (0..=MAX_SECTIONS).map(|_| section("custom")).collect();
        let err = validate_document(&sections, "").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Too many sections")));
    }

    #[test]
    fn test_blank_section_type_rejected() {
        assert!(matches!(
            validate_document(&[section("   ")], ""),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_long_section_type_rejected() {
        let long_type = "x".repeat(MAX_SECTION_TYPE_LEN + 1);
        assert!(validate_document(&[section(&long_type)], "").is_err());
    }

    #[test]
    fn test_long_title_rejected() {
        let mut s = section("summary");
        s.title = "t".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_document(&[s], "").is_err());
    }

    #[test]
    fn test_oversized_job_description_rejected() {
        let jd = "a".repeat(MAX_JOB_DESCRIPTION_CHARS + 1);
        assert!(validate_document(&[], &jd).is_err());
        let jd = "a".repeat(MAX_JOB_DESCRIPTION_CHARS);
        assert!(validate_document(&[], &jd).is_ok());
    }

    #[test]
    fn test_analysis_requires_a_section() {
        assert!(validate_for_analysis(&[], "Rust engineer", None).is_err());
        assert!(validate_for_analysis(&[section("publications")], "", None).is_ok());
    }

    #[test]
    fn test_score_above_100_rejected() {
        assert!(validate_for_analysis(&[section("summary")], "", Some(101)).is_err());
        assert!(validate_for_analysis(&[section("summary")], "", Some(100)).is_ok());
    }

    #[test]
    fn test_optimization_requires_editable_section() {
        let only_custom = vec![section("publications"), section("awards")];
        assert!(validate_for_optimization(&only_custom, "jd", None).is_err());

        let with_skills = vec![section("publications"), section("skills")];
        assert!(validate_for_optimization(&with_skills, "jd", None).is_ok());
    }
}

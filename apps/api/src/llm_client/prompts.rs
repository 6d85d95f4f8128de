// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appends the JSON-only fragment to a role prompt.
pub fn json_only_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

/// Instruction appended to every rewrite prompt.
pub const FACT_PRESERVATION_INSTRUCTION: &str = "\
    CRITICAL: Never invent, alter, or remove factual claims. Job titles, employers, \
    dates, degrees, institutions, and locations must stay exactly as written. \
    You may only change phrasing, add quantification already implied by the text, \
    and improve keyword coverage. If a keyword is not supported by the candidate's \
    experience, do NOT add it.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_only_system_keeps_role_first() {
        let system = json_only_system("You are a reviewer.");
        assert!(system.starts_with("You are a reviewer. "));
        assert!(system.ends_with(JSON_ONLY_SYSTEM));
    }
}

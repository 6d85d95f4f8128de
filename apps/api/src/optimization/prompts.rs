// All LLM prompt constants for the Optimization module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Role prompt for issue analysis. Sent through `json_only_system`.
pub const ANALYSIS_SYSTEM: &str = "You are an expert ATS (Applicant Tracking System) auditor \
    and resume reviewer. You critique how well a resume will pass automated screening \
    for a specific job.";

/// Issue analysis prompt template.
/// Replace: {current_score}, {sections_json}, {job_description}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this resume against the job description below.
Its current heuristic ATS score is {current_score}/100.

Return a JSON object with this EXACT schema (no extra fields):
{
  "issues": [
    {
      "category": "keywords",
      "severity": "high",
      "description": "Job requires Kubernetes, which never appears in the resume",
      "impact": "Keyword filters will rank the resume below candidates who list it"
    }
  ],
  "recommendations": ["Mention container orchestration work in the experience section"],
  "missing_keywords": ["kubernetes"],
  "structure_issues": ["No summary section"]
}

Rules:
- "category" MUST be exactly one of: "keywords", "structure", "formatting", "content", "skills"
- "severity" MUST be exactly one of: "high", "medium", "low"
- "missing_keywords" lists lowercase terms from the job description absent from the resume
- Report only issues you can point to in the resume text; do not speculate
- Use empty arrays when there is nothing to report

RESUME SECTIONS (JSON):
{sections_json}

JOB DESCRIPTION:
{job_description}"#;

/// Role prompt for content rewriting. Sent through `json_only_system`.
pub const OPTIMIZATION_SYSTEM: &str = "You are an expert resume writer who tailors existing \
    resume content to a job description without inventing facts. \
    Do NOT invent facts not present in the original sections.";

/// Content rewrite prompt template.
/// Replace: {fact_instruction}, {issues_json}, {missing_keywords_json},
///          {sections_json}, {job_description}
pub const OPTIMIZATION_PROMPT_TEMPLATE: &str = r#"{fact_instruction}

ISSUES FOUND BY THE ATS AUDIT:
{issues_json}

MISSING KEYWORDS (add only where the candidate's experience supports them):
{missing_keywords_json}

SECTIONS TO REWRITE (JSON):
{sections_json}

JOB DESCRIPTION:
{job_description}

Rewrite the sections above to address the issues. Return a JSON object:
{
  "optimized_sections": [
    {
      "type": "experience",
      "order": 1,
      "content": "the rewritten content"
    }
  ],
  "improvements": ["Added quantified outcomes to two experience bullets"],
  "changes_summary": "One or two sentences describing what changed"
}

HARD RULES:
1. Return one entry per section above, with the SAME "type" and "order"
2. Keep each section's content in the SAME shape: text stays text, lists stay lists of the same length, objects keep their keys
3. Never change job titles, employers, dates, degrees, institutions, or locations
4. Start bullet lines with "• " and lead with strong action verbs
5. Incorporate missing keywords naturally — never keyword-stuff
6. Do NOT return sections that were not given to you"#;

/// Substituted when the caller supplies no job description.
pub const EMPTY_JOB_DESCRIPTION: &str =
    "(no job description provided; optimize for general ATS readability)";

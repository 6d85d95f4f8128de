// Optimization pipeline: issue analysis, content rewriting, and the orchestrated
// analyze → optimize → rescore run.
// All LLM calls go through the TextGenerator seam in llm_client.

pub mod analyzer;
pub mod handlers;
pub mod optimizer;
pub mod orchestrator;
pub mod prompts;

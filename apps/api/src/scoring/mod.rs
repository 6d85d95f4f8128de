// ATS scoring: the heuristic score engine and the advisory improvement estimator.
// Pure functions only: no LLM calls, no I/O.

pub mod engine;
pub mod estimator;
pub mod handlers;

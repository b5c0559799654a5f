// Candidate analysis: scored answers → model → normalized analysis, with the
// overall score and percentile always computed locally.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod scoring;

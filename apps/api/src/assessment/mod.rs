// Assessment generation: prompt → model → normalized questions → stored test.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod prompts;

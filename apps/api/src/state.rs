use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Retry-wrapped AI client. The transport behind it is swappable.
    pub llm: LlmClient,
    pub config: Config,
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::assessment::handlers as assessment;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route(
            "/api/v1/tests/generate",
            post(assessment::handle_generate_test),
        )
        .route(
            "/api/v1/tests/:id/questions/generate",
            post(assessment::handle_generate_more_questions),
        )
        // Analysis API
        .route("/api/v1/analysis", post(analysis::handle_analyze))
        .route(
            "/api/v1/analysis/:test_result_id",
            get(analysis::handle_get_analysis),
        )
        .route(
            "/api/v1/feedback/quick",
            post(analysis::handle_quick_feedback),
        )
        .route(
            "/api/v1/learning-path",
            post(analysis::handle_learning_path),
        )
        .with_state(state)
}

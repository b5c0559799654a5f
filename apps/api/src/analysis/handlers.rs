//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::analyzer::{
    analyze_candidate_performance, generate_learning_path, generate_quick_feedback,
};
use crate::analysis::models::{AnalyzeCandidateParams, LearningPath, Weakness};
use crate::analysis::scoring::{
    actual_duration_minutes, build_candidate_answers, total_earned, total_points,
};
use crate::errors::AppError;
use crate::models::assessment::{QuestionRow, TestResultDetailRow};
use crate::state::AppState;

const UNKNOWN_CANDIDATE: &str = "Candidate";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub test_result_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub cached: bool,
    pub analysis: Value,
}

#[derive(Debug, Serialize)]
pub struct CachedAnalysisResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickFeedbackRequest {
    pub question: String,
    pub candidate_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct QuickFeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathRequest {
    #[serde(default)]
    pub weaknesses: Vec<Weakness>,
    pub target_role: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Returns the stored analysis when one exists. Otherwise scores the stored
/// answers, asks the model for an analysis and stores it on the result.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let result = fetch_result(&state, request.test_result_id).await?;

    if let Some(analysis) = stored_analysis(&result) {
        info!("Returning cached analysis for result {}", result.id);
        return Ok(Json(AnalysisResponse {
            success: true,
            cached: true,
            analysis,
        }));
    }

    let questions = sqlx::query_as::<_, QuestionRow>(
        "SELECT * FROM questions WHERE test_id = $1 ORDER BY order_index",
    )
    .bind(result.test_id)
    .fetch_all(&state.db)
    .await?;

    let answers = build_candidate_answers(&questions, &result.answers);
    let params = AnalyzeCandidateParams {
        candidate_name: result
            .candidate_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string()),
        job_title: result.test_title.clone(),
        total_points: total_points(&answers),
        earned_points: total_earned(&answers),
        test_duration: result.duration_minutes.max(0) as u32,
        actual_duration: actual_duration_minutes(result.started_at, result.completed_at, Utc::now()),
        answers,
    };

    let analysis = analyze_candidate_performance(&state.llm, &params).await?;
    let analysis_json = serde_json::to_value(&analysis)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {e}")))?;

    let saved = sqlx::query(
        r#"
        UPDATE test_results
        SET ai_analysis = $1, score = COALESCE(score, $2)
        WHERE id = $3
        "#,
    )
    .bind(&analysis_json)
    .bind(analysis.overall_score.round() as i32)
    .bind(result.id)
    .execute(&state.db)
    .await;

    match saved {
        Ok(_) => info!("Stored analysis for result {}", result.id),
        Err(e) => error!("Failed to store analysis for result {}: {e}", result.id),
    }

    Ok(Json(AnalysisResponse {
        success: true,
        cached: false,
        analysis: analysis_json,
    }))
}

/// GET /api/v1/analysis/:test_result_id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(test_result_id): Path<Uuid>,
) -> Result<Json<CachedAnalysisResponse>, AppError> {
    let result = fetch_result(&state, test_result_id).await?;

    Ok(Json(match stored_analysis(&result) {
        Some(analysis) => CachedAnalysisResponse {
            success: true,
            analysis: Some(analysis),
            message: None,
        },
        None => CachedAnalysisResponse {
            success: false,
            analysis: None,
            message: Some("Analysis not yet generated".to_string()),
        },
    }))
}

/// POST /api/v1/feedback/quick
pub async fn handle_quick_feedback(
    State(state): State<AppState>,
    Json(request): Json<QuickFeedbackRequest>,
) -> Result<Json<QuickFeedbackResponse>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question is required".to_string()));
    }

    let feedback = generate_quick_feedback(
        &state.llm,
        &request.question,
        &request.candidate_answer,
        &request.correct_answer,
        request.is_correct,
    )
    .await?;

    Ok(Json(QuickFeedbackResponse { feedback }))
}

/// POST /api/v1/learning-path
pub async fn handle_learning_path(
    State(state): State<AppState>,
    Json(request): Json<LearningPathRequest>,
) -> Result<Json<LearningPath>, AppError> {
    if request.target_role.trim().is_empty() {
        return Err(AppError::Validation("target_role is required".to_string()));
    }

    let path = generate_learning_path(&state.llm, &request.weaknesses, request.target_role.trim())
        .await?;
    Ok(Json(path))
}

async fn fetch_result(state: &AppState, test_result_id: Uuid) -> Result<TestResultDetailRow, AppError> {
    sqlx::query_as::<_, TestResultDetailRow>(
        r#"
        SELECT r.id, r.test_id, r.answers, r.ai_analysis,
               r.started_at, r.completed_at,
               t.title AS test_title, t.duration_minutes,
               p.full_name AS candidate_name
        FROM test_results r
        JOIN tests t ON t.id = r.test_id
        LEFT JOIN profiles p ON p.id = r.candidate_id
        WHERE r.id = $1
        "#,
    )
    .bind(test_result_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Test result {test_result_id} not found")))
}

/// Stored analysis, if any. JSON `null` or a non-object counts as none.
fn stored_analysis(result: &TestResultDetailRow) -> Option<Value> {
    result.ai_analysis.clone().filter(Value::is_object)
}

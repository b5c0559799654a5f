//! Axum route handlers for the Assessment API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::assessment::generator::{generate_additional_questions, generate_test};
use crate::assessment::models::{
    AdditionalQuestionsParams, GenerateTestParams, TestDifficulty, TestQuestion,
};
use crate::errors::AppError;
use crate::models::assessment::{QuestionRow, TestRow};
use crate::state::AppState;

pub const MAX_QUESTION_COUNT: u32 = 50;
pub const MAX_DURATION_MINUTES: u32 = 600;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

fn default_question_count() -> u32 {
    10
}

fn default_passing_score() -> u32 {
    70
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTestRequest {
    /// HR user creating the test.
    pub created_by: Uuid,
    pub job_title: String,
    pub job_description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub difficulty: TestDifficulty,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub include_code: bool,
    #[serde(default)]
    pub include_essay: bool,
    pub test_title: Option<String>,
    pub test_description: Option<String>,
    /// Minutes; defaults to the generated estimate.
    pub duration: Option<u32>,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
}

impl GenerateTestRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_title.trim().is_empty()
            || self.job_description.trim().is_empty()
            || self.skills.iter().all(|s| s.trim().is_empty())
        {
            return Err(AppError::Validation(
                "Missing required fields: job_title, job_description, skills".to_string(),
            ));
        }
        validate_question_count(self.question_count)?;
        if self.passing_score > 100 {
            return Err(AppError::Validation(
                "passing_score must be between 0 and 100".to_string(),
            ));
        }
        if let Some(duration) = self.duration {
            if !(1..=MAX_DURATION_MINUTES).contains(&duration) {
                return Err(AppError::Validation(format!(
                    "duration must be between 1 and {MAX_DURATION_MINUTES} minutes"
                )));
            }
        }
        Ok(())
    }

    pub fn to_params(&self) -> GenerateTestParams {
        GenerateTestParams {
            job_title: self.job_title.trim().to_string(),
            job_description: self.job_description.trim().to_string(),
            skills: self
                .skills
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            difficulty: self.difficulty,
            question_count: self.question_count,
            topics: self.topics.clone(),
            include_code: self.include_code,
            include_essay: self.include_essay,
        }
    }
}

fn validate_question_count(count: u32) -> Result<(), AppError> {
    if !(1..=MAX_QUESTION_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "Question count must be between 1 and {MAX_QUESTION_COUNT}"
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TestSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub question_count: usize,
    pub total_points: u32,
    pub estimated_duration: u32,
    pub topic_distribution: BTreeMap<String, u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateTestResponse {
    pub success: bool,
    pub test: TestSummary,
    pub questions: Vec<TestQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct AdditionalQuestionsRequest {
    pub question_count: u32,
    pub job_title: Option<String>,
    pub skills: Option<Vec<String>>,
    pub difficulty: Option<TestDifficulty>,
}

#[derive(Debug, Serialize)]
pub struct AdditionalQuestionsResponse {
    pub test_id: Uuid,
    pub questions: Vec<TestQuestion>,
    pub total_points: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tests/generate
///
/// Generates a test with the model and stores it unpublished, together with its
/// questions, in one transaction.
pub async fn handle_generate_test(
    State(state): State<AppState>,
    Json(request): Json<GenerateTestRequest>,
) -> Result<Json<GenerateTestResponse>, AppError> {
    request.validate()?;

    let params = request.to_params();
    let generated = generate_test(&state.llm, &params).await?;

    let title = request
        .test_title
        .clone()
        .unwrap_or_else(|| format!("{} Assessment", params.job_title));
    let description = request
        .test_description
        .clone()
        .unwrap_or_else(|| format!("AI-generated assessment for {} position", params.job_title));
    let duration = request
        .duration
        .unwrap_or(generated.metadata.estimated_duration_minutes);

    let mut tx = state.db.begin().await?;

    let test: TestRow = sqlx::query_as(
        r#"
        INSERT INTO tests
            (created_by, title, description, duration_minutes, passing_score,
             total_points, ai_generated, is_published)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, FALSE)
        RETURNING *
        "#,
    )
    .bind(request.created_by)
    .bind(&title)
    .bind(&description)
    .bind(db_int(duration, "duration")?)
    .bind(db_int(request.passing_score, "passing_score")?)
    .bind(db_int(generated.metadata.total_points, "total_points")?)
    .fetch_one(&mut *tx)
    .await?;

    insert_questions(&mut tx, test.id, &generated.questions, 0).await?;
    tx.commit().await?;

    info!(
        "Stored test {} with {} questions for user {}",
        test.id,
        generated.questions.len(),
        request.created_by
    );

    Ok(Json(GenerateTestResponse {
        success: true,
        test: TestSummary {
            id: test.id,
            title: test.title,
            description: test.description,
            question_count: generated.questions.len(),
            total_points: generated.metadata.total_points,
            estimated_duration: generated.metadata.estimated_duration_minutes,
            topic_distribution: generated.metadata.topic_distribution,
        },
        questions: generated.questions,
    }))
}

/// POST /api/v1/tests/:id/questions/generate
///
/// Appends model-generated questions to an existing test and refreshes its
/// total points from the stored questions.
pub async fn handle_generate_more_questions(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
    Json(request): Json<AdditionalQuestionsRequest>,
) -> Result<Json<AdditionalQuestionsResponse>, AppError> {
    validate_question_count(request.question_count)?;

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM tests WHERE id = $1")
        .bind(test_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("Test {test_id} not found")));
    }

    let rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT * FROM questions WHERE test_id = $1 ORDER BY order_index",
    )
    .bind(test_id)
    .fetch_all(&state.db)
    .await?;

    let existing: Vec<TestQuestion> = rows.iter().map(QuestionRow::to_test_question).collect();
    let params = AdditionalQuestionsParams {
        job_title: request.job_title,
        skills: request.skills,
        difficulty: request.difficulty,
        question_count: request.question_count,
    };
    let questions = generate_additional_questions(&state.llm, &existing, &params).await?;

    let next_index = rows.last().map(|r| r.order_index + 1).unwrap_or(0);

    let mut tx = state.db.begin().await?;
    insert_questions(&mut tx, test_id, &questions, next_index).await?;
    let total_points: i32 = sqlx::query_scalar(
        r#"
        UPDATE tests
        SET total_points = (SELECT COALESCE(SUM(points), 0)::INTEGER FROM questions WHERE test_id = $1),
            updated_at = NOW()
        WHERE id = $1
        RETURNING total_points
        "#,
    )
    .bind(test_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(
        "Appended {} questions to test {test_id} (total points now {total_points})",
        questions.len()
    );

    Ok(Json(AdditionalQuestionsResponse {
        test_id,
        questions,
        total_points,
    }))
}

async fn insert_questions(
    tx: &mut Transaction<'_, Postgres>,
    test_id: Uuid,
    questions: &[TestQuestion],
    first_index: i32,
) -> Result<(), AppError> {
    for (offset, q) in questions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO questions
                (test_id, question_text, question_type, options, correct_answer,
                 explanation, points, topic, difficulty, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(test_id)
        .bind(&q.question)
        .bind(q.question_type.as_str())
        .bind(serde_json::json!(q.options))
        .bind(q.correct_answer.to_json())
        .bind(&q.explanation)
        .bind(db_int(q.points, "points")?)
        .bind(&q.topic)
        .bind(q.difficulty.as_str())
        .bind(first_index + offset as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Checked conversion for INTEGER columns.
fn db_int(value: u32, field: &str) -> Result<i32, AppError> {
    i32::try_from(value).map_err(|_| {
        AppError::Internal(anyhow::anyhow!("{field} value {value} does not fit an INTEGER column"))
    })
}

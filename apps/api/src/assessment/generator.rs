//! Test Generation — builds the prompt, calls the model, normalizes questions.
//!
//! Flow: build prompt → LlmClient (testGeneration, retried on throttling) →
//!       parse + normalize questions → derive metadata locally.
//!
//! Aggregates (total points, duration, topic histogram) are always recomputed
//! from the normalized list; anything the model says about them is ignored.

use tracing::{info, warn};

use crate::assessment::models::{
    AdditionalQuestionsParams, GenerateTestParams, GeneratedTestResult, TestDifficulty,
    TestMetadata, TestQuestion,
};
use crate::assessment::normalize::parse_questions;
use crate::assessment::prompts::{
    ADDITIONAL_QUESTIONS_PROMPT_TEMPLATE, BROAD_COVERAGE, MIXED_DIFFICULTY_SPLIT,
    TEST_GENERATION_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION, RECRUITER_PERSONA};
use crate::llm_client::{LlmClient, LlmError, ProfileKind};

/// Existing question texts quoted in the follow-up prompt.
const MAX_EXISTING_QUESTIONS_IN_PROMPT: usize = 5;

/// Generates a fresh assessment for a job.
pub async fn generate_test(
    llm: &LlmClient,
    params: &GenerateTestParams,
) -> Result<GeneratedTestResult, LlmError> {
    let prompt = build_test_generation_prompt(params);
    info!(
        "Generating {} {} questions for '{}'",
        params.question_count, params.difficulty, params.job_title
    );

    let text = llm.generate(&prompt, ProfileKind::TestGeneration).await?;
    let questions = parse_questions(&text)?;

    if questions.len() != params.question_count as usize {
        warn!(
            "Requested {} questions, model returned {}",
            params.question_count,
            questions.len()
        );
    }

    let metadata = TestMetadata::from_questions(&questions);
    info!(
        "Generated {} questions ({} points, ~{} min)",
        questions.len(),
        metadata.total_points,
        metadata.estimated_duration_minutes
    );

    Ok(GeneratedTestResult {
        questions,
        metadata,
    })
}

/// Generates more questions for an existing test. Duplicates are discouraged
/// in the prompt only; nothing is filtered here.
pub async fn generate_additional_questions(
    llm: &LlmClient,
    existing: &[TestQuestion],
    params: &AdditionalQuestionsParams,
) -> Result<Vec<TestQuestion>, LlmError> {
    let prompt = build_additional_questions_prompt(existing, params);
    info!(
        "Generating {} additional questions ({} existing)",
        params.question_count,
        existing.len()
    );

    let text = llm.generate(&prompt, ProfileKind::TestGeneration).await?;
    parse_questions(&text)
}

fn question_types(params: &GenerateTestParams) -> String {
    let mut types = vec!["multiple_choice", "true_false"];
    if params.include_code {
        types.push("code");
    }
    if params.include_essay {
        types.push("essay");
    }
    types.join(", ")
}

fn difficulty_instruction(difficulty: TestDifficulty) -> String {
    match difficulty {
        TestDifficulty::Mixed => MIXED_DIFFICULTY_SPLIT.to_string(),
        other => format!("All {other} level"),
    }
}

pub fn build_test_generation_prompt(params: &GenerateTestParams) -> String {
    let topics_text = if params.topics.is_empty() {
        BROAD_COVERAGE.to_string()
    } else {
        format!("Focus on these specific topics: {}", params.topics.join(", "))
    };

    fill_template(
        TEST_GENERATION_PROMPT_TEMPLATE,
        &[
            ("persona", RECRUITER_PERSONA),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("question_types", &question_types(params)),
            ("difficulty_mix", &difficulty_instruction(params.difficulty)),
            ("difficulty", &params.difficulty.to_string()),
            ("question_count", &params.question_count.to_string()),
            ("topics_text", &topics_text),
            ("skills", &params.skills.join(", ")),
            ("job_title", &params.job_title),
            ("job_description", &params.job_description),
        ],
    )
}

pub fn build_additional_questions_prompt(
    existing: &[TestQuestion],
    params: &AdditionalQuestionsParams,
) -> String {
    let mut topics: Vec<&str> = Vec::new();
    for q in existing {
        if !topics.contains(&q.topic.as_str()) {
            topics.push(&q.topic);
        }
    }

    let existing_questions = existing
        .iter()
        .take(MAX_EXISTING_QUESTIONS_IN_PROMPT)
        .map(|q| q.question.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut job_context = Vec::new();
    if let Some(title) = &params.job_title {
        job_context.push(format!("Job Title: {title}"));
    }
    if let Some(skills) = &params.skills {
        job_context.push(format!("Skills: {}", skills.join(", ")));
    }
    if let Some(difficulty) = params.difficulty {
        job_context.push(format!("Difficulty: {difficulty}"));
    }

    fill_template(
        ADDITIONAL_QUESTIONS_PROMPT_TEMPLATE,
        &[
            ("question_count", &params.question_count.to_string()),
            ("existing_topics", &topics.join(", ")),
            ("job_context", &job_context.join("\n")),
            ("existing_questions", &existing_questions),
        ],
    )
}

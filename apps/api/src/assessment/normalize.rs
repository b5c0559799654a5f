//! Question normalization — the one place model output becomes `TestQuestion`.
//!
//! Defaulting policy for partial records:
//! - type        → multiple_choice (also for unknown labels)
//! - options     → []
//! - explanation → ""
//! - difficulty  → medium (also for unknown labels)
//! - topic       → "General"
//! - points      → difficulty default (5 / 10 / 15) when missing or not positive
//!
//! A question with no text or no correct answer cannot be defaulted and turns
//! the whole response into a parse error.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::assessment::models::{
    scalar_to_string, AnswerValue, Difficulty, QuestionType, TestQuestion,
};
use crate::llm_client::{parse_structured, LlmError};

/// Model-supplied point values above this fall back to the difficulty default.
pub const MAX_QUESTION_POINTS: u32 = 100;

pub const DEFAULT_TOPIC: &str = "General";

/// Loosely typed question as the model emits it.
#[derive(Debug, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, rename = "type")]
    pub question_type: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<Value>>,
    #[serde(default)]
    pub correct_answer: Option<Value>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub points: Option<Value>,
}

/// Parses model text into normalized questions. Accepts `{"questions": [...]}`
/// or a bare array.
pub fn parse_questions(text: &str) -> Result<Vec<TestQuestion>, LlmError> {
    let value: Value = parse_structured(text)?;
    let items = question_items(value).map_err(|m| LlmError::parse(m, text))?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let raw: RawQuestion = serde_json::from_value(item)
                .map_err(|e| LlmError::parse(format!("question {index}: {e}"), text))?;
            normalize_question(raw, index).map_err(|m| LlmError::parse(m, text))
        })
        .collect()
}

fn question_items(value: Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => Ok(items),
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(format!("'questions' is not an array: {other}")),
        },
        other => Err(format!("expected an object or array, got {other}")),
    }
}

pub fn normalize_question(raw: RawQuestion, index: usize) -> Result<TestQuestion, String> {
    let question = raw
        .question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| format!("question {index} has no text"))?;

    let correct_answer = raw
        .correct_answer
        .as_ref()
        .and_then(AnswerValue::from_json)
        .ok_or_else(|| format!("question {index} has no correct_answer"))?;

    let question_type = match raw.question_type.as_deref() {
        None => QuestionType::default(),
        Some(label) => QuestionType::from_label(label).unwrap_or_else(|| {
            warn!("Question {index}: unknown type {label:?}, using multiple_choice");
            QuestionType::default()
        }),
    };

    let difficulty = match raw.difficulty.as_deref() {
        None => Difficulty::default(),
        Some(label) => Difficulty::from_label(label).unwrap_or_else(|| {
            warn!("Question {index}: unknown difficulty {label:?}, using medium");
            Difficulty::default()
        }),
    };

    let topic = raw
        .topic
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

    let points = match raw.points.as_ref().and_then(points_from_json) {
        Some(points) if points <= MAX_QUESTION_POINTS => points,
        Some(points) => {
            warn!(
                "Question {index}: {points} points is out of range, using the {} default",
                difficulty.as_str()
            );
            difficulty.default_points()
        }
        None => difficulty.default_points(),
    };

    Ok(TestQuestion {
        question,
        question_type,
        options: raw
            .options
            .unwrap_or_default()
            .iter()
            .map(scalar_to_string)
            .collect(),
        correct_answer,
        explanation: raw.explanation.unwrap_or_default(),
        difficulty,
        topic,
        points,
    })
}

fn points_from_json(value: &Value) -> Option<u32> {
    let points = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    // `as` saturates, so huge values land on u32::MAX and are rejected by the caller.
    (points.is_finite() && points >= 1.0).then(|| points.round() as u32)
}

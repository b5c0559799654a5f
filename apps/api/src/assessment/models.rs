use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minutes budgeted per question when estimating test duration.
pub const MINUTES_PER_QUESTION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
    Code,
    Essay,
}

impl QuestionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Code => "code",
            QuestionType::Essay => "essay",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "true_false" => Some(QuestionType::TrueFalse),
            "code" => Some(QuestionType::Code),
            "essay" => Some(QuestionType::Essay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// easy=5, medium=10, hard=15
    pub const fn default_points(self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 15,
        }
    }

    /// Inverse of `default_points` for stored questions without a difficulty.
    pub const fn from_points(points: u32) -> Self {
        if points <= 5 {
            Difficulty::Easy
        } else if points <= 10 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}

/// Requested difficulty for a whole test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Mixed,
}

impl fmt::Display for TestDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestDifficulty::Easy => "easy",
            TestDifficulty::Medium => "medium",
            TestDifficulty::Hard => "hard",
            TestDifficulty::Mixed => "mixed",
        })
    }
}

/// A correct answer or a candidate submission: one value, or a list for multi-select.
/// Values keep their JSON type, so `true` and `"true"` are different answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Multiple(Vec<Value>),
    Single(Value),
}

impl AnswerValue {
    /// Converts a loosely typed JSON value. `null` means "no answer".
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(AnswerValue::Multiple(items.clone())),
            other => Some(AnswerValue::Single(other.clone())),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Single(Value::String(value.into()))
    }

    pub fn empty() -> Self {
        AnswerValue::text("")
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::Multiple(items) => Value::Array(items.clone()),
            AnswerValue::Single(value) => value.clone(),
        }
    }
}

impl fmt::Display for AnswerValue {
    /// JSON rendering, used verbatim inside prompts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Option labels: strings pass through unquoted, everything else uses its JSON text.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One normalized assessment item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: AnswerValue,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub topic: String,
    pub points: u32,
}

/// Aggregates derived from the final question list. Never read from model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMetadata {
    pub total_points: u32,
    pub estimated_duration_minutes: u32,
    pub topic_distribution: BTreeMap<String, u32>,
}

impl TestMetadata {
    pub fn from_questions(questions: &[TestQuestion]) -> Self {
        let mut topic_distribution = BTreeMap::new();
        for q in questions {
            *topic_distribution.entry(q.topic.clone()).or_insert(0) += 1;
        }
        Self {
            total_points: questions
                .iter()
                .fold(0u32, |total, q| total.saturating_add(q.points)),
            estimated_duration_minutes: questions.len() as u32 * MINUTES_PER_QUESTION,
            topic_distribution,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedTestResult {
    pub questions: Vec<TestQuestion>,
    pub metadata: TestMetadata,
}

/// Inputs for a fresh test. `question_count` bounds are checked by the API layer.
#[derive(Debug, Clone)]
pub struct GenerateTestParams {
    pub job_title: String,
    pub job_description: String,
    pub skills: Vec<String>,
    pub difficulty: TestDifficulty,
    pub question_count: u32,
    pub topics: Vec<String>,
    pub include_code: bool,
    pub include_essay: bool,
}

/// Inputs for topping up an existing test. Only the count is required.
#[derive(Debug, Clone, Default)]
pub struct AdditionalQuestionsParams {
    pub job_title: Option<String>,
    pub skills: Option<Vec<String>>,
    pub difficulty: Option<TestDifficulty>,
    pub question_count: u32,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn question(topic: &str, points: u32) -> TestQuestion {
        TestQuestion {
            question: "What is ownership?".to_string(),
            question_type: QuestionType::MultipleChoice,
            options: vec![],
            correct_answer: AnswerValue::text("A"),
            explanation: String::new(),
            difficulty: Difficulty::Medium,
            topic: topic.to_string(),
            points,
        }
    }

    #[test]
    fn test_metadata_is_derived_from_questions() {
        let questions = vec![question("Rust", 10), question("SQL", 5), question("Rust", 15)];
        let meta = TestMetadata::from_questions(&questions);
        assert_eq!(meta.total_points, 30);
        assert_eq!(meta.estimated_duration_minutes, 6);
        assert_eq!(meta.topic_distribution.get("Rust"), Some(&2));
        assert_eq!(meta.topic_distribution.get("SQL"), Some(&1));
    }

    #[test]
    fn test_metadata_total_saturates_instead_of_overflowing() {
        let meta = TestMetadata::from_questions(&[question("Rust", u32::MAX), question("Rust", 10)]);
        assert_eq!(meta.total_points, u32::MAX);
    }

    #[test]
    fn test_metadata_for_empty_list() {
        let meta = TestMetadata::from_questions(&[]);
        assert_eq!(meta.total_points, 0);
        assert_eq!(meta.estimated_duration_minutes, 0);
        assert!(meta.topic_distribution.is_empty());
    }

    #[test]
    fn test_answer_value_from_json_keeps_json_types() {
        assert_eq!(AnswerValue::from_json(&json!("B")), Some(AnswerValue::text("B")));
        assert_eq!(
            AnswerValue::from_json(&json!(true)),
            Some(AnswerValue::Single(json!(true)))
        );
        assert_eq!(
            AnswerValue::from_json(&json!(["a", 2])),
            Some(AnswerValue::Multiple(vec![json!("a"), json!(2)]))
        );
        assert_eq!(AnswerValue::from_json(&Value::Null), None);
    }

    #[test]
    fn test_answer_value_equality_is_strict() {
        assert_ne!(AnswerValue::Single(json!(true)), AnswerValue::text("true"));
        assert_ne!(AnswerValue::Single(json!(1)), AnswerValue::text("1"));
        assert_ne!(
            AnswerValue::Multiple(vec![json!("A"), json!("C")]),
            AnswerValue::Multiple(vec![json!("C"), json!("A")])
        );
    }

    #[test]
    fn test_answer_value_display_is_json() {
        let multi = AnswerValue::Multiple(vec![json!("x"), json!("y")]);
        assert_eq!(multi.to_string(), r#"["x","y"]"#);
        assert_eq!(AnswerValue::text("x").to_string(), r#""x""#);
        assert_eq!(AnswerValue::Single(json!(3)).to_string(), "3");
    }

    #[test]
    fn test_difficulty_points_mapping() {
        assert_eq!(Difficulty::Easy.default_points(), 5);
        assert_eq!(Difficulty::Hard.default_points(), 15);
        assert_eq!(Difficulty::from_points(5), Difficulty::Easy);
        assert_eq!(Difficulty::from_points(10), Difficulty::Medium);
        assert_eq!(Difficulty::from_points(20), Difficulty::Hard);
    }

    #[test]
    fn test_question_serializes_type_field() {
        let value = serde_json::to_value(question("Rust", 10)).unwrap();
        assert_eq!(value["type"], "multiple_choice");
        assert_eq!(value["correct_answer"], "A");
        assert_eq!(value["difficulty"], "medium");
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(QuestionType::from_label("TRUE_FALSE"), Some(QuestionType::TrueFalse));
        assert_eq!(Difficulty::from_label(" Hard "), Some(Difficulty::Hard));
        assert_eq!(QuestionType::from_label("matching"), None);
    }
}

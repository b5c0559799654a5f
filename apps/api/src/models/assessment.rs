use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessment::models::{
    scalar_to_string, AnswerValue, Difficulty, QuestionType, TestQuestion,
};
use crate::assessment::normalize::DEFAULT_TOPIC;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestRow {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub passing_score: i32,
    pub total_points: i32,
    pub ai_generated: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub test_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub options: Value,
    pub correct_answer: Value,
    pub explanation: Option<String>,
    pub points: i32,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// A test result joined with the test it belongs to and the candidate's name.
#[derive(Debug, Clone, FromRow)]
pub struct TestResultDetailRow {
    pub id: Uuid,
    pub test_id: Uuid,
    /// Submissions keyed by question id.
    pub answers: Value,
    pub ai_analysis: Option<Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub test_title: String,
    pub duration_minutes: i32,
    pub candidate_name: Option<String>,
}

impl QuestionRow {
    pub fn points(&self) -> u32 {
        self.points.max(0) as u32
    }

    /// Stored topic, else the label in front of a short "Topic: ..." explanation.
    pub fn topic_or_inferred(&self) -> String {
        self.topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| topic_from_explanation(self.explanation.as_deref()))
    }

    /// Stored difficulty, else derived from the point value.
    pub fn difficulty_or_inferred(&self) -> Difficulty {
        self.difficulty
            .as_deref()
            .and_then(Difficulty::from_label)
            .unwrap_or_else(|| Difficulty::from_points(self.points()))
    }

    pub fn correct_answer(&self) -> AnswerValue {
        AnswerValue::from_json(&self.correct_answer).unwrap_or_else(AnswerValue::empty)
    }

    pub fn to_test_question(&self) -> TestQuestion {
        TestQuestion {
            question: self.question_text.clone(),
            question_type: QuestionType::from_label(&self.question_type).unwrap_or_default(),
            options: self
                .options
                .as_array()
                .map(|items| items.iter().map(scalar_to_string).collect())
                .unwrap_or_default(),
            correct_answer: self.correct_answer(),
            explanation: self.explanation.clone().unwrap_or_default(),
            difficulty: self.difficulty_or_inferred(),
            topic: self.topic_or_inferred(),
            points: self.points(),
        }
    }
}

/// "JavaScript: closures capture..." → "JavaScript". The colon must sit within
/// the first 30 characters, otherwise the topic is "General".
pub fn topic_from_explanation(explanation: Option<&str>) -> String {
    let Some(explanation) = explanation else {
        return DEFAULT_TOPIC.to_string();
    };
    match explanation.find(':') {
        Some(idx) if idx > 0 && idx < 30 => {
            let topic = explanation[..idx].trim();
            if topic.is_empty() {
                DEFAULT_TOPIC.to_string()
            } else {
                topic.to_string()
            }
        }
        _ => DEFAULT_TOPIC.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(topic: Option<&str>, difficulty: Option<&str>, explanation: Option<&str>, points: i32) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            test_id: Uuid::new_v4(),
            question_text: "Which keyword moves a value into a closure?".to_string(),
            question_type: "multiple_choice".to_string(),
            options: json!(["move", "ref", "mut", "static"]),
            correct_answer: json!("move"),
            explanation: explanation.map(str::to_string),
            points,
            topic: topic.map(str::to_string),
            difficulty: difficulty.map(str::to_string),
            order_index: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_topic_from_explanation_prefix() {
        assert_eq!(
            topic_from_explanation(Some("Closures: `move` transfers ownership")),
            "Closures"
        );
    }

    #[test]
    fn test_topic_from_explanation_falls_back_to_general() {
        assert_eq!(topic_from_explanation(None), "General");
        assert_eq!(topic_from_explanation(Some(": leading colon")), "General");
        assert_eq!(
            topic_from_explanation(Some(
                "This explanation runs on for quite a while before it: finally has a colon"
            )),
            "General"
        );
        assert_eq!(topic_from_explanation(Some("No colon at all")), "General");
    }

    #[test]
    fn test_stored_topic_and_difficulty_win() {
        let r = row(Some("Ownership"), Some("hard"), Some("Closures: ..."), 5);
        assert_eq!(r.topic_or_inferred(), "Ownership");
        assert_eq!(r.difficulty_or_inferred(), Difficulty::Hard);
    }

    #[test]
    fn test_inferred_topic_and_difficulty() {
        let r = row(None, None, Some("Closures: ..."), 15);
        assert_eq!(r.topic_or_inferred(), "Closures");
        assert_eq!(r.difficulty_or_inferred(), Difficulty::Hard);
    }

    #[test]
    fn test_row_to_test_question() {
        let q = row(Some("Closures"), Some("medium"), None, 10).to_test_question();
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.correct_answer, AnswerValue::text("move"));
        assert_eq!(q.points, 10);
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::models::{AnswerValue, Difficulty};

/// One answered question, scored by strict value equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAnswer {
    pub question_id: Uuid,
    pub question: String,
    pub candidate_answer: AnswerValue,
    pub correct_answer: AnswerValue,
    pub is_correct: bool,
    pub points: u32,
    /// `points` when correct, otherwise 0.
    pub earned_points: u32,
    pub topic: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone)]
pub struct AnalyzeCandidateParams {
    pub candidate_name: String,
    pub job_title: String,
    pub answers: Vec<CandidateAnswer>,
    pub total_points: u32,
    pub earned_points: u32,
    /// Minutes allowed.
    pub test_duration: u32,
    /// Minutes taken.
    pub actual_duration: u32,
}

/// Per-topic tally used in the analysis prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPerformance {
    pub topic: String,
    pub correct: u32,
    pub total: u32,
    pub points: u32,
    pub max_points: u32,
}

impl TopicPerformance {
    pub fn score_percentage(&self) -> f64 {
        percentage(self.points, self.max_points)
    }
}

/// `part / whole × 100`, 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    pub topic: String,
    pub score: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
    pub topic: String,
    pub score: f64,
    pub description: String,
    #[serde(default, alias = "improvementSuggestions")]
    pub improvement_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(SkillLevel::Beginner),
            "intermediate" => Some(SkillLevel::Intermediate),
            "advanced" => Some(SkillLevel::Advanced),
            "expert" => Some(SkillLevel::Expert),
            _ => None,
        }
    }
}

/// Final analysis. Cached by the caller and never regenerated once stored.
///
/// `overall_score` and `percentile` are computed locally; the model only
/// supplies the qualitative fields and the readiness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub percentile: u8,
    pub strengths: Vec<Strength>,
    pub weaknesses: Vec<Weakness>,
    pub recommendations: Vec<Recommendation>,
    pub summary: String,
    pub detailed_feedback: String,
    pub estimated_skill_level: SkillLevel,
    pub readiness_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPhase {
    #[serde(default)]
    pub phase: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    #[serde(default)]
    pub phases: Vec<LearningPhase>,
}

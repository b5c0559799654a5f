//! Analysis normalization — turns the model's loosely typed analysis into
//! `AnalysisResult` fields.
//!
//! Defaults: lists → [], summary → "Analysis completed.", detailed feedback →
//! summary, skill level → intermediate, readiness → rounded overall score.
//! Scores are clamped to 0–100, unknown priorities become medium.
//! `overallScore` / `percentile` in the model output are never read.

use serde::Deserialize;
use serde_json::Value;

use crate::analysis::models::{
    AnalysisResult, Priority, Recommendation, SkillLevel, Strength, Weakness,
};

pub const DEFAULT_SUMMARY: &str = "Analysis completed.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default)]
    pub strengths: Option<Vec<RawStrength>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<RawWeakness>>,
    #[serde(default)]
    pub recommendations: Option<Vec<RawRecommendation>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "detailed_feedback")]
    pub detailed_feedback: Option<String>,
    #[serde(default, alias = "estimated_skill_level")]
    pub estimated_skill_level: Option<String>,
    #[serde(default, alias = "readiness_score")]
    pub readiness_score: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawStrength {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawWeakness {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "improvementSuggestions", alias = "improvement_suggestions")]
    pub improvement_suggestions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRecommendation {
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Option<Vec<String>>,
}

/// Builds the final record. `overall_score` and `percentile` come from the caller.
pub fn normalize_analysis(raw: RawAnalysis, overall_score: f64, percentile: u8) -> AnalysisResult {
    let summary = non_empty(raw.summary).unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
    let detailed_feedback = non_empty(raw.detailed_feedback).unwrap_or_else(|| summary.clone());

    let readiness_score = raw
        .readiness_score
        .as_ref()
        .and_then(score_from_json)
        .unwrap_or(overall_score)
        .clamp(0.0, 100.0)
        .round() as u32;

    AnalysisResult {
        overall_score,
        percentile,
        strengths: raw
            .strengths
            .unwrap_or_default()
            .into_iter()
            .map(|s| Strength {
                topic: topic_or_general(s.topic),
                score: s.score.as_ref().and_then(score_from_json).unwrap_or(0.0),
                description: s.description.unwrap_or_default(),
            })
            .collect(),
        weaknesses: raw
            .weaknesses
            .unwrap_or_default()
            .into_iter()
            .map(|w| Weakness {
                topic: topic_or_general(w.topic),
                score: w.score.as_ref().and_then(score_from_json).unwrap_or(0.0),
                description: w.description.unwrap_or_default(),
                improvement_suggestions: w.improvement_suggestions.unwrap_or_default(),
            })
            .collect(),
        recommendations: raw
            .recommendations
            .unwrap_or_default()
            .into_iter()
            .map(|r| Recommendation {
                priority: r
                    .priority
                    .as_deref()
                    .and_then(Priority::from_label)
                    .unwrap_or_default(),
                category: r.category.unwrap_or_default(),
                title: r.title.unwrap_or_default(),
                description: r.description.unwrap_or_default(),
                resources: r.resources.unwrap_or_default(),
            })
            .collect(),
        summary,
        detailed_feedback,
        estimated_skill_level: raw
            .estimated_skill_level
            .as_deref()
            .and_then(SkillLevel::from_label)
            .unwrap_or_default(),
        readiness_score,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn topic_or_general(topic: Option<String>) -> String {
    non_empty(topic).unwrap_or_else(|| "General".to_string())
}

/// Number or numeric string (a trailing `%` is tolerated), clamped to 0–100.
fn score_from_json(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score.is_finite().then(|| score.clamp(0.0, 100.0))
}

//! Scores stored submissions against stored questions.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::analysis::models::CandidateAnswer;
use crate::assessment::models::AnswerValue;
use crate::models::assessment::QuestionRow;

/// One `CandidateAnswer` per question, in question order. `submissions` is the
/// stored answers object keyed by question id; missing entries count as an
/// empty answer. Correctness is plain JSON equality: `1` and `"1"` differ,
/// multi-select lists must match in order.
pub fn build_candidate_answers(questions: &[QuestionRow], submissions: &Value) -> Vec<CandidateAnswer> {
    questions
        .iter()
        .map(|q| {
            let candidate_answer = submissions
                .get(q.id.to_string().as_str())
                .and_then(AnswerValue::from_json)
                .unwrap_or_else(AnswerValue::empty);
            let correct_answer = q.correct_answer();
            let is_correct = candidate_answer == correct_answer;
            let points = q.points();

            CandidateAnswer {
                question_id: q.id,
                question: q.question_text.clone(),
                candidate_answer,
                correct_answer,
                is_correct,
                points,
                earned_points: if is_correct { points } else { 0 },
                topic: q.topic_or_inferred(),
                difficulty: q.difficulty_or_inferred(),
            }
        })
        .collect()
}

pub fn total_points(answers: &[CandidateAnswer]) -> u32 {
    answers.iter().map(|a| a.points).sum()
}

pub fn total_earned(answers: &[CandidateAnswer]) -> u32 {
    answers.iter().map(|a| a.earned_points).sum()
}

/// Whole minutes between start and completion, `now` when still in progress.
pub fn actual_duration_minutes(
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u32 {
    let end = completed_at.unwrap_or(now);
    let seconds = (end - started_at).num_seconds().max(0);
    (seconds as f64 / 60.0).round() as u32
}

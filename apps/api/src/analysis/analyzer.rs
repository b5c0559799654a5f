//! Candidate Analysis — turns a scored answer set into strengths, weaknesses
//! and recommendations.
//!
//! Flow: group answers by topic → build prompt → LlmClient (candidateAnalysis)
//!       → parse + normalize → attach locally computed score and percentile.

use tracing::info;

use crate::analysis::models::{
    percentage, AnalysisResult, AnalyzeCandidateParams, CandidateAnswer, LearningPath,
    TopicPerformance, Weakness,
};
use crate::analysis::normalize::{normalize_analysis, RawAnalysis};
use crate::analysis::prompts::{
    ALL_CORRECT, ANALYSIS_PROMPT_TEMPLATE, CORRECT_FEEDBACK, LEARNING_PATH_PROMPT_TEMPLATE,
    QUICK_FEEDBACK_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION, RECRUITER_PERSONA};
use crate::llm_client::{LlmClient, LlmError, ProfileKind};

pub async fn analyze_candidate_performance(
    llm: &LlmClient,
    params: &AnalyzeCandidateParams,
) -> Result<AnalysisResult, LlmError> {
    let prompt = build_analysis_prompt(params);
    info!(
        "Analyzing {} answers from '{}' for '{}'",
        params.answers.len(),
        params.candidate_name,
        params.job_title
    );

    let raw: RawAnalysis = llm
        .generate_json(&prompt, ProfileKind::CandidateAnalysis)
        .await?;

    let overall = overall_score(params.earned_points, params.total_points);
    let result = normalize_analysis(raw, overall, estimate_percentile(overall));

    info!(
        "Analysis done: {:.1}% (percentile {}), readiness {}",
        result.overall_score, result.percentile, result.readiness_score
    );
    Ok(result)
}

/// Short explanation of a wrong answer. Correct answers never reach the model.
pub async fn generate_quick_feedback(
    llm: &LlmClient,
    question: &str,
    candidate_answer: &str,
    correct_answer: &str,
    is_correct: bool,
) -> Result<String, LlmError> {
    if is_correct {
        return Ok(CORRECT_FEEDBACK.to_string());
    }

    let prompt = fill_template(
        QUICK_FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("question", question),
            ("candidate_answer", candidate_answer),
            ("correct_answer", correct_answer),
        ],
    );

    let text = llm.generate(&prompt, ProfileKind::QuickResponse).await?;
    Ok(text.trim().to_string())
}

/// Three-phase plan (Foundation → Intermediate → Advanced) for the given weaknesses.
pub async fn generate_learning_path(
    llm: &LlmClient,
    weaknesses: &[Weakness],
    target_role: &str,
) -> Result<LearningPath, LlmError> {
    let weakness_topics = weaknesses
        .iter()
        .map(|w| format!("{} (score: {}%)", w.topic, w.score))
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = fill_template(
        LEARNING_PATH_PROMPT_TEMPLATE,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("weaknesses", &weakness_topics),
            ("target_role", target_role),
        ],
    );

    info!(
        "Generating learning path for '{target_role}' ({} weaknesses)",
        weaknesses.len()
    );
    llm.generate_json(&prompt, ProfileKind::CandidateAnalysis)
        .await
}

/// `earned / total × 100`, 0 when the test carries no points.
pub fn overall_score(earned_points: u32, total_points: u32) -> f64 {
    percentage(earned_points, total_points)
}

pub fn estimate_percentile(score: f64) -> u8 {
    match score {
        s if s >= 90.0 => 95,
        s if s >= 80.0 => 85,
        s if s >= 70.0 => 70,
        s if s >= 60.0 => 55,
        s if s >= 50.0 => 40,
        s if s >= 40.0 => 25,
        _ => 10,
    }
}

/// Per-topic tallies in order of first appearance.
pub fn topic_performance(answers: &[CandidateAnswer]) -> Vec<TopicPerformance> {
    let mut topics: Vec<TopicPerformance> = Vec::new();
    for answer in answers {
        let idx = match topics.iter().position(|t| t.topic == answer.topic) {
            Some(idx) => idx,
            None => {
                topics.push(TopicPerformance {
                    topic: answer.topic.clone(),
                    correct: 0,
                    total: 0,
                    points: 0,
                    max_points: 0,
                });
                topics.len() - 1
            }
        };
        let entry = &mut topics[idx];
        entry.total += 1;
        entry.max_points += answer.points;
        entry.points += answer.earned_points;
        if answer.is_correct {
            entry.correct += 1;
        }
    }
    topics
}

pub fn build_analysis_prompt(params: &AnalyzeCandidateParams) -> String {
    let score_percentage = overall_score(params.earned_points, params.total_points);
    let time_efficiency = percentage(params.actual_duration, params.test_duration);

    let topic_summary = topic_performance(&params.answers)
        .iter()
        .map(|t| {
            format!(
                "- {}: {}/{} correct ({:.1}% score)",
                t.topic,
                t.correct,
                t.total,
                t.score_percentage()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let incorrect = params
        .answers
        .iter()
        .filter(|a| !a.is_correct)
        .map(|a| {
            format!(
                "Q: {}\nCandidate Answer: {}\nCorrect Answer: {}\nTopic: {}",
                a.question, a.candidate_answer, a.correct_answer, a.topic
            )
        })
        .collect::<Vec<_>>();
    let incorrect_answers = if incorrect.is_empty() {
        ALL_CORRECT.to_string()
    } else {
        incorrect.join("\n\n")
    };

    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("persona", RECRUITER_PERSONA),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("earned_points", &params.earned_points.to_string()),
            ("total_points", &params.total_points.to_string()),
            ("score_percentage", &format!("{score_percentage:.1}")),
            ("time_efficiency", &format!("{time_efficiency:.1}")),
            ("actual_duration", &params.actual_duration.to_string()),
            ("test_duration", &params.test_duration.to_string()),
            ("question_count", &params.answers.len().to_string()),
            ("topic_summary", &topic_summary),
            ("incorrect_answers", &incorrect_answers),
            ("job_title", &params.job_title),
            ("candidate_name", &params.candidate_name),
        ],
    )
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::analysis::models::SkillLevel;
    use crate::assessment::models::{AnswerValue, Difficulty};
    use crate::llm_client::testing::FakeTransport;

    fn answer(topic: &str, correct: bool, points: u32) -> CandidateAnswer {
        CandidateAnswer {
            question_id: Uuid::new_v4(),
            question: format!("What about {topic}?"),
            candidate_answer: AnswerValue::text(if correct { "A" } else { "B" }),
            correct_answer: AnswerValue::text("A"),
            is_correct: correct,
            points,
            earned_points: if correct { points } else { 0 },
            topic: topic.to_string(),
            difficulty: Difficulty::Medium,
        }
    }

    fn params(answers: Vec<CandidateAnswer>) -> AnalyzeCandidateParams {
        let total_points = answers.iter().map(|a| a.points).sum();
        let earned_points = answers.iter().map(|a| a.earned_points).sum();
        AnalyzeCandidateParams {
            candidate_name: "Ada".to_string(),
            job_title: "Backend Engineer".to_string(),
            answers,
            total_points,
            earned_points,
            test_duration: 40,
            actual_duration: 30,
        }
    }

    #[test]
    fn test_percentile_steps() {
        let cases = [
            (100.0, 95),
            (90.0, 95),
            (85.0, 85),
            (70.0, 70),
            (69.9, 55),
            (50.0, 40),
            (40.0, 25),
            (12.0, 10),
            (0.0, 10),
        ];
        for (score, expected) in cases {
            assert_eq!(estimate_percentile(score), expected, "score {score}");
        }
    }

    #[test]
    fn test_overall_score_with_no_points_is_zero() {
        assert_eq!(overall_score(0, 0), 0.0);
    }

    #[test]
    fn test_topic_performance_keeps_first_appearance_order() {
        let answers = vec![
            answer("SQL", true, 10),
            answer("Rust", false, 15),
            answer("SQL", false, 5),
        ];
        let topics = topic_performance(&answers);
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].topic, "SQL");
        assert_eq!((topics[0].correct, topics[0].total), (1, 2));
        assert_eq!((topics[0].points, topics[0].max_points), (10, 15));
        assert_eq!(topics[1].topic, "Rust");
        assert_eq!(topics[1].points, 0);
    }

    #[test]
    fn test_prompt_lists_topics_and_incorrect_answers() {
        let prompt = build_analysis_prompt(&params(vec![
            answer("SQL", true, 10),
            answer("Rust", false, 10),
        ]));
        assert!(prompt.contains("Overall Score: 10/20 points (50.0%)"));
        assert!(prompt.contains("Time Efficiency: 75.0% (completed in 30 min of 40 min allowed)"));
        assert!(prompt.contains("- SQL: 1/1 correct (100.0% score)"));
        assert!(prompt.contains("- Rust: 0/1 correct (0.0% score)"));
        assert!(prompt.contains(
            "Q: What about Rust?\nCandidate Answer: \"B\"\nCorrect Answer: \"A\"\nTopic: Rust"
        ));
        assert!(prompt.contains("Candidate: Ada"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_prompt_when_everything_is_correct() {
        let prompt = build_analysis_prompt(&params(vec![answer("SQL", true, 10)]));
        assert!(prompt.contains(ALL_CORRECT));
    }

    #[tokio::test]
    async fn test_perfect_score_overrides_model_numbers() {
        let fake = FakeTransport::replying(
            r#"```json
{"overallScore": 20, "percentile": 5, "summary": "Strong.", "estimatedSkillLevel": "expert"}
```"#,
        );
        let llm = FakeTransport::client(fake.clone());

        let result = analyze_candidate_performance(
            &llm,
            &params(vec![answer("SQL", true, 10), answer("Rust", true, 10)]),
        )
        .await
        .unwrap();

        assert_eq!(result.overall_score, 100.0);
        assert_eq!(result.percentile, 95);
        assert_eq!(result.readiness_score, 100);
        assert_eq!(result.estimated_skill_level, SkillLevel::Expert);
        assert_eq!(fake.profiles(), vec![ProfileKind::CandidateAnalysis]);
    }

    #[tokio::test]
    async fn test_half_correct_scores_fifty() {
        let fake = FakeTransport::replying(r#"{"summary": "Mixed."}"#);
        let llm = FakeTransport::client(fake);

        let result = analyze_candidate_performance(
            &llm,
            &params(vec![
                answer("SQL", true, 10),
                answer("SQL", false, 10),
                answer("Rust", true, 10),
                answer("Rust", false, 10),
            ]),
        )
        .await
        .unwrap();

        assert_eq!(result.overall_score, 50.0);
        assert_eq!(result.percentile, 40);
        assert_eq!(result.readiness_score, 50);
    }

    #[tokio::test]
    async fn test_unparseable_analysis_is_a_parse_error() {
        let fake = FakeTransport::replying("not json");
        let llm = FakeTransport::client(fake);
        let err = analyze_candidate_performance(&llm, &params(vec![answer("SQL", true, 10)]))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_quick_feedback_for_correct_answer_skips_the_model() {
        let fake = std::sync::Arc::new(FakeTransport::new(vec![]));
        let llm = FakeTransport::client(fake.clone());
        let feedback = generate_quick_feedback(&llm, "2 + 2?", "4", "4", true)
            .await
            .unwrap();
        assert_eq!(feedback, "Correct! Well done.");
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quick_feedback_for_wrong_answer_is_trimmed() {
        let fake = FakeTransport::replying("  Close, but 2 + 2 is 4.\n");
        let llm = FakeTransport::client(fake.clone());
        let feedback = generate_quick_feedback(&llm, "2 + 2?", "5", "4", false)
            .await
            .unwrap();
        assert_eq!(feedback, "Close, but 2 + 2 is 4.");
        assert_eq!(fake.profiles(), vec![ProfileKind::QuickResponse]);
        assert!(fake.prompts()[0].contains("Candidate Answer: 5"));
    }

    #[tokio::test]
    async fn test_learning_path_parses_phases() {
        let fake = FakeTransport::replying(
            r#"{"phases": [{"phase": 1, "title": "Foundation Phase", "duration": "2-4 weeks",
                "topics": ["Ownership"]}, {"phase": 2, "title": "Intermediate Phase"}]}"#,
        );
        let llm = FakeTransport::client(fake.clone());
        let weaknesses = vec![Weakness {
            topic: "Rust".to_string(),
            score: 40.0,
            description: "Borrowing".to_string(),
            improvement_suggestions: vec![],
        }];

        let path = generate_learning_path(&llm, &weaknesses, "Systems Engineer")
            .await
            .unwrap();

        assert_eq!(path.phases.len(), 2);
        assert_eq!(path.phases[0].topics, vec!["Ownership"]);
        assert!(path.phases[1].milestones.is_empty());
        assert_eq!(fake.profiles(), vec![ProfileKind::CandidateAnalysis]);
        assert!(fake.prompts()[0].contains("Rust (score: 40%)"));
    }
}

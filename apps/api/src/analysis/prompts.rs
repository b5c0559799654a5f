// Prompt templates for the Analysis module.

/// Candidate analysis prompt.
/// Replace: {persona}, {json_only}, {job_title}, {candidate_name}, {earned_points},
///          {total_points}, {score_percentage}, {time_efficiency}, {actual_duration},
///          {test_duration}, {question_count}, {topic_summary}, {incorrect_answers}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{persona} analyzing candidate performance for the position of {job_title}.

Candidate: {candidate_name}
Overall Score: {earned_points}/{total_points} points ({score_percentage}%)
Time Efficiency: {time_efficiency}% (completed in {actual_duration} min of {test_duration} min allowed)
Total Questions: {question_count}

Performance by Topic:
{topic_summary}

Incorrect or Partially Correct Answers:
{incorrect_answers}

Based on this performance data, provide a comprehensive analysis with:

1. **Strengths**: Identify 2-3 areas where the candidate performed well
2. **Weaknesses**: Identify 2-3 areas needing improvement with specific suggestions
3. **Recommendations**: Provide 3-5 actionable recommendations prioritized by importance
4. **Overall Summary**: A brief paragraph summarizing the candidate's readiness for the role
5. **Skill Level Estimation**: Assess if the candidate is beginner, intermediate, advanced, or expert
6. **Readiness Score**: On a scale of 0-100, how ready is the candidate for this role?

Return the response as a valid JSON object with this exact structure:
{
  "strengths": [
    {
      "topic": "string",
      "score": 85,
      "description": "string explaining what they did well"
    }
  ],
  "weaknesses": [
    {
      "topic": "string",
      "score": 45,
      "description": "string explaining the weakness",
      "improvementSuggestions": ["suggestion 1", "suggestion 2", "suggestion 3"]
    }
  ],
  "recommendations": [
    {
      "priority": "high",
      "category": "Learning",
      "title": "string",
      "description": "string",
      "resources": ["resource 1", "resource 2"]
    }
  ],
  "summary": "A comprehensive paragraph summarizing the analysis",
  "detailedFeedback": "Detailed paragraph with specific insights and observations",
  "estimatedSkillLevel": "intermediate",
  "readinessScore": 75
}

{json_only}"#;

pub const ALL_CORRECT: &str = "None - all answers were correct!";

/// Replace: {question}, {candidate_answer}, {correct_answer}
pub const QUICK_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Provide a brief, encouraging explanation for why this answer is incorrect and what the correct approach should be:

Question: {question}
Candidate Answer: {candidate_answer}
Correct Answer: {correct_answer}

Keep the feedback constructive, brief (2-3 sentences), and educational."#;

pub const CORRECT_FEEDBACK: &str = "Correct! Well done.";

/// Replace: {json_only}, {target_role}, {weaknesses}
pub const LEARNING_PATH_PROMPT_TEMPLATE: &str = r#"Create a structured learning path to help a candidate improve for the role of {target_role}.

Current Weaknesses:
{weaknesses}

Generate a 3-phase learning plan (Foundation → Intermediate → Advanced) with:
- Phase duration
- Topics to cover
- Resource recommendations
- Milestones to achieve

Return as JSON with structure:
{
  "phases": [
    {
      "phase": 1,
      "title": "Foundation Phase",
      "duration": "2-4 weeks",
      "topics": ["topic1", "topic2"],
      "resources": ["resource1", "resource2"],
      "milestones": ["milestone1", "milestone2"]
    }
  ]
}

{json_only}"#;

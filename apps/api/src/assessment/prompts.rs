// All prompt templates for the Assessment module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Test generation prompt template.
/// Replace: {persona}, {question_types}, {difficulty_mix}, {json_only}, {question_count},
///          {difficulty}, {topics_text}, {skills}, {job_title}, {job_description}
pub const TEST_GENERATION_PROMPT_TEMPLATE: &str = r#"{persona} creating an assessment test.

Job Title: {job_title}
Job Description: {job_description}
Required Skills: {skills}
Difficulty Level: {difficulty}
Number of Questions: {question_count}
{topics_text}

Generate {question_count} technical assessment questions with the following requirements:

1. Question Types: Use a mix of {question_types}
2. Difficulty: {difficulty_mix}
3. Coverage: Ensure questions cover the required skills and topics comprehensively
4. Real-world relevance: Questions should be practical and job-relevant
5. Clear explanations: Provide detailed explanations for correct answers

For each question, provide:
- question: The question text
- type: One of {question_types}
- options: Array of 4 options (for multiple_choice), or ["True", "False"] (for true_false)
- correct_answer: The correct answer(s)
- explanation: Detailed explanation of why the answer is correct
- difficulty: easy, medium, or hard
- topic: The specific topic/skill being tested
- points: Points for this question (easy: 5, medium: 10, hard: 15)

Return the response as a valid JSON object with this exact structure:
{
  "questions": [
    {
      "question": "string",
      "type": "multiple_choice",
      "options": ["option1", "option2", "option3", "option4"],
      "correct_answer": "option1",
      "explanation": "string",
      "difficulty": "medium",
      "topic": "string",
      "points": 10
    }
  ]
}

{json_only}"#;

/// Follow-up prompt for topping up an existing test.
/// Replace: {question_count}, {existing_topics}, {existing_questions}, {job_context}
pub const ADDITIONAL_QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate {question_count} additional technical assessment questions that are different from these existing questions:

Existing topics: {existing_topics}
Existing questions (avoid duplicates):
{existing_questions}

{job_context}

Each question must have: question, type (multiple_choice, true_false, code or essay), options, correct_answer, explanation, difficulty (easy, medium or hard), topic, points (easy: 5, medium: 10, hard: 15).

Return ONLY a valid JSON array of question objects, no additional text or markdown formatting."#;

pub const MIXED_DIFFICULTY_SPLIT: &str = "Mix of easy (30%), medium (50%), hard (20%)";

pub const BROAD_COVERAGE: &str = "Cover a broad range of relevant topics";

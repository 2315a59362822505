use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::domain::{submission::QuestionOutcome, Question, Quiz, SubmissionResult},
    services::leveling::LevelProgress,
};

/// A question as shown to the quiz taker, without its answer.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub point_value: u32,
}

impl From<Question> for QuestionDto {
    fn from(question: Question) -> Self {
        QuestionDto {
            id: question.id,
            text: question.text,
            options: question.options,
            point_value: question.point_value,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizDto {
    pub id: String,
    pub topic: String,
    pub language: String,
    pub questions: Vec<QuestionDto>,
    pub total_points: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Quiz> for QuizDto {
    fn from(quiz: Quiz) -> Self {
        let total_points = quiz.total_points();
        QuizDto {
            id: quiz.id,
            topic: quiz.topic,
            language: quiz.language,
            questions: quiz.questions.into_iter().map(QuestionDto::from).collect(),
            total_points,
            created_at: quiz.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub attempt_id: String,
    pub score: u8,
    pub points_earned: u64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub outcomes: Vec<QuestionOutcome>,
    pub progress: LevelProgress,
}

impl SubmissionResponse {
    pub fn new(attempt_id: String, result: SubmissionResult, progress: LevelProgress) -> Self {
        SubmissionResponse {
            attempt_id,
            score: result.score,
            points_earned: result.points_earned,
            correct_count: result.correct_count,
            total_questions: result.total_questions,
            outcomes: result.outcomes,
            progress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProgressDto {
    pub user_id: String,
    pub quizzes_completed: u32,
    #[serde(flatten)]
    pub progress: LevelProgress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::quiz::GenerationResult;

    #[test]
    fn quiz_dto_hides_correct_answers() {
        let question = Question::new("Q", vec!["a".into(), "b".into()], 2, 1000).unwrap();
        let quiz = Quiz::from_generation(
            "user-1",
            "Topic",
            "en",
            500,
            GenerationResult {
                questions: vec![question],
                model_id: "m".to_string(),
                response_time_ms: 1,
                attempts: 1,
                input_token_count: None,
                output_token_count: None,
                estimated_cost_usd: None,
            },
        );

        let dto = QuizDto::from(quiz);
        let json = serde_json::to_value(&dto).expect("dto should serialize");

        assert_eq!(dto.total_points, 1000);
        assert!(json["questions"][0].get("correct_option_number").is_none());
        assert_eq!(json["questions"][0]["options"][1], "b");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionAnswer {
    pub question_id: String,
    pub selected_option_number: u8,
}

impl QuestionAnswer {
    pub fn new(question_id: &str, selected_option_number: u8) -> Self {
        QuestionAnswer {
            question_id: question_id.to_string(),
            selected_option_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub selected_option_number: Option<u8>,
    pub is_correct: bool,
    pub points_earned: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmissionResult {
    pub score: u8, // 0..=100
    pub points_earned: u64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub outcomes: Vec<QuestionOutcome>,
}

/// A graded submission as stored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: u8,
    pub points_earned: u64,
    pub outcomes: Vec<QuestionOutcome>,
    pub submitted_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub fn from_result(user_id: &str, quiz_id: &str, result: &SubmissionResult) -> Self {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score: result.score,
            points_earned: result.points_earned,
            outcomes: result.outcomes.clone(),
            submitted_at: Utc::now(),
        }
    }
}

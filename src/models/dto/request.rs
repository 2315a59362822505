use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::QuestionAnswer;

static LANGUAGE_CODE_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z]{2,8})?$")
        .expect("LANGUAGE_CODE_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,

    #[validate(length(min = 1, max = 200))]
    pub topic: String,

    #[validate(regex(path = *LANGUAGE_CODE_REGEX, message = "Invalid language code"))]
    pub language: String,

    #[validate(range(min = 1, max = 20))]
    pub question_count: usize,

    #[validate(range(min = 2, max = 5))]
    pub option_count: usize,

    /// Falls back to the configured default when absent.
    #[validate(range(min = 500, max = 50000))]
    pub sample_length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1, max = 100))]
    pub question_id: String,
    pub selected_option_number: u8,
}

impl From<AnswerInput> for QuestionAnswer {
    fn from(input: AnswerInput) -> Self {
        QuestionAnswer {
            question_id: input.question_id,
            selected_option_number: input.selected_option_number,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,

    #[validate(length(max = 100), nested)]
    pub answers: Vec<AnswerInput>,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,     // 2..=5 entries, in display order
    pub correct_option_number: u8, // 1-based
    pub point_value: u32,
}

impl Question {
    /// Builds a question, enforcing the option-count and answer-range invariants.
    pub fn new(
        text: &str,
        options: Vec<String>,
        correct_option_number: u8,
        point_value: u32,
    ) -> AppResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::ValidationError(
                "Question text cannot be empty".to_string(),
            ));
        }

        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(AppError::ValidationError(format!(
                "Question must have between {} and {} options, got {}",
                MIN_OPTIONS,
                MAX_OPTIONS,
                options.len()
            )));
        }

        if options.iter().any(|o| o.trim().is_empty()) {
            return Err(AppError::ValidationError(
                "Question options cannot be empty".to_string(),
            ));
        }

        if correct_option_number == 0 || correct_option_number as usize > options.len() {
            return Err(AppError::ValidationError(format!(
                "Correct option number {} is out of range 1..={}",
                correct_option_number,
                options.len()
            )));
        }

        Ok(Question {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            options,
            correct_option_number,
            point_value,
        })
    }

    pub fn is_correct(&self, selected_option_number: u8) -> bool {
        selected_option_number == self.correct_option_number
    }

    pub fn correct_option(&self) -> Option<&str> {
        let index = usize::from(self.correct_option_number).checked_sub(1)?;
        self.options.get(index).map(String::as_str)
    }
}

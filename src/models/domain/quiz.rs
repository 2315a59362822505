use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::question::Question;

/// Outcome of one successful synthesis attempt.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GenerationResult {
    pub questions: Vec<Question>,
    pub model_id: String,
    pub response_time_ms: u64,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_token_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_token_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_usd: Option<f64>,
}

/// Observability data kept alongside a stored quiz.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GenerationMetadata {
    pub model_id: String,
    pub response_time_ms: u64,
    pub attempts: u32,
    pub sample_length: usize,
    pub input_token_count: Option<u32>,
    pub output_token_count: Option<u32>,
    pub estimated_cost_usd: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub user_id: String, // User who requested the quiz
    pub topic: String,
    pub language: String,
    pub questions: Vec<Question>,
    pub generation: GenerationMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    pub fn from_generation(
        user_id: &str,
        topic: &str,
        language: &str,
        sample_length: usize,
        result: GenerationResult,
    ) -> Self {
        Quiz {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            language: language.to_string(),
            generation: GenerationMetadata {
                model_id: result.model_id,
                response_time_ms: result.response_time_ms,
                attempts: result.attempts,
                sample_length,
                input_token_count: result.input_token_count,
                output_token_count: result.output_token_count,
                estimated_cost_usd: result.estimated_cost_usd,
            },
            questions: result.questions,
            created_at: Some(Utc::now()),
        }
    }

    pub fn total_points(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.point_value)).sum()
    }
}

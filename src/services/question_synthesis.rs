//! Prompt render, model invocation, response cleaning and parsing, retried as
//! one unit a bounded number of times.

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{sync::watch, time::Instant};

pub use crate::services::question_parser::OptionCountPolicy;
use crate::{
    errors::AppError,
    models::domain::{question::MAX_OPTIONS, GenerationResult, Question},
    services::{
        model_service::{CompletionModel, ModelPricing},
        prompt_templates::PromptTemplates,
        question_parser::{parse_questions, ParseOptions},
        response_cleaner::{clean_response, CleaningResult},
    },
};

pub const MAX_GENERATION_ATTEMPTS: u32 = 3;
pub const DEFAULT_POINTS_PER_QUESTION: u32 = 1000;
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 20;
pub const MIN_OPTIONS_REQUESTED: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub max_attempts: u32,
    pub max_options: usize,
    pub points_per_question: u32,
    pub option_count_policy: OptionCountPolicy,
    /// Applied to each model call; an elapsed call counts as a failed attempt.
    pub attempt_timeout: Option<Duration>,
    pub pricing: Option<ModelPricing>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_GENERATION_ATTEMPTS,
            max_options: MAX_OPTIONS,
            points_per_question: DEFAULT_POINTS_PER_QUESTION,
            option_count_policy: OptionCountPolicy::AcceptFewer,
            attempt_timeout: None,
            pricing: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub content: String,
    pub language: String,
    pub num_questions: usize,
    pub num_options: usize,
}

/// Why a single attempt produced no questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    EmptyResponse,
    Unparseable,
    NoQuestions,
    Model(String),
    TimedOut,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::EmptyResponse => write!(f, "model returned an empty response"),
            AttemptFailure::Unparseable => write!(f, "response could not be cleaned into JSON"),
            AttemptFailure::NoQuestions => write!(f, "response contained no valid questions"),
            AttemptFailure::Model(message) => write!(f, "model call failed: {}", message),
            AttemptFailure::TimedOut => write!(f, "model call timed out"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generation failed after {attempts} attempts: {last_failure}")]
    Failed {
        attempts: u32,
        last_failure: AttemptFailure,
    },

    #[error("generation cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("invalid generation request: {0}")]
    InvalidInput(String),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidInput(message) => AppError::ValidationError(message),
            other => AppError::GenerationFailed(other.to_string()),
        }
    }
}

/// Receiving side of a cancellation flag checked before and during attempts.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(rx))
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        CancelSignal(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                // Sender gone without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}

pub struct QuestionSynthesisEngine {
    model: Arc<dyn CompletionModel>,
    templates: PromptTemplates,
    settings: GenerationSettings,
}

impl QuestionSynthesisEngine {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        templates: PromptTemplates,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            model,
            templates,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    fn validate(&self, request: &GenerationRequest) -> Result<(), GenerationError> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&request.num_questions) {
            return Err(GenerationError::InvalidInput(format!(
                "question count must be between {} and {}, got {}",
                MIN_QUESTIONS, MAX_QUESTIONS, request.num_questions
            )));
        }
        if !(MIN_OPTIONS_REQUESTED..=self.settings.max_options).contains(&request.num_options) {
            return Err(GenerationError::InvalidInput(format!(
                "option count must be between {} and {}, got {}",
                MIN_OPTIONS_REQUESTED, self.settings.max_options, request.num_options
            )));
        }
        if request.content.trim().is_empty() {
            return Err(GenerationError::InvalidInput(
                "content cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        self.generate_with_cancel(request, CancelSignal::never()).await
    }

    /// Runs up to `max_attempts` attempts. Cancellation is honoured before an
    /// attempt starts and while one is in flight; nothing partial is returned.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        mut cancel: CancelSignal,
    ) -> Result<GenerationResult, GenerationError> {
        self.validate(request)?;

        let template = self.templates.resolve(&request.language).await;
        let prompt = template.render(
            &request.content,
            &request.language,
            request.num_questions,
            request.num_options,
        );

        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_failure = AttemptFailure::NoQuestions;

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                log::info!("Quiz generation cancelled before attempt {}", attempt);
                return Err(GenerationError::Cancelled {
                    attempts: attempt - 1,
                });
            }

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("Quiz generation cancelled during attempt {}", attempt);
                    return Err(GenerationError::Cancelled { attempts: attempt });
                }
                outcome = self.attempt(&prompt, request) => outcome,
            };
            let elapsed = started.elapsed();

            match outcome {
                Ok(mut result) => {
                    log::info!(
                        "Generated {} questions on attempt {}/{} in {} ms",
                        result.questions.len(),
                        attempt,
                        max_attempts,
                        elapsed.as_millis()
                    );
                    result.attempts = attempt;
                    result.response_time_ms = elapsed.as_millis() as u64;
                    return Ok(result);
                }
                Err(failure) => {
                    log::warn!(
                        "Generation attempt {}/{} failed after {} ms: {}",
                        attempt,
                        max_attempts,
                        elapsed.as_millis(),
                        failure
                    );
                    last_failure = failure;
                }
            }
        }

        Err(GenerationError::Failed {
            attempts: max_attempts,
            last_failure,
        })
    }

    async fn attempt(
        &self,
        prompt: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, AttemptFailure> {
        let call = self.model.complete(prompt);
        let response = match self.settings.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AttemptFailure::TimedOut)?,
            None => call.await,
        }
        .map_err(|e| AttemptFailure::Model(e.to_string()))?;

        if response.content.trim().is_empty() {
            return Err(AttemptFailure::EmptyResponse);
        }

        let cleaned = clean_response(&response.content);
        let json = match &cleaned {
            CleaningResult::Unchanged(json) => json,
            CleaningResult::Repaired { json, steps } => {
                log::debug!("Repaired model output with {:?}", steps);
                json
            }
            CleaningResult::Failed(reason) => {
                log::debug!("Cleaning model output failed: {:?}", reason);
                return Err(AttemptFailure::Unparseable);
            }
        };

        let parsed = parse_questions(
            json,
            &ParseOptions {
                num_options: request.num_options,
                max_options: self.settings.max_options,
                point_value: self.settings.points_per_question,
                option_count_policy: self.settings.option_count_policy,
            },
        );
        if parsed.skipped > 0 {
            log::debug!("Skipped {} malformed question elements", parsed.skipped);
        }

        let questions: Vec<Question> = parsed.questions;
        if questions.is_empty() {
            return Err(AttemptFailure::NoQuestions);
        }

        let estimated_cost_usd = self
            .settings
            .pricing
            .and_then(|p| p.estimate(response.input_tokens, response.output_tokens));

        Ok(GenerationResult {
            questions,
            model_id: response.model_id,
            response_time_ms: 0,
            attempts: 0,
            input_token_count: response.input_tokens,
            output_token_count: response.output_tokens,
            estimated_cost_usd,
        })
    }
}

use std::{sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{QuestionAnswer, Quiz, QuizAttempt},
        dto::{
            request::{GenerateQuizRequest, SubmitAnswersRequest},
            response::{QuizDto, SubmissionResponse},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository},
    services::{
        progress_service::ProgressService,
        question_synthesis::{GenerationRequest, QuestionSynthesisEngine},
        reference_text_service::ReferenceTextSource,
        scoring,
        text_sampler::{SampledContent, TextSampler},
    },
};

pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    progress: Arc<ProgressService>,
    reference_source: Arc<dyn ReferenceTextSource>,
    engine: Arc<QuestionSynthesisEngine>,
    sampler: TextSampler,
    default_sample_length: usize,
    generation_timeout: Duration,
}

pub struct QuizServiceDeps {
    pub quizzes: Arc<dyn QuizRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
    pub progress: Arc<ProgressService>,
    pub reference_source: Arc<dyn ReferenceTextSource>,
    pub engine: Arc<QuestionSynthesisEngine>,
}

impl QuizService {
    pub fn new(
        deps: QuizServiceDeps,
        sampler: TextSampler,
        default_sample_length: usize,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            quizzes: deps.quizzes,
            attempts: deps.attempts,
            progress: deps.progress,
            reference_source: deps.reference_source,
            engine: deps.engine,
            sampler,
            default_sample_length,
            generation_timeout,
        }
    }

    /// Fetches, samples and synthesizes a quiz for a topic, then stores it.
    pub async fn generate_quiz(&self, request: GenerateQuizRequest) -> AppResult<QuizDto> {
        request.validate()?;

        let reference = self
            .reference_source
            .fetch(&request.topic, &request.language)
            .await?;

        let requested_length = request.sample_length.unwrap_or(self.default_sample_length);
        let sampled = self.sample(&reference.extract, requested_length);
        log::info!(
            "Sampled {} of {} chars from '{}' in {} windows",
            sampled.char_len(),
            reference.length,
            reference.title,
            sampled.windows.len()
        );

        let generation_request = GenerationRequest {
            content: sampled.text,
            language: request.language.clone(),
            num_questions: request.question_count,
            num_options: request.option_count,
        };

        let result = tokio::time::timeout(
            self.generation_timeout,
            self.engine.generate(&generation_request),
        )
        .await
        .map_err(|_| {
            AppError::GenerationFailed(format!(
                "timed out after {} s",
                self.generation_timeout.as_secs()
            ))
        })??;

        let quiz = Quiz::from_generation(
            &request.user_id,
            &reference.title,
            &request.language,
            generation_request.content.chars().count(),
            result,
        );
        let quiz = self.quizzes.create(quiz).await?;

        log::info!(
            "Created quiz {} with {} questions for user {}",
            quiz.id,
            quiz.questions.len(),
            quiz.user_id
        );
        Ok(QuizDto::from(quiz))
    }

    // ThreadRng is not Send, so it must not live across an await.
    fn sample(&self, extract: &str, requested_length: usize) -> SampledContent {
        let mut rng = rand::thread_rng();
        self.sampler.sample(extract, requested_length, &mut rng)
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<QuizDto> {
        let quiz = self.find_quiz(id).await?;
        Ok(QuizDto::from(quiz))
    }

    async fn find_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    /// Grades a submission, stores the attempt and adds the points earned.
    pub async fn submit_answers(
        &self,
        quiz_id: &str,
        request: SubmitAnswersRequest,
    ) -> AppResult<SubmissionResponse> {
        request.validate()?;

        let quiz = self.find_quiz(quiz_id).await?;
        let answers: Vec<QuestionAnswer> =
            request.answers.into_iter().map(QuestionAnswer::from).collect();

        let result = scoring::score(&quiz.questions, &answers);
        let attempt = self
            .attempts
            .create(QuizAttempt::from_result(&request.user_id, &quiz.id, &result))
            .await?;

        let progress = self
            .progress
            .record_points(&request.user_id, result.points_earned)
            .await?;

        log::info!(
            "User {} scored {} on quiz {} (+{} points)",
            request.user_id,
            result.score,
            quiz.id,
            result.points_earned
        );

        Ok(SubmissionResponse::new(attempt.id, result, progress))
    }

    pub async fn recent_attempts(&self, user_id: &str, limit: i64) -> AppResult<Vec<QuizAttempt>> {
        self.attempts.find_by_user(user_id, limit.clamp(1, 100)).await
    }
}

use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoQuizAttemptRepository, MongoQuizRepository, MongoUserProgressRepository},
    services::{
        model_service::OpenAiCompletionModel,
        progress_service::ProgressService,
        prompt_templates::PromptTemplates,
        question_synthesis::QuestionSynthesisEngine,
        quiz_service::{QuizService, QuizServiceDeps},
        reference_text_service::WikipediaClient,
        text_sampler::TextSampler,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub progress_service: Arc<ProgressService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoQuizAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let progress_repository = Arc::new(MongoUserProgressRepository::new(&db));
        progress_repository.ensure_indexes().await?;
        let progress_service = Arc::new(ProgressService::new(progress_repository));

        let engine = Arc::new(QuestionSynthesisEngine::new(
            Arc::new(OpenAiCompletionModel::new(&config)),
            PromptTemplates::new(config.prompt_templates_dir.clone()),
            config.generation_settings(),
        ));

        let quiz_service = Arc::new(QuizService::new(
            QuizServiceDeps {
                quizzes: quiz_repository,
                attempts: attempt_repository,
                progress: progress_service.clone(),
                reference_source: Arc::new(WikipediaClient::new(&config)),
                engine,
            },
            TextSampler::new(config.sampler_settings()),
            config.default_sample_length,
            config.generation_timeout(),
        ));

        Ok(Self::from_services(quiz_service, progress_service, config))
    }

    pub fn from_services(
        quiz_service: Arc<QuizService>,
        progress_service: Arc<ProgressService>,
        config: Config,
    ) -> Self {
        Self {
            quiz_service,
            progress_service,
            config: Arc::new(config),
        }
    }
}

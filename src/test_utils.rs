#[cfg(test)]
pub mod fixtures {
    use crate::models::domain::Question;

    /// Four well-formed questions as a model would return them.
    pub const VALID_MODEL_OUTPUT: &str = r#"```json
[
  {"Text": "Who designed Rust?", "Options": ["Graydon Hoare", "Guido van Rossum", "Bjarne Stroustrup", "Rob Pike"], "CorrectAnswerIndex": 0},
  {"Text": "What manages memory in Rust?", "Options": ["A garbage collector", "Ownership", "Reference counting only", "Manual free calls"], "CorrectAnswerIndex": 1},
  {"Text": "Which keyword declares a mutable binding?", "Options": ["var", "let mut", "mut let", "mutable"], "CorrectAnswerIndex": 1},
  {"Text": "What does Cargo do?", "Options": ["Formats code", "Lints code", "Builds and manages packages", "Runs a REPL"], "CorrectAnswerIndex": 2}
]
```"#;

    /// ASCII text of exactly `len` chars built from repeating sentences.
    pub fn long_article(len: usize) -> String {
        "Rust is a general-purpose programming language emphasizing performance and safety. "
            .chars()
            .cycle()
            .take(len)
            .collect()
    }

    pub fn sample_questions() -> Vec<Question> {
        vec![
            Question::new("Q1", vec!["a".into(), "b".into(), "c".into()], 1, 1000).unwrap(),
            Question::new("Q2", vec!["a".into(), "b".into(), "c".into()], 2, 1000).unwrap(),
            Question::new("Q3", vec!["a".into(), "b".into(), "c".into()], 3, 1000).unwrap(),
        ]
    }
}

#[cfg(test)]
pub mod repositories {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use crate::{
        errors::{AppError, AppResult},
        models::domain::{QuizAttempt, Quiz, ReferenceText, UserProgress},
        repositories::{QuizAttemptRepository, QuizRepository, UserProgressRepository},
        services::reference_text_service::ReferenceTextSource,
    };

    #[derive(Default)]
    pub struct InMemoryQuizRepository {
        quizzes: RwLock<HashMap<String, Quiz>>,
    }

    #[async_trait]
    impl QuizRepository for InMemoryQuizRepository {
        async fn create(&self, quiz: Quiz) -> AppResult<Quiz> {
            let mut quizzes = self.quizzes.write().await;
            if quizzes.contains_key(&quiz.id) {
                return Err(AppError::AlreadyExists(format!(
                    "Quiz with id '{}' already exists",
                    quiz.id
                )));
            }
            quizzes.insert(quiz.id.clone(), quiz.clone());
            Ok(quiz)
        }

        async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
            Ok(self.quizzes.read().await.get(id).cloned())
        }
    }

    #[derive(Default)]
    pub struct InMemoryQuizAttemptRepository {
        attempts: RwLock<Vec<QuizAttempt>>,
    }

    #[async_trait]
    impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
        async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
            self.attempts.write().await.push(attempt.clone());
            Ok(attempt)
        }

        async fn find_by_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<QuizAttempt>> {
            let attempts = self.attempts.read().await;
            Ok(attempts
                .iter()
                .rev()
                .filter(|a| a.user_id == user_id)
                .take(usize::try_from(limit).unwrap_or(0))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub struct InMemoryUserProgressRepository {
        progress: RwLock<HashMap<String, UserProgress>>,
    }

    #[async_trait]
    impl UserProgressRepository for InMemoryUserProgressRepository {
        async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
            Ok(self.progress.read().await.get(user_id).cloned())
        }

        async fn upsert(&self, progress: UserProgress) -> AppResult<UserProgress> {
            self.progress
                .write()
                .await
                .insert(progress.user_id.clone(), progress.clone());
            Ok(progress)
        }

        async fn add_points(&self, user_id: &str, points_earned: u64) -> AppResult<UserProgress> {
            let mut all = self.progress.write().await;
            let progress = all
                .entry(user_id.to_string())
                .or_insert_with(|| UserProgress::new(user_id));
            progress.record_submission(points_earned);
            Ok(progress.clone())
        }
    }

    /// Returns the same article for every topic.
    pub struct StaticReferenceSource {
        extract: String,
    }

    impl StaticReferenceSource {
        pub fn new(extract: &str) -> Self {
            Self {
                extract: extract.to_string(),
            }
        }
    }

    #[async_trait]
    impl ReferenceTextSource for StaticReferenceSource {
        async fn fetch(&self, topic: &str, language: &str) -> AppResult<ReferenceText> {
            Ok(ReferenceText::new(topic, self.extract.clone(), language))
        }
    }
}

#[cfg(test)]
pub mod state {
    use std::sync::Arc;

    use super::{
        fixtures::long_article,
        repositories::{
            InMemoryQuizAttemptRepository, InMemoryQuizRepository, InMemoryUserProgressRepository,
            StaticReferenceSource,
        },
    };
    use crate::{
        app_state::AppState,
        config::Config,
        services::{
            model_service::MockCompletionModel,
            progress_service::ProgressService,
            prompt_templates::PromptTemplates,
            question_synthesis::QuestionSynthesisEngine,
            quiz_service::{QuizService, QuizServiceDeps},
            text_sampler::TextSampler,
        },
    };

    /// App state over in-memory storage, a 20k-char article and `model`.
    pub fn app_state(model: MockCompletionModel) -> AppState {
        let config = Config::test_config();
        let progress_service = Arc::new(ProgressService::new(Arc::new(
            InMemoryUserProgressRepository::default(),
        )));
        let engine = Arc::new(QuestionSynthesisEngine::new(
            Arc::new(model),
            PromptTemplates::embedded_only(),
            config.generation_settings(),
        ));

        let quiz_service = Arc::new(QuizService::new(
            QuizServiceDeps {
                quizzes: Arc::new(InMemoryQuizRepository::default()),
                attempts: Arc::new(InMemoryQuizAttemptRepository::default()),
                progress: progress_service.clone(),
                reference_source: Arc::new(StaticReferenceSource::new(&long_article(20_000))),
                engine,
            },
            TextSampler::new(config.sampler_settings()),
            config.default_sample_length,
            config.generation_timeout(),
        ));

        AppState::from_services(quiz_service, progress_service, config)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_long_article_has_requested_length() {
        assert_eq!(long_article(12_345).chars().count(), 12_345);
        assert!(long_article(100).is_ascii());
    }

    #[test]
    fn test_sample_questions_cover_each_option() {
        let questions = sample_questions();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[2].correct_option(), Some("c"));
    }
}

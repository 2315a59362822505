pub mod quiz_attempt_repository;
pub mod quiz_repository;
pub mod user_progress_repository;

pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use user_progress_repository::{MongoUserProgressRepository, UserProgressRepository};

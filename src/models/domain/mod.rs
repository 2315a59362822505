pub mod question;
pub mod quiz;
pub mod reference_text;
pub mod submission;
pub mod user_progress;
pub use question::Question;
pub use quiz::{GenerationResult, Quiz};
pub use reference_text::ReferenceText;
pub use submission::{QuestionAnswer, QuizAttempt, SubmissionResult};
pub use user_progress::UserProgress;

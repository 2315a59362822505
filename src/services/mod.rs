pub mod leveling;
pub mod model_service;
pub mod progress_service;
pub mod prompt_templates;
pub mod question_parser;
pub mod question_synthesis;
pub mod quiz_service;
pub mod reference_text_service;
pub mod response_cleaner;
pub mod scoring;
pub mod text_sampler;

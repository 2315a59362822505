pub mod progress_handler;
pub mod quiz_handler;

use actix_web::web;

pub use progress_handler::{get_attempts, get_progress, health_check};
pub use quiz_handler::{generate_quiz, get_quiz, submit_answers};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(generate_quiz)
        .service(get_quiz)
        .service(submit_answers)
        .service(get_progress)
        .service(get_attempts);
}

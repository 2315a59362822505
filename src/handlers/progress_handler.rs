use std::sync::Arc;

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::{app_state::AppState, errors::AppError};

const DEFAULT_ATTEMPT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct AttemptQuery {
    pub limit: Option<i64>,
}

#[get("/api/users/{user_id}/progress")]
async fn get_progress(
    state: web::Data<Arc<AppState>>,
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let progress = state.progress_service.get_progress(&user_id).await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[get("/api/users/{user_id}/attempts")]
async fn get_attempts(
    state: web::Data<Arc<AppState>>,
    user_id: web::Path<String>,
    query: web::Query<AttemptQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ATTEMPT_LIMIT);
    let attempts = state.quiz_service.recent_attempts(&user_id, limit).await?;
    Ok(HttpResponse::Ok().json(attempts))
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

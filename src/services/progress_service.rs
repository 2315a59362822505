use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{domain::UserProgress, dto::response::UserProgressDto},
    repositories::UserProgressRepository,
    services::leveling::{LevelProgress, LevelingCurve},
};

pub struct ProgressService {
    repository: Arc<dyn UserProgressRepository>,
    curve: LevelingCurve,
}

impl ProgressService {
    pub fn new(repository: Arc<dyn UserProgressRepository>) -> Self {
        Self {
            repository,
            curve: LevelingCurve::default(),
        }
    }

    /// Unknown users are reported at zero points.
    pub async fn get_progress(&self, user_id: &str) -> AppResult<UserProgressDto> {
        validate_user_id(user_id)?;

        let progress = self
            .repository
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| UserProgress::new(user_id));

        Ok(UserProgressDto {
            user_id: progress.user_id,
            quizzes_completed: progress.quizzes_completed,
            progress: self.curve.progress(progress.total_points),
        })
    }

    /// Adds one graded submission to the user's totals in a single
    /// repository write, so concurrent submissions all count.
    pub async fn record_points(&self, user_id: &str, points_earned: u64) -> AppResult<LevelProgress> {
        validate_user_id(user_id)?;

        let progress = self.repository.add_points(user_id, points_earned).await?;

        let previous_level = self
            .curve
            .level_for_points(progress.total_points.saturating_sub(points_earned));
        if progress.level > previous_level {
            log::info!(
                "User {} reached level {} with {} points",
                user_id,
                progress.level,
                progress.total_points
            );
        }

        Ok(self.curve.progress(progress.total_points))
    }
}

fn validate_user_id(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "User id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::repositories::InMemoryUserProgressRepository;

    fn service() -> ProgressService {
        ProgressService::new(Arc::new(InMemoryUserProgressRepository::default()))
    }

    #[tokio::test]
    async fn unknown_user_starts_at_level_one() {
        let progress = service().get_progress("new-user").await.unwrap();
        assert_eq!(progress.progress.level, 1);
        assert_eq!(progress.progress.total_points, 0);
        assert_eq!(progress.progress.points_to_next_level, 5000);
        assert_eq!(progress.quizzes_completed, 0);
    }

    #[tokio::test]
    async fn recorded_points_accumulate_across_submissions() {
        let service = service();

        let first = service.record_points("user-1", 3000).await.unwrap();
        assert_eq!(first.level, 1);

        let second = service.record_points("user-1", 4000).await.unwrap();
        assert_eq!(second.total_points, 7000);
        assert_eq!(second.level, 2);

        let stored = service.get_progress("user-1").await.unwrap();
        assert_eq!(stored.progress.total_points, 7000);
        assert_eq!(stored.quizzes_completed, 2);
    }

    /// Yields before every call so concurrent callers interleave.
    struct InterleavingRepository(InMemoryUserProgressRepository);

    #[async_trait::async_trait]
    impl UserProgressRepository for InterleavingRepository {
        async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
            tokio::task::yield_now().await;
            self.0.find_by_user(user_id).await
        }

        async fn upsert(&self, progress: UserProgress) -> AppResult<UserProgress> {
            tokio::task::yield_now().await;
            self.0.upsert(progress).await
        }

        async fn add_points(&self, user_id: &str, points_earned: u64) -> AppResult<UserProgress> {
            tokio::task::yield_now().await;
            self.0.add_points(user_id, points_earned).await
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_all_count() {
        let service = ProgressService::new(Arc::new(InterleavingRepository(
            InMemoryUserProgressRepository::default(),
        )));

        let (first, second) = tokio::join!(
            service.record_points("u", 3000),
            service.record_points("u", 3000)
        );
        first.unwrap();
        second.unwrap();

        let stored = service.get_progress("u").await.unwrap();
        assert_eq!(stored.progress.total_points, 6000);
        assert_eq!(stored.progress.level, 2);
        assert_eq!(stored.quizzes_completed, 2);
    }

    #[tokio::test]
    async fn blank_user_id_is_rejected() {
        assert!(matches!(
            service().record_points(" ", 10).await,
            Err(AppError::ValidationError(_))
        ));
    }
}

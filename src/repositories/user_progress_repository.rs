use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, IndexOptions, ReplaceOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{user_progress::MAX_TOTAL_POINTS, UserProgress},
    services::leveling::level_for_points,
};

#[async_trait]
pub trait UserProgressRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>>;
    async fn upsert(&self, progress: UserProgress) -> AppResult<UserProgress>;
    /// Atomically adds one submission's points, creating the record if needed.
    async fn add_points(&self, user_id: &str, points_earned: u64) -> AppResult<UserProgress>;
}

pub struct MongoUserProgressRepository {
    collection: Collection<UserProgress>,
}

impl MongoUserProgressRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("user_progress");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let options = IndexOptions::builder().unique(true).build();
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(options)
            .build();

        self.collection.create_index(model).await?;
        log::info!("Created unique index on user_progress.user_id");

        Ok(())
    }
}

#[async_trait]
impl UserProgressRepository for MongoUserProgressRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<UserProgress>> {
        let progress = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await?;
        Ok(progress)
    }

    async fn upsert(&self, progress: UserProgress) -> AppResult<UserProgress> {
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "user_id": &progress.user_id }, &progress)
            .with_options(options)
            .await?;

        Ok(progress)
    }

    async fn add_points(&self, user_id: &str, points_earned: u64) -> AppResult<UserProgress> {
        let max_total = MAX_TOTAL_POINTS as i64;
        let points = i64::try_from(points_earned).unwrap_or(max_total);

        // Pipeline update so the capped increment happens inside one document write.
        let update = vec![doc! {
            "$set": {
                "user_id": user_id,
                "total_points": {
                    "$min": [
                        { "$add": [{ "$ifNull": ["$total_points", 0_i64] }, points] },
                        max_total
                    ]
                },
                "level": { "$ifNull": ["$level", 1] },
                "quizzes_completed": {
                    "$add": [{ "$ifNull": ["$quizzes_completed", 0] }, 1]
                },
                "updated_at": Utc::now().to_rfc3339(),
            }
        }];
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let mut progress = self
            .collection
            .find_one_and_update(doc! { "user_id": user_id }, update)
            .with_options(options)
            .await?
            .ok_or_else(|| {
                AppError::DatabaseError(format!("Upsert returned no progress for '{}'", user_id))
            })?;

        let level = level_for_points(progress.total_points);
        if level != progress.level {
            // $max keeps a concurrent writer's higher level.
            self.collection
                .update_one(
                    doc! { "user_id": user_id },
                    doc! { "$max": { "level": i64::from(level) } },
                )
                .await?;
            progress.level = level;
        }

        Ok(progress)
    }
}

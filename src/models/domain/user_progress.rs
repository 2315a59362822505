use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::leveling::level_for_points;

/// Largest total that still fits a BSON 64-bit integer.
pub const MAX_TOTAL_POINTS: u64 = i64::MAX as u64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProgress {
    pub user_id: String,
    pub total_points: u64,
    pub level: u32, // always level_for_points(total_points)
    pub quizzes_completed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProgress {
    pub fn new(user_id: &str) -> Self {
        UserProgress {
            user_id: user_id.to_string(),
            total_points: 0,
            level: 1,
            quizzes_completed: 0,
            updated_at: None,
        }
    }

    /// Adds a submission's points. Totals never decrease and stop at
    /// `MAX_TOTAL_POINTS`.
    pub fn record_submission(&mut self, points_earned: u64) {
        self.total_points = self
            .total_points
            .saturating_add(points_earned)
            .min(MAX_TOTAL_POINTS);
        self.level = level_for_points(self.total_points);
        self.quizzes_completed = self.quizzes_completed.saturating_add(1);
        self.updated_at = Some(Utc::now());
    }
}

//! Points to level mapping on a geometric progression.
//!
//! Reaching level 2 costs `BASE_POINTS_PER_LEVEL`; every later level costs
//! `LEVEL_MULTIPLIER` times the previous increment.

use serde::Serialize;

pub const BASE_POINTS_PER_LEVEL: u64 = 5000;
pub const LEVEL_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelingCurve {
    pub base_points: u64,
    pub multiplier: f64,
}

impl Default for LevelingCurve {
    fn default() -> Self {
        Self {
            base_points: BASE_POINTS_PER_LEVEL,
            multiplier: LEVEL_MULTIPLIER,
        }
    }
}

/// Where a points total sits on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub level: u32,
    pub total_points: u64,
    /// Cumulative points at which the current level was reached.
    pub current_level_points: u64,
    /// Cumulative points needed for the next level.
    pub next_level_points: u64,
    pub points_to_next_level: u64,
}

impl LevelingCurve {
    /// Increment needed to go from `level - 1` to `level`. Saturates at `u64::MAX`.
    pub fn points_required_for_level(&self, level: u32) -> u64 {
        if level <= 1 {
            return 0;
        }

        let exponent = i32::try_from(level - 2).unwrap_or(i32::MAX);
        let required = (self.base_points as f64 * self.multiplier.powi(exponent)).floor();
        if !required.is_finite() || required >= u64::MAX as f64 {
            u64::MAX
        } else {
            required as u64
        }
    }

    /// Cumulative points needed to stand at `level`.
    pub fn cumulative_points_for_level(&self, level: u32) -> u64 {
        (2..=level).fold(0u64, |total, l| {
            total.saturating_add(self.points_required_for_level(l))
        })
    }

    pub fn level_for_points(&self, total_points: u64) -> u32 {
        let mut level = 1u32;
        let mut cumulative = 0u64;

        loop {
            let next = level.saturating_add(1);
            let required = self.points_required_for_level(next);
            match cumulative.checked_add(required) {
                Some(needed) if needed <= total_points && next > level && required > 0 => {
                    cumulative = needed;
                    level = next;
                }
                _ => return level,
            }
        }
    }

    pub fn progress(&self, total_points: u64) -> LevelProgress {
        let level = self.level_for_points(total_points);
        let current_level_points = self.cumulative_points_for_level(level);
        let next_level_points = current_level_points
            .saturating_add(self.points_required_for_level(level.saturating_add(1)));

        LevelProgress {
            level,
            total_points,
            current_level_points,
            next_level_points,
            points_to_next_level: next_level_points.saturating_sub(total_points),
        }
    }
}

pub fn points_required_for_level(level: u32) -> u64 {
    LevelingCurve::default().points_required_for_level(level)
}

pub fn level_for_points(total_points: u64) -> u32 {
    LevelingCurve::default().level_for_points(total_points)
}

pub fn level_progress(total_points: u64) -> LevelProgress {
    LevelingCurve::default().progress(total_points)
}

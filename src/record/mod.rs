//! Performance Record
//!
//! The scored state of one directional cue→answer relationship.
//!
//! State model:
//! - `FirstTime`: never answered, no due date
//! - `Scored { score, due_date }`: answered at least once
//!
//! Feedback:
//! - correct   -> score + 1, due date pushed out by `base ^ score` seconds
//! - incorrect -> score 0, due immediately
//! - skipped   -> unchanged
//! - reset     -> back to `FirstTime`

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_SPACING_BASE, MAX_INTERVAL_SECONDS, MAX_SPACING_EXPONENT};

// ==================== Spacing ====================

/// Increasing-interval spacing function applied on correct answers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewSpacing {
    /// Interval in seconds is `growth_base ^ score`
    pub growth_base: f64,
    /// Exponent cap keeping the interval representable
    pub max_exponent: u32,
}

impl Default for ReviewSpacing {
    fn default() -> Self {
        Self {
            growth_base: DEFAULT_SPACING_BASE,
            max_exponent: MAX_SPACING_EXPONENT,
        }
    }
}

impl ReviewSpacing {
    /// Review interval for a record that just reached `score`
    pub fn interval_for(&self, score: u32) -> Duration {
        let base = if self.growth_base.is_finite() && self.growth_base > 1.0 {
            self.growth_base
        } else {
            DEFAULT_SPACING_BASE
        };
        let exponent = score.min(self.max_exponent.min(MAX_SPACING_EXPONENT));
        let seconds = base.powi(exponent as i32).min(MAX_INTERVAL_SECONDS);
        Duration::milliseconds((seconds * 1000.0).round() as i64)
    }
}

// ==================== Record ====================

/// Scored relationship between a cue and its expected answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PerformanceRecord {
    #[default]
    FirstTime,
    Scored {
        score: u32,
        due_date: DateTime<Utc>,
    },
}

impl PerformanceRecord {
    pub fn new() -> Self {
        Self::FirstTime
    }

    pub fn scored(score: u32, due_date: DateTime<Utc>) -> Self {
        Self::Scored { score, due_date }
    }

    pub fn is_first_time(&self) -> bool {
        matches!(self, Self::FirstTime)
    }

    /// Current score; 0 for a record that was never answered
    pub fn score(&self) -> u32 {
        match self {
            Self::FirstTime => 0,
            Self::Scored { score, .. } => *score,
        }
    }

    /// Score used for minimum-score filtering; never-answered records rank at -1
    pub fn ranking_score(&self) -> i32 {
        match self {
            Self::FirstTime => -1,
            Self::Scored { score, .. } => i32::try_from(*score).unwrap_or(i32::MAX),
        }
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::FirstTime => None,
            Self::Scored { due_date, .. } => Some(*due_date),
        }
    }

    /// First-time records are always due
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::FirstTime => true,
            Self::Scored { due_date, .. } => *due_date <= now,
        }
    }

    // ==================== Feedback ====================

    pub fn correct(&mut self) {
        self.correct_at(Utc::now(), &ReviewSpacing::default());
    }

    /// Strengthen the record; the due date never moves backwards
    pub fn correct_at(&mut self, now: DateTime<Utc>, spacing: &ReviewSpacing) {
        let score = self.score().saturating_add(1);
        let next_due = now + spacing.interval_for(score);
        let due_date = match self.due_date() {
            Some(previous) if previous > next_due => previous,
            _ => next_due,
        };
        *self = Self::Scored { score, due_date };
    }

    pub fn incorrect(&mut self) {
        self.incorrect_at(Utc::now());
    }

    /// Demote to score 0, due right away
    pub fn incorrect_at(&mut self, now: DateTime<Utc>) {
        *self = Self::Scored {
            score: 0,
            due_date: now,
        };
    }

    /// Skipping is a scheduling signal only
    pub fn skipped(&mut self) {}

    pub fn reset(&mut self) {
        *self = Self::FirstTime;
    }
}

//! Selection Policy
//!
//! Pure configuration for one selection pass: how many records to draw, which
//! records are retired by score, and where the selection probability is
//! centered on the score axis.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};
use crate::types::{DEFAULT_QUIZ_NUM_ITEMS, MAX_PROBABILITY_CENTER, REVIEW_LEARN_SCALE};

/// Where a wrong or skipped record re-enters the session queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequeuePosition {
    /// Append at the back of the queue
    #[default]
    Back,
    /// Insert after `n` waiting records (clamped to the queue length)
    Offset(usize),
    /// Insert at a uniformly random position
    Random,
}

/// Document quiz actions, each mapping to a policy preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// Mix new and known records around the configured center
    AutoPick,
    /// Only records answered before
    Review,
    /// Every record the caller hand-picked
    Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub target_count: usize,
    pub minimum_score: i32,
    pub probability_center: f64,
    /// Overdue records are weighted as if they sat at the center
    #[serde(default = "default_favor_overdue")]
    pub favor_overdue: bool,
    #[serde(default)]
    pub requeue: RequeuePosition,
}

fn default_favor_overdue() -> bool {
    true
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_QUIZ_NUM_ITEMS,
            minimum_score: -1,
            probability_center: center_from_review_learn(50.0),
            favor_overdue: true,
            requeue: RequeuePosition::Back,
        }
    }
}

impl SelectionPolicy {
    pub fn new(target_count: usize, minimum_score: i32, probability_center: f64) -> Self {
        Self {
            target_count,
            minimum_score,
            probability_center,
            ..Self::default()
        }
    }

    /// Constructor for callers holding a signed count
    pub fn from_signed_count(
        target_count: i64,
        minimum_score: i32,
        probability_center: f64,
    ) -> Result<Self> {
        let count = usize::try_from(target_count).map_err(|_| {
            SchedulerError::InvalidPolicy(format!("target count {target_count} is negative"))
        })?;
        let policy = Self::new(count, minimum_score, probability_center);
        policy.validate()?;
        Ok(policy)
    }

    /// Preset for a quiz mode; `Selection` takes every record of `pool_len`
    pub fn for_mode(mode: QuizMode, target_count: usize, probability_center: f64, pool_len: usize) -> Self {
        match mode {
            QuizMode::AutoPick => Self::new(target_count, -1, probability_center),
            QuizMode::Review => Self::new(target_count, 0, probability_center),
            QuizMode::Selection => Self::new(pool_len, -1, probability_center),
        }
    }

    pub fn with_requeue(mut self, requeue: RequeuePosition) -> Self {
        self.requeue = requeue;
        self
    }

    pub fn with_favor_overdue(mut self, favor_overdue: bool) -> Self {
        self.favor_overdue = favor_overdue;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let c = self.probability_center;
        if !c.is_finite() {
            return Err(SchedulerError::InvalidPolicy(format!(
                "probability center {c} is not finite"
            )));
        }
        if !(0.0..=MAX_PROBABILITY_CENTER).contains(&c) {
            return Err(SchedulerError::InvalidPolicy(format!(
                "probability center {c} outside 0..={MAX_PROBABILITY_CENTER}"
            )));
        }
        Ok(())
    }
}

/// Map the review/learn slider (0 = learn new, 100 = review strong) to a center
pub fn center_from_review_learn(percent: f64) -> f64 {
    if !percent.is_finite() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0) / 100.0 * REVIEW_LEARN_SCALE
}

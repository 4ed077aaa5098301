//! Common Types and Constants
//!
//! Shared identifiers and tuning constants used across the scheduler modules.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==================== Constants ====================

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

/// Smallest selection weight a surviving candidate can carry
pub const MIN_WEIGHT: f64 = 1e-3;

/// Decay steepness of the weight curve above the probability center
pub const WEIGHT_DECAY: f64 = 3.0;

/// Upper bound for a sane probability center
pub const MAX_PROBABILITY_CENTER: f64 = 100.0;

/// Center reached when the review/learn slider sits at 100%
pub const REVIEW_LEARN_SCALE: f64 = 10.0;

/// Growth base of the review interval (seconds = base ^ score)
pub const DEFAULT_SPACING_BASE: f64 = 5.0;

/// Cap on the interval exponent; 5^15 seconds is roughly 970 years
pub const MAX_SPACING_EXPONENT: u32 = 15;

/// Longest interval handed out regardless of base (1000 years)
pub const MAX_INTERVAL_SECONDS: f64 = 1000.0 * 365.0 * 24.0 * 3600.0;

/// Candidate count above which weights are computed on the rayon pool
pub const PARALLEL_WEIGHT_THRESHOLD: usize = 4096;

/// Default number of records per quiz
pub const DEFAULT_QUIZ_NUM_ITEMS: usize = 10;

// ==================== Importance ====================

/// Importance of a disabled pair; such pairs never enter a pool
pub const IMPORTANCE_DISABLED: i8 = -1;
pub const IMPORTANCE_MINIMUM: i8 = 0;
pub const IMPORTANCE_NORMAL: i8 = 5;
pub const IMPORTANCE_MAXIMUM: i8 = 10;

// ==================== Identity ====================

/// Which side of a pair acts as the cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Front to back (standard learning mode)
    AB,
    /// Back to front (reverse, "jeopardy" style)
    BA,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::AB => f.write_str("ab"),
            Direction::BA => f.write_str("ba"),
        }
    }
}

/// Identity of one directional record: the owning pair plus its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId {
    pub pair: Uuid,
    pub direction: Direction,
}

impl RecordId {
    pub fn new(pair: Uuid, direction: Direction) -> Self {
        Self { pair, direction }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pair, self.direction)
    }
}

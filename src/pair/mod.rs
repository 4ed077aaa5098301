//! Study Pair
//!
//! A two-sided card. Each side can act as the cue for the other, and each
//! direction keeps its own independent performance record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::PerformanceRecord;
use crate::types::{Direction, RecordId, IMPORTANCE_DISABLED, IMPORTANCE_MAXIMUM, IMPORTANCE_NORMAL};

/// Which directions of each pair take part in a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directions {
    pub ab: bool,
    pub ba: bool,
}

impl Directions {
    pub const AB_ONLY: Self = Self { ab: true, ba: false };
    pub const BA_ONLY: Self = Self { ab: false, ba: true };
    pub const BOTH: Self = Self { ab: true, ba: true };

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        [(self.ab, Direction::AB), (self.ba, Direction::BA)]
            .into_iter()
            .filter_map(|(enabled, d)| enabled.then_some(d))
    }
}

impl Default for Directions {
    fn default() -> Self {
        Self::AB_ONLY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPair {
    pub id: Uuid,
    pub cue: String,
    pub answer: String,
    importance: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    ab: PerformanceRecord,
    #[serde(default)]
    ba: PerformanceRecord,
}

impl StudyPair {
    pub fn new(cue: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cue: cue.into(),
            answer: answer.into(),
            importance: IMPORTANCE_NORMAL,
            group: None,
            kind: None,
            notes: None,
            ab: PerformanceRecord::new(),
            ba: PerformanceRecord::new(),
        }
    }

    pub fn importance(&self) -> i8 {
        self.importance
    }

    /// Clamped to `-1..=10`; -1 disables the pair
    pub fn set_importance(&mut self, importance: i8) {
        self.importance = importance.clamp(IMPORTANCE_DISABLED, IMPORTANCE_MAXIMUM);
    }

    pub fn is_disabled(&self) -> bool {
        self.importance == IMPORTANCE_DISABLED
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.importance = if disabled {
            IMPORTANCE_DISABLED
        } else {
            IMPORTANCE_NORMAL
        };
    }

    pub fn record_id(&self, direction: Direction) -> RecordId {
        RecordId::new(self.id, direction)
    }

    pub fn record(&self, direction: Direction) -> &PerformanceRecord {
        match direction {
            Direction::AB => &self.ab,
            Direction::BA => &self.ba,
        }
    }

    pub fn record_mut(&mut self, direction: Direction) -> &mut PerformanceRecord {
        match direction {
            Direction::AB => &mut self.ab,
            Direction::BA => &mut self.ba,
        }
    }

    /// Cue and expected answer as seen from `direction`
    pub fn prompt(&self, direction: Direction) -> (&str, &str) {
        match direction {
            Direction::AB => (&self.cue, &self.answer),
            Direction::BA => (&self.answer, &self.cue),
        }
    }

    /// Reset both directions to first-time
    pub fn reset(&mut self) {
        self.ab.reset();
        self.ba.reset();
    }
}

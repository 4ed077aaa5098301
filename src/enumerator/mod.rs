//! Association Enumerator
//!
//! The stateful session scheduler.
//!
//! Core principles:
//! - Records below the minimum score are filtered out for the whole session
//! - Each survivor gets a weight from its distance above the probability center;
//!   records at or below the center, first-time records and (optionally) overdue
//!   records carry the full weight of 1.0, nobody drops below `MIN_WEIGHT`
//! - The session queue is a weighted draw without replacement, using
//!   exponential keys: key = ln(u) / w, highest keys first
//! - Wrong and skipped records re-enter the queue per `RequeuePosition`
//!
//! Session states:
//! - `Unselected`: accepts `perform_selection`
//! - `Active`: accepts `next_association` and feedback until `reset_selection`

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::policy::{RequeuePosition, SelectionPolicy};
use crate::pool::{RecordPool, RecordSource};
use crate::record::{PerformanceRecord, ReviewSpacing};
use crate::sanitize::{has_invalid_values, sanitize_weight, sanitize_weights, summarize_weights};
use crate::types::{RecordId, EPSILON, PARALLEL_WEIGHT_THRESHOLD, WEIGHT_DECAY};

// ==================== Weighting ====================

/// Selection weight of one record, in `[MIN_WEIGHT, 1]`
pub fn selection_weight(
    record: &PerformanceRecord,
    policy: &SelectionPolicy,
    maximum_score: u32,
    now: DateTime<Utc>,
) -> f64 {
    sanitize_weight(decay_weight(record, policy, maximum_score, now))
}

/// Unclamped weight curve
fn decay_weight(
    record: &PerformanceRecord,
    policy: &SelectionPolicy,
    maximum_score: u32,
    now: DateTime<Utc>,
) -> f64 {
    if record.is_first_time() {
        return 1.0;
    }
    if policy.favor_overdue && record.is_due_at(now) {
        return 1.0;
    }

    let center = policy.probability_center;
    let distance = record.score() as f64 - center;
    if distance <= 0.0 {
        return 1.0;
    }

    let spread = (maximum_score as f64 - center).max(1.0);
    (-WEIGHT_DECAY * distance / spread).exp()
}

/// Clamp a weight vector before the draw; returns how many entries were NaN or infinite
fn sanitize_selection_weights(weights: &mut [f64]) -> usize {
    let invalid = if has_invalid_values(weights) {
        weights.iter().filter(|w| !w.is_finite()).count()
    } else {
        0
    };
    if invalid > 0 {
        tracing::warn!(invalid, total = weights.len(), "Replacing invalid selection weights");
    }
    sanitize_weights(weights);
    invalid
}

/// Order of a weighted draw without replacement, truncated to `limit`
///
/// Each index gets the key ln(u) / w; sorting keys descending is equivalent to
/// drawing one index at a time proportionally to the remaining weights.
pub fn weighted_order<R: Rng>(weights: &[f64], limit: usize, rng: &mut R) -> Vec<usize> {
    let mut keyed: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let u: f64 = rng.gen::<f64>().max(EPSILON);
            (u.ln() / sanitize_weight(w), i)
        })
        .collect();

    keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    keyed.into_iter().take(limit).map(|(_, i)| i).collect()
}

// ==================== Session State ====================

/// A record handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub id: RecordId,
    pub record: PerformanceRecord,
}

impl Delivery {
    pub fn is_first_time(&self) -> bool {
        self.record.is_first_time()
    }
}

#[derive(Debug)]
struct ActiveSession {
    queue: VecDeque<RecordId>,
    outstanding: HashSet<RecordId>,
    requeue: RequeuePosition,
}

#[derive(Debug)]
enum SessionState {
    Unselected,
    Active(ActiveSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feedback {
    Right,
    Wrong,
    Skip,
}

// ==================== Enumerator ====================

#[derive(Debug)]
pub struct Enumerator<S: RecordSource = RecordPool> {
    source: S,
    state: SessionState,
    rng: ChaCha8Rng,
    spacing: ReviewSpacing,
    clock: fn() -> DateTime<Utc>,
}

impl<S: RecordSource> Enumerator<S> {
    /// Create an enumerator seeded from the system time
    pub fn new(source: S) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::with_seed(source, seed)
    }

    /// Create an enumerator with a fixed seed (reproducible sessions)
    pub fn with_seed(source: S, seed: u64) -> Self {
        Self {
            source,
            state: SessionState::Unselected,
            rng: ChaCha8Rng::seed_from_u64(seed),
            spacing: ReviewSpacing::default(),
            clock: Utc::now,
        }
    }

    /// Create an enumerator from host settings: the configured seed (or the
    /// system time) and the configured review spacing
    pub fn from_config(source: S, config: &SchedulerConfig) -> Self {
        let quiz = match config.seed {
            Some(seed) => Self::with_seed(source, seed),
            None => Self::new(source),
        };
        quiz.with_spacing(config.spacing())
    }

    pub fn with_spacing(mut self, spacing: ReviewSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the pool back, with all feedback applied
    pub fn into_source(self) -> S {
        self.source
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Records delivered but not yet answered
    pub fn outstanding_count(&self) -> usize {
        match &self.state {
            SessionState::Unselected => 0,
            SessionState::Active(active) => active.outstanding.len(),
        }
    }

    // ==================== Selection ====================

    /// Choose and order the session queue; returns its length
    pub fn perform_selection(&mut self, policy: &SelectionPolicy) -> Result<usize> {
        if self.is_active() {
            return Err(SchedulerError::SelectionAlreadyPerformed);
        }
        policy.validate()?;

        let now = (self.clock)();
        let candidates = self.source.candidates();
        let total = candidates.len();

        let filtered: Vec<(RecordId, PerformanceRecord)> = candidates
            .into_iter()
            .filter(|(_, record)| record.ranking_score() >= policy.minimum_score)
            .collect();

        let maximum_score = filtered
            .iter()
            .map(|(_, record)| record.score())
            .max()
            .unwrap_or(0);

        let weigh = |(_, record): &(RecordId, PerformanceRecord)| {
            decay_weight(record, policy, maximum_score, now)
        };
        let mut weights: Vec<f64> = if filtered.len() >= PARALLEL_WEIGHT_THRESHOLD {
            filtered.par_iter().map(weigh).collect()
        } else {
            filtered.iter().map(weigh).collect()
        };
        sanitize_selection_weights(&mut weights);

        let order = weighted_order(&weights, policy.target_count, &mut self.rng);
        let queue: VecDeque<RecordId> = order.into_iter().map(|i| filtered[i].0).collect();

        let summary = summarize_weights(&weights);
        tracing::info!(
            candidates = total,
            filtered = filtered.len(),
            selected = queue.len(),
            target = policy.target_count,
            maximum_score,
            mean_weight = summary.mean,
            "Quiz selection performed"
        );

        let selected = queue.len();
        self.state = SessionState::Active(ActiveSession {
            queue,
            outstanding: HashSet::new(),
            requeue: policy.requeue,
        });
        Ok(selected)
    }

    /// Drop the current session so a new selection can run
    pub fn reset_selection(&mut self) {
        if let SessionState::Active(active) = &self.state {
            tracing::debug!(
                remaining = active.queue.len(),
                outstanding = active.outstanding.len(),
                "Quiz session reset"
            );
        }
        self.state = SessionState::Unselected;
    }

    // ==================== Delivery ====================

    /// Queued records that are still present in the pool
    pub fn remaining_count(&self) -> usize {
        match &self.state {
            SessionState::Unselected => 0,
            SessionState::Active(active) => active
                .queue
                .iter()
                .filter(|id| self.source.contains(id))
                .count(),
        }
    }

    pub fn next_association(&mut self) -> Result<Delivery> {
        let active = match &mut self.state {
            SessionState::Unselected => return Err(SchedulerError::SelectionNotPerformed),
            SessionState::Active(active) => active,
        };

        while let Some(id) = active.queue.pop_front() {
            match self.source.get(&id) {
                Some(record) => {
                    active.outstanding.insert(id);
                    tracing::debug!(record = %id, score = record.score(), "Delivering record");
                    return Ok(Delivery { id, record });
                }
                None => {
                    tracing::warn!(record = %id, "Dropping queued record removed from pool");
                }
            }
        }

        Err(SchedulerError::ExhaustedQueue)
    }

    // ==================== Feedback ====================

    /// Correct answer: strengthen the record, it leaves the session
    pub fn association_right(&mut self, id: RecordId) -> Result<PerformanceRecord> {
        self.feedback(id, Feedback::Right)
    }

    /// Wrong answer: demote the record and queue it again
    pub fn association_wrong(&mut self, id: RecordId) -> Result<PerformanceRecord> {
        self.feedback(id, Feedback::Wrong)
    }

    /// Skip: leave the record untouched and queue it again
    pub fn association_skip(&mut self, id: RecordId) -> Result<PerformanceRecord> {
        self.feedback(id, Feedback::Skip)
    }

    fn feedback(&mut self, id: RecordId, feedback: Feedback) -> Result<PerformanceRecord> {
        let active = match &mut self.state {
            SessionState::Unselected => return Err(SchedulerError::UntrackedFeedback(id)),
            SessionState::Active(active) => active,
        };
        if !active.outstanding.remove(&id) {
            return Err(SchedulerError::UntrackedFeedback(id));
        }

        let now = (self.clock)();
        let spacing = self.spacing;
        let mut updated = None;
        self.source.update(&id, |record| {
            match feedback {
                Feedback::Right => record.correct_at(now, &spacing),
                Feedback::Wrong => record.incorrect_at(now),
                Feedback::Skip => record.skipped(),
            }
            updated = Some(*record);
        });

        let Some(record) = updated else {
            tracing::warn!(record = %id, ?feedback, "Feedback for record removed from pool");
            return Err(SchedulerError::StaleRecord(id));
        };

        if feedback != Feedback::Right {
            Self::requeue(active, id, &mut self.rng);
        }
        tracing::debug!(
            record = %id,
            ?feedback,
            score = record.score(),
            remaining = active.queue.len(),
            "Feedback applied"
        );
        Ok(record)
    }

    fn requeue(active: &mut ActiveSession, id: RecordId, rng: &mut ChaCha8Rng) {
        let len = active.queue.len();
        match active.requeue {
            RequeuePosition::Back => active.queue.push_back(id),
            RequeuePosition::Offset(n) => active.queue.insert(n.min(len), id),
            RequeuePosition::Random => {
                let at = rng.gen_range(0..=len);
                active.queue.insert(at, id);
            }
        }
    }
}

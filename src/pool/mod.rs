//! Record Pool
//!
//! The collection of performance records a session draws from.
//!
//! Two ownership models are offered through [`RecordSource`]:
//! - [`RecordPool`]: owned by the enumerator, a snapshot isolated from the
//!   document for the lifetime of the session
//! - [`SharedRecordPool`]: a handle shared with the document layer; records the
//!   document removes mid-session become stale and are dropped from the queue

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::pair::{Directions, StudyPair};
use crate::record::PerformanceRecord;
use crate::types::RecordId;

// ==================== RecordSource ====================

/// The scheduler's view of a record pool
pub trait RecordSource {
    /// All records currently in the pool, in id order
    fn candidates(&self) -> Vec<(RecordId, PerformanceRecord)>;

    fn get(&self, id: &RecordId) -> Option<PerformanceRecord>;

    fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Apply `f` to the record; returns false if the record is gone
    fn update<F>(&mut self, id: &RecordId, f: F) -> bool
    where
        F: FnOnce(&mut PerformanceRecord);
}

// ==================== RecordPool ====================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPool {
    records: BTreeMap<RecordId, PerformanceRecord>,
}

impl RecordPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from the enabled pairs and the requested directions
    pub fn from_pairs(pairs: &[StudyPair], directions: Directions) -> Self {
        let mut pool = Self::new();
        for pair in pairs.iter().filter(|p| !p.is_disabled()) {
            for direction in directions.iter() {
                pool.insert(pair.record_id(direction), *pair.record(direction));
            }
        }
        pool
    }

    /// Copy every record back onto its owning pair; returns how many were written
    pub fn write_back(&self, pairs: &mut [StudyPair]) -> usize {
        let mut written = 0;
        for pair in pairs.iter_mut() {
            for direction in Directions::BOTH.iter() {
                if let Some(record) = self.records.get(&pair.record_id(direction)) {
                    *pair.record_mut(direction) = *record;
                    written += 1;
                }
            }
        }
        written
    }

    pub fn insert(&mut self, id: RecordId, record: PerformanceRecord) -> Option<PerformanceRecord> {
        self.records.insert(id, record)
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<PerformanceRecord> {
        self.records.remove(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &PerformanceRecord)> {
        self.records.iter()
    }

    /// Fraction of records that have been answered at least once
    pub fn study_level(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let scored = self.records.values().filter(|r| !r.is_first_time()).count();
        scored as f64 / self.records.len() as f64
    }

    /// Reset the given records to first-time; unknown ids are ignored
    pub fn reset_scores<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a RecordId>,
    {
        let mut reset = 0;
        for id in ids {
            if let Some(record) = self.records.get_mut(id) {
                record.reset();
                reset += 1;
            }
        }
        reset
    }
}

impl FromIterator<(RecordId, PerformanceRecord)> for RecordPool {
    fn from_iter<T: IntoIterator<Item = (RecordId, PerformanceRecord)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl RecordSource for RecordPool {
    fn candidates(&self) -> Vec<(RecordId, PerformanceRecord)> {
        self.records.iter().map(|(id, r)| (*id, *r)).collect()
    }

    fn get(&self, id: &RecordId) -> Option<PerformanceRecord> {
        self.records.get(id).copied()
    }

    fn contains(&self, id: &RecordId) -> bool {
        self.records.contains_key(id)
    }

    fn update<F>(&mut self, id: &RecordId, f: F) -> bool
    where
        F: FnOnce(&mut PerformanceRecord),
    {
        match self.records.get_mut(id) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }
}

// ==================== SharedRecordPool ====================

/// Pool handle shared between the document layer and a live session
#[derive(Debug, Clone, Default)]
pub struct SharedRecordPool {
    inner: Arc<RwLock<RecordPool>>,
}

impl SharedRecordPool {
    pub fn new(pool: RecordPool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pool)),
        }
    }

    /// Remove a record on behalf of the document; queued references go stale
    pub fn remove(&self, id: &RecordId) -> Option<PerformanceRecord> {
        self.inner.write().remove(id)
    }

    pub fn insert(&self, id: RecordId, record: PerformanceRecord) -> Option<PerformanceRecord> {
        self.inner.write().insert(id, record)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the current pool contents
    pub fn snapshot(&self) -> RecordPool {
        self.inner.read().clone()
    }
}

impl From<RecordPool> for SharedRecordPool {
    fn from(pool: RecordPool) -> Self {
        Self::new(pool)
    }
}

impl RecordSource for SharedRecordPool {
    fn candidates(&self) -> Vec<(RecordId, PerformanceRecord)> {
        self.inner.read().candidates()
    }

    fn get(&self, id: &RecordId) -> Option<PerformanceRecord> {
        self.inner.read().get(id)
    }

    fn contains(&self, id: &RecordId) -> bool {
        self.inner.read().contains(id)
    }

    fn update<F>(&mut self, id: &RecordId, f: F) -> bool
    where
        F: FnOnce(&mut PerformanceRecord),
    {
        self.inner.write().update(id, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::Utc;
    use uuid::Uuid;

    fn id(direction: Direction) -> RecordId {
        RecordId::new(Uuid::new_v4(), direction)
    }

    #[test]
    fn test_update_missing_record_returns_false() {
        let mut pool = RecordPool::new();
        assert!(!pool.update(&id(Direction::AB), |r| r.incorrect()));
    }

    #[test]
    fn test_update_mutates_in_place() {
        let mut pool = RecordPool::new();
        let a = id(Direction::AB);
        pool.insert(a, PerformanceRecord::new());

        assert!(pool.update(&a, |r| r.correct()));
        assert_eq!(pool.get(&a).map(|r| r.score()), Some(1));
    }

    #[test]
    fn test_study_level() {
        let mut pool = RecordPool::new();
        assert_eq!(pool.study_level(), 0.0);

        pool.insert(id(Direction::AB), PerformanceRecord::new());
        pool.insert(id(Direction::AB), PerformanceRecord::scored(0, Utc::now()));
        pool.insert(id(Direction::BA), PerformanceRecord::scored(3, Utc::now()));
        pool.insert(id(Direction::BA), PerformanceRecord::new());

        assert!((pool.study_level() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_scores_ignores_unknown_ids() {
        let mut pool = RecordPool::new();
        let a = id(Direction::AB);
        pool.insert(a, PerformanceRecord::scored(4, Utc::now()));

        let unknown = id(Direction::BA);
        assert_eq!(pool.reset_scores([&a, &unknown]), 1);
        assert_eq!(pool.get(&a), Some(PerformanceRecord::FirstTime));
    }

    #[test]
    fn test_candidates_are_in_id_order() {
        let pool: RecordPool = (0..5)
            .map(|_| (id(Direction::AB), PerformanceRecord::new()))
            .collect();
        let ids: Vec<RecordId> = pool.candidates().into_iter().map(|(id, _)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_shared_pool_sees_document_removal() {
        let a = id(Direction::AB);
        let mut pool = RecordPool::new();
        pool.insert(a, PerformanceRecord::new());

        let document = SharedRecordPool::new(pool);
        let mut session = document.clone();
        assert!(session.contains(&a));

        document.remove(&a);
        assert!(!session.contains(&a));
        assert!(!session.update(&a, |r| r.correct()));
    }

    #[test]
    fn test_shared_pool_updates_are_visible_to_document() {
        let a = id(Direction::BA);
        let document = SharedRecordPool::from(RecordPool::from_iter([(a, PerformanceRecord::new())]));
        let mut session = document.clone();

        session.update(&a, |r| r.correct());
        assert_eq!(document.snapshot().get(&a).map(|r| r.score()), Some(1));
    }
}

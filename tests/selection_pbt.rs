//! Property-Based Tests for quiz selection and feedback
//!
//! Tests the following invariants:
//! - Score cutoff: no queued record ranks below the minimum score
//! - Queue size: min(target, survivors), without duplicates
//! - Monotonicity: weights never increase as a score moves away from the center
//! - Feedback: correct never lowers score or due date, incorrect always lands sooner
//! - Re-queue: wrong/skip grow the remaining count by exactly one

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use genius_algo::{
    selection_weight, Direction, Enumerator, PerformanceRecord, RecordId, RecordPool,
    RequeuePosition, ReviewSpacing, SelectionPolicy,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_record() -> impl Strategy<Value = PerformanceRecord> {
    prop_oneof![
        1 => Just(PerformanceRecord::FirstTime),
        4 => ((0u32..=15u32), (-30i64..=30i64)).prop_map(|(score, offset_days)| {
            PerformanceRecord::scored(score, fixed_now() + Duration::days(offset_days))
        }),
    ]
}

fn arb_pool() -> impl Strategy<Value = RecordPool> {
    prop::collection::vec(arb_record(), 0..40).prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let direction = if i % 2 == 0 { Direction::AB } else { Direction::BA };
                (RecordId::new(Uuid::from_u128(i as u128 / 2 + 1), direction), record)
            })
            .collect()
    })
}

fn arb_policy() -> impl Strategy<Value = SelectionPolicy> {
    (
        (0usize..=30usize),   // target_count
        (-1i32..=8i32),       // minimum_score
        (0.0f64..=12.0f64),   // probability_center
        any::<bool>(),        // favor_overdue
    )
        .prop_map(|(count, min, center, favor)| {
            SelectionPolicy::new(count, min, center).with_favor_overdue(favor)
        })
}

fn drain(enumerator: &mut Enumerator) -> Vec<RecordId> {
    std::iter::from_fn(|| enumerator.next_association().ok().map(|d| d.id)).collect()
}

// ============================================================================
// Selection properties
// ============================================================================

proptest! {
    #[test]
    fn prop_queue_respects_minimum_score(pool in arb_pool(), policy in arb_policy(), seed in any::<u64>()) {
        let snapshot = pool.clone();
        let mut e = Enumerator::with_seed(pool, seed).with_clock(fixed_now);
        e.perform_selection(&policy).unwrap();

        for id in drain(&mut e) {
            let record = snapshot.iter().find(|(rid, _)| **rid == id).map(|(_, r)| *r).unwrap();
            prop_assert!(record.ranking_score() >= policy.minimum_score);
            prop_assert!(record.score() as i64 >= policy.minimum_score as i64);
        }
    }

    #[test]
    fn prop_queue_size_and_uniqueness(pool in arb_pool(), policy in arb_policy(), seed in any::<u64>()) {
        let survivors: HashSet<RecordId> = pool
            .iter()
            .filter(|(_, r)| r.ranking_score() >= policy.minimum_score)
            .map(|(id, _)| *id)
            .collect();

        let mut e = Enumerator::with_seed(pool, seed).with_clock(fixed_now);
        let selected = e.perform_selection(&policy).unwrap();
        prop_assert_eq!(selected, policy.target_count.min(survivors.len()));
        prop_assert_eq!(e.remaining_count(), selected);

        let queue = drain(&mut e);
        let unique: HashSet<RecordId> = queue.iter().copied().collect();
        prop_assert_eq!(unique.len(), queue.len());
        prop_assert!(unique.is_subset(&survivors));
        if survivors.len() < policy.target_count {
            prop_assert_eq!(unique, survivors);
        }
    }

    #[test]
    fn prop_weight_monotone_in_distance(
        center in 0.0f64..=10.0f64,
        near in 0u32..=20u32,
        extra in 1u32..=10u32,
        maximum in 0u32..=40u32,
    ) {
        let policy = SelectionPolicy::new(5, -1, center).with_favor_overdue(false);
        let future = fixed_now() + Duration::days(3);
        let far = near + extra;
        let maximum = maximum.max(far);

        let w_near = selection_weight(&PerformanceRecord::scored(near, future), &policy, maximum, fixed_now());
        let w_far = selection_weight(&PerformanceRecord::scored(far, future), &policy, maximum, fixed_now());
        prop_assert!(w_near >= w_far);
        prop_assert!(w_far > 0.0);
    }
}

// ============================================================================
// Record properties
// ============================================================================

proptest! {
    #[test]
    fn prop_correct_is_non_decreasing(record in arb_record(), hours in 0i64..=1000i64) {
        let now = fixed_now() + Duration::hours(hours);
        let mut after = record;
        after.correct_at(now, &ReviewSpacing::default());

        prop_assert!(after.score() > record.score());
        if let Some(previous) = record.due_date() {
            prop_assert!(after.due_date().unwrap() >= previous);
        }
        prop_assert!(!after.is_first_time());
    }

    #[test]
    fn prop_incorrect_lowers_and_is_soonest(record in arb_record()) {
        let mut wrong = record;
        let mut right = record;
        wrong.incorrect_at(fixed_now());
        right.correct_at(fixed_now(), &ReviewSpacing::default());

        prop_assert_eq!(wrong.score(), 0);
        prop_assert!(wrong.score() <= record.score());
        prop_assert!(wrong.due_date() < right.due_date());
    }

    #[test]
    fn prop_wrong_and_skip_requeue_one(
        pool in arb_pool(),
        seed in any::<u64>(),
        wrong in any::<bool>(),
        requeue in prop_oneof![
            Just(RequeuePosition::Back),
            Just(RequeuePosition::Random),
            (0usize..5usize).prop_map(RequeuePosition::Offset),
        ],
    ) {
        let policy = SelectionPolicy::new(10, -1, 2.0).with_requeue(requeue);
        let mut e = Enumerator::with_seed(pool, seed).with_clock(fixed_now);
        e.perform_selection(&policy).unwrap();

        if let Ok(delivery) = e.next_association() {
            let before = e.remaining_count();
            if wrong {
                e.association_wrong(delivery.id).unwrap();
            } else {
                e.association_skip(delivery.id).unwrap();
            }
            prop_assert_eq!(e.remaining_count(), before + 1);
        }
    }
}

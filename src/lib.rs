//! # genius-algo - spaced-repetition scheduling core
//!
//! This crate decides what a learner is quizzed on next:
//!
//! - **Performance records** - per-direction score and due date, updated by
//!   correct / incorrect / skipped feedback
//! - **Record pools** - the records a session draws from, either as an owned
//!   snapshot or as a live handle shared with the document layer
//! - **Selection policy** - quiz size, score cutoff and probability center
//! - **Enumerator** - weighted selection without replacement, delivery, and
//!   re-queuing of wrong or skipped records
//!
//! ## Modules
//!
//! - [`record`] - performance record lifecycle and review spacing
//! - [`pool`] - record pools and the [`RecordSource`] seam
//! - [`pair`] - two-sided study cards owning both directional records
//! - [`policy`] - selection policy, quiz modes, re-queue positions
//! - [`enumerator`] - the session scheduler
//! - [`sanitize`] - weight sanitation
//! - [`config`] - environment-driven scheduler settings
//! - [`logging`] - tracing subscriber setup for host applications
//! - [`types`] - shared ids and constants
//!
//! ## Example
//!
//! ```rust
//! use genius_algo::{Directions, Enumerator, RecordPool, SelectionPolicy, StudyPair};
//!
//! let mut pairs = vec![StudyPair::new("der Hund", "the dog"), StudyPair::new("die Katze", "the cat")];
//! let pool = RecordPool::from_pairs(&pairs, Directions::BOTH);
//!
//! let mut quiz = Enumerator::with_seed(pool, 42);
//! quiz.perform_selection(&SelectionPolicy::new(3, -1, 1.0)).unwrap();
//!
//! while let Ok(delivery) = quiz.next_association() {
//!     quiz.association_right(delivery.id).unwrap();
//! }
//! quiz.into_source().write_back(&mut pairs);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod enumerator;
pub mod error;
pub mod logging;
pub mod pair;
pub mod policy;
pub mod pool;
pub mod record;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use config::SchedulerConfig;
pub use enumerator::{selection_weight, weighted_order, Delivery, Enumerator};
pub use error::{ConfigError, Result, SchedulerError};
pub use pair::{Directions, StudyPair};
pub use policy::{center_from_review_learn, QuizMode, RequeuePosition, SelectionPolicy};
pub use pool::{RecordPool, RecordSource, SharedRecordPool};
pub use record::{PerformanceRecord, ReviewSpacing};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::{init_tracing, FileLogGuard};
use crate::policy::{center_from_review_learn, QuizMode, RequeuePosition, SelectionPolicy};
use crate::record::ReviewSpacing;
use crate::types::{DEFAULT_QUIZ_NUM_ITEMS, DEFAULT_SPACING_BASE, MAX_SPACING_EXPONENT};

/// Scheduler settings a host application exposes as quiz preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Records per quiz
    pub quiz_num_items: usize,
    /// Review/learn slider, 0 (learn new) to 100 (review strong)
    pub review_learn: f64,
    pub minimum_score: i32,
    pub requeue: RequeuePosition,
    pub favor_overdue: bool,
    pub spacing_base: f64,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
    pub log_level: String,
    /// Directory for the rolling scheduler log; stdout only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quiz_num_items: DEFAULT_QUIZ_NUM_ITEMS,
            review_learn: 50.0,
            minimum_score: -1,
            requeue: RequeuePosition::Back,
            favor_overdue: true,
            spacing_base: DEFAULT_SPACING_BASE,
            seed: None,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl SchedulerConfig {
    /// Read a `.env` file if present, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "Failed to read .env file");
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("GENIUS_QUIZ_NUM_ITEMS") {
            config.quiz_num_items = parse("GENIUS_QUIZ_NUM_ITEMS", &value)?;
        }
        if let Some(value) = lookup("GENIUS_REVIEW_LEARN") {
            let percent: f64 = parse("GENIUS_REVIEW_LEARN", &value)?;
            if !(0.0..=100.0).contains(&percent) {
                return Err(ConfigError::InvalidValue {
                    key: "GENIUS_REVIEW_LEARN",
                    value,
                });
            }
            config.review_learn = percent;
        }
        if let Some(value) = lookup("GENIUS_MIN_SCORE") {
            config.minimum_score = parse("GENIUS_MIN_SCORE", &value)?;
        }
        if let Some(value) = lookup("GENIUS_REQUEUE") {
            config.requeue = parse_requeue(&value)?;
        }
        if let Some(value) = lookup("GENIUS_FAVOR_OVERDUE") {
            config.favor_overdue = matches!(value.as_str(), "true" | "1");
        }
        if let Some(value) = lookup("GENIUS_SPACING_BASE") {
            let base: f64 = parse("GENIUS_SPACING_BASE", &value)?;
            if !base.is_finite() || base <= 1.0 {
                return Err(ConfigError::InvalidValue {
                    key: "GENIUS_SPACING_BASE",
                    value,
                });
            }
            config.spacing_base = base;
        }
        if let Some(value) = lookup("GENIUS_SEED") {
            config.seed = Some(parse("GENIUS_SEED", &value)?);
        }
        if let Some(value) = lookup("RUST_LOG") {
            config.log_level = value;
        }
        if let Some(value) = lookup("GENIUS_LOG_DIR") {
            let dir = value.trim();
            config.log_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Install the tracing subscriber with this config's level and log directory
    pub fn init_logging(&self) -> Option<FileLogGuard> {
        init_tracing(&self.log_level, self.log_dir.as_deref())
    }

    pub fn probability_center(&self) -> f64 {
        center_from_review_learn(self.review_learn)
    }

    pub fn spacing(&self) -> ReviewSpacing {
        ReviewSpacing {
            growth_base: self.spacing_base,
            max_exponent: MAX_SPACING_EXPONENT,
        }
    }

    /// Validated policy for a quiz over a pool of `pool_len` records
    pub fn policy(&self, mode: QuizMode, pool_len: usize) -> Result<SelectionPolicy, ConfigError> {
        let mut policy =
            SelectionPolicy::for_mode(mode, self.quiz_num_items, self.probability_center(), pool_len)
                .with_requeue(self.requeue)
                .with_favor_overdue(self.favor_overdue);
        if mode == QuizMode::AutoPick {
            policy.minimum_score = self.minimum_score;
        }
        policy.validate()?;
        Ok(policy)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// `back`, `random`, or `offset:N`
fn parse_requeue(value: &str) -> Result<RequeuePosition, ConfigError> {
    let trimmed = value.trim().to_ascii_lowercase();
    match trimmed.as_str() {
        "back" => Ok(RequeuePosition::Back),
        "random" => Ok(RequeuePosition::Random),
        "front" => Ok(RequeuePosition::Offset(0)),
        other => other
            .strip_prefix("offset:")
            .and_then(|n| n.parse::<usize>().ok())
            .map(RequeuePosition::Offset)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "GENIUS_REQUEUE",
                value: value.to_string(),
            }),
    }
}

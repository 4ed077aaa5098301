//! Data Sanitization
//!
//! Numerical stability utilities for selection weights.
//!
//! Functions:
//! - Invalid value detection
//! - Weight sanitization (every survivor keeps a positive weight)
//! - Weight summary diagnostics

use crate::types::MIN_WEIGHT;

/// Check whether a slice contains NaN or infinite values
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Clamp a single weight into `[MIN_WEIGHT, 1.0]`
pub fn sanitize_weight(w: f64) -> f64 {
    if w.is_nan() || w.is_infinite() || w < MIN_WEIGHT {
        MIN_WEIGHT
    } else if w > 1.0 {
        1.0
    } else {
        w
    }
}

/// Sanitize a weight vector in place
pub fn sanitize_weights(weights: &mut [f64]) {
    for w in weights.iter_mut() {
        *w = sanitize_weight(*w);
    }
}

/// Summary of a weight vector, logged after each selection pass
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn summarize_weights(weights: &[f64]) -> WeightSummary {
    if weights.is_empty() {
        return WeightSummary {
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        };
    }

    let mut min = f64::MAX;
    let mut max = f64::MIN;
    let mut sum = 0.0;
    for &w in weights {
        min = min.min(w);
        max = max.max(w);
        sum += w;
    }

    WeightSummary {
        count: weights.len(),
        min,
        max,
        mean: sum / weights.len() as f64,
    }
}

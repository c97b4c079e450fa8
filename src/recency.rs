//! depth from age: the newest message sits just below the ground, older
//! ones sink at a fixed rate

use chrono::{DateTime, Utc};

use crate::constants::{RECENCY_BASELINE_DEPTH, RECENCY_MINUTES_PER_UNIT};

const MILLIS_PER_UNIT: f64 = RECENCY_MINUTES_PER_UNIT * 60_000.0;

/// Depths for a batch of creation times, in input order.
///
/// The most recent timestamp maps to `RECENCY_BASELINE_DEPTH`; every other
/// one lies one unit deeper per `RECENCY_MINUTES_PER_UNIT` of extra age.
pub fn depths_from_recency(created: &[DateTime<Utc>]) -> Vec<f64> {
    let Some(newest) = created.iter().max().copied() else {
        return Vec::new();
    };
    created.iter().map(|&at| depth_for_age(newest, at)).collect()
}

/// Depth of a single timestamp relative to a known newest one.
pub fn depth_for_age(newest: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    let age_ms = (newest - at).num_milliseconds().max(0) as f64;
    RECENCY_BASELINE_DEPTH + age_ms / MILLIS_PER_UNIT
}

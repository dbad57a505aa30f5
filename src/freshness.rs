//! Freshness guard for backend measurements
//!
//! A reading is only worth publishing if it describes the lake as it is now.
//! The backend usually reports a new value every few minutes; a reading older
//! than [`MAX_AGE_MINUTES`] means the sensor or the backend stopped updating.

use chrono::{DateTime, TimeDelta, Utc};

/// Maximum accepted age of a measurement, in minutes
pub const MAX_AGE_MINUTES: i64 = 115;

/// The threshold as a `TimeDelta`.
pub fn max_age() -> TimeDelta {
    TimeDelta::minutes(MAX_AGE_MINUTES)
}

/// Age of a measurement in fractional minutes (negative if it lies in the future).
pub fn age_minutes(measurement_time: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = now - measurement_time;
    match age.num_microseconds() {
        Some(micros) => micros as f64 / 60_000_000.0,
        None => age.num_seconds() as f64 / 60.0,
    }
}

/// Returns `true` iff the measurement is at most `max_age` old.
///
/// The comparison is done on exact durations, so an age of exactly
/// `max_age` is accepted and anything beyond it is rejected.
pub fn is_fresh(measurement_time: DateTime<Utc>, now: DateTime<Utc>, max_age: TimeDelta) -> bool {
    now - measurement_time <= max_age
}

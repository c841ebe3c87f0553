//! Error taxonomy for the reflow engine.
//!
//! Every failure is fatal to the current `reflow` call: no partial
//! schedule is ever emitted. Bounded-loop errors (`NoShiftFound`,
//! `Unschedulable`, `GuardExceeded`) indicate pathological input rather
//! than engine bugs — each guarded loop makes forward progress on every
//! iteration, so exhausting a bound means the demand cannot be met under
//! the configured shifts and reservations.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while repairing a schedule.
#[derive(Debug, Error)]
pub enum ReflowError {
    /// An interval was constructed with `end <= start`.
    #[error("invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A shift is overnight or zero-length (`end_hour <= start_hour`).
    #[error(
        "unsupported shift on day {day_of_week}: \
         {start_hour:02}:00-{end_hour:02}:00 (overnight shifts are rejected)"
    )]
    UnsupportedShift {
        day_of_week: u8,
        start_hour: u8,
        end_hour: u8,
    },

    /// No in-shift instant exists within the bounded search horizon.
    #[error("no shift window found within {horizon_days} days of {from}")]
    NoShiftFound {
        from: DateTime<Utc>,
        horizon_days: u32,
    },

    /// The dependency graph contains a cycle.
    #[error("circular dependency among work orders: {}", .ids.join(", "))]
    CircularDependency { ids: Vec<String> },

    /// A work order names a parent that is not in the work-order set.
    #[error("work order {number} depends on unknown work order {parent_id}")]
    MissingDependency { number: String, parent_id: String },

    /// A work order references a work center that does not exist.
    #[error("work order {number} references unknown work center {work_center_id}")]
    MissingWorkCenter {
        number: String,
        work_center_id: String,
    },

    /// The duration calculator exhausted its calendar-day budget.
    #[error("duration not satisfied within {budget_days} calendar days of {start}")]
    Unschedulable {
        start: DateTime<Utc>,
        budget_days: u32,
    },

    /// A placement loop failed to converge within its iteration bound.
    #[error("{stage} loop did not converge within {limit} iterations")]
    GuardExceeded { stage: &'static str, limit: u32 },

    /// Context wrapper naming the work order a lower-level error belongs to.
    #[error("work order {number}: {source}")]
    WorkOrder {
        number: String,
        #[source]
        source: Box<ReflowError>,
    },

    /// The input payload is structurally malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReflowError {
    /// Attaches the owning work-order number to an error raised by the
    /// calendar or duration layers, which do not know it.
    pub(crate) fn for_work_order(number: &str, source: ReflowError) -> Self {
        ReflowError::WorkOrder {
            number: number.to_string(),
            source: Box::new(source),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReflowError>;

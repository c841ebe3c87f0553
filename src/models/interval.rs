//! Half-open time intervals and the reservation algebra.
//!
//! Intervals are [start, end) with `end > start`. Two intervals overlap
//! iff their intersection is non-empty; touching at an endpoint is not an
//! overlap. Merging, however, coalesces touching reservations into one
//! contiguous unavailable run — adjacent blocked time is treated as a
//! single block when testing availability.
//!
//! All algebra operations are pure: inputs are never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReflowError;
use crate::models::timestamp::utc_millis;

/// A half-open time interval [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Interval start (inclusive).
    #[serde(with = "utc_millis")]
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    #[serde(with = "utc_millis")]
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Creates an interval, rejecting `end <= start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReflowError> {
        if end <= start {
            return Err(ReflowError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether a timestamp falls within this interval.
    #[inline]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Whether two intervals overlap. Touching endpoints do not count.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whole minutes spanned by this interval (floor).
    #[inline]
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// The origin of an unavailable run on a work center.
///
/// Kinds are informational: once merged, every reservation is equally
/// "unavailable" for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationKind {
    /// A maintenance window declared on the work center.
    MaintenanceWindow,
    /// The planned interval of an immovable maintenance work order.
    FixedMaintenance,
    /// A work order placed earlier in the current reflow pass.
    ScheduledWork,
}

/// An unavailable interval on a work center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub interval: Interval,
    pub kind: ReservationKind,
    /// Originating work-order id, when the reservation came from one.
    pub source: Option<String>,
}

impl Reservation {
    /// Creates a reservation without a source id.
    pub fn new(interval: Interval, kind: ReservationKind) -> Self {
        Self {
            interval,
            kind,
            source: None,
        }
    }

    /// Sets the originating work-order id.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Returns the reservations sorted ascending by start (stable).
pub fn sort_reservations(rs: &[Reservation]) -> Vec<Reservation> {
    let mut sorted = rs.to_vec();
    sorted.sort_by_key(|r| r.interval.start);
    sorted
}

/// Sorts and coalesces reservations into non-overlapping runs.
///
/// Overlapping and touching reservations (`r.start <= last.end`) merge
/// into one spanning the union, keeping the first constituent's kind and
/// source. Idempotent: merging a merged list is a no-op.
pub fn merge_reservations(rs: &[Reservation]) -> Vec<Reservation> {
    let sorted = sort_reservations(rs);
    let mut merged: Vec<Reservation> = Vec::with_capacity(sorted.len());
    for r in sorted {
        match merged.last_mut() {
            Some(last) if r.interval.start <= last.interval.end => {
                if r.interval.end > last.interval.end {
                    last.interval.end = r.interval.end;
                }
            }
            _ => merged.push(r),
        }
    }
    merged
}

/// Finds the earliest reservation intersecting the probe interval.
///
/// Expects a merged (sorted, non-overlapping) list and short-circuits
/// once a reservation starts at or after `probe.end`.
pub fn first_overlap<'a>(merged: &'a [Reservation], probe: &Interval) -> Option<&'a Reservation> {
    for r in merged {
        if r.interval.start >= probe.end {
            return None;
        }
        if r.interval.overlaps(probe) {
            return Some(r);
        }
    }
    None
}

/// Sub-intervals of `base` not covered by any block, in order.
///
/// Blocks need not be sorted or disjoint. Empty sub-intervals are
/// discarded.
pub fn subtract(base: &Interval, blocks: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = blocks.to_vec();
    sorted.sort_by_key(|b| b.start);

    let mut remaining = Vec::new();
    let mut cursor = base.start;
    for block in sorted {
        if block.start >= base.end {
            break;
        }
        if block.end <= cursor {
            continue;
        }
        if block.start > cursor {
            remaining.push(Interval {
                start: cursor,
                end: block.start.min(base.end),
            });
        }
        cursor = cursor.max(block.end);
    }
    if cursor < base.end {
        remaining.push(Interval {
            start: cursor,
            end: base.end,
        });
    }
    remaining
}

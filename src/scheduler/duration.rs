//! Working-minute duration calculation.
//!
//! Consumes a number of *working* minutes from a start instant: only
//! time that is both inside a shift window and outside every supplied
//! block counts. The walk is day-by-day — each day's windows in
//! ascending start order, each window reduced to its usable
//! sub-intervals by subtracting the blocks.
//!
//! # Numeric model
//! Each usable sub-interval contributes its whole-minute length (floor);
//! the terminal sub-interval contributes exactly the remaining minutes,
//! so the answer is minute-exact. Sub-minute residues of intermediate
//! sub-intervals are discarded.
//!
//! # Bounded search
//! The maintenance-aware calculation gives up after 90 calendar days and
//! the shift-only variant after 60, surfacing `Unschedulable`.

use chrono::{DateTime, Duration, Utc};

use crate::error::ReflowError;
use crate::models::{day_start, subtract, Interval, ShiftCalendar};

/// Calendar-day budget when blocks are in play.
pub const DURATION_HORIZON_DAYS: u32 = 90;

/// Calendar-day budget for the block-unaware variant.
pub const SHIFT_ONLY_HORIZON_DAYS: u32 = 60;

/// The instant at which `duration_minutes` of in-shift, non-blocked time
/// has elapsed since `start`.
pub fn end_after_working_minutes(
    start: DateTime<Utc>,
    duration_minutes: i64,
    calendar: &ShiftCalendar,
    blocks: &[Interval],
) -> Result<DateTime<Utc>, ReflowError> {
    end_within(start, duration_minutes, calendar, blocks, DURATION_HORIZON_DAYS)
}

/// Block-unaware variant: consumes shift time only.
pub fn end_after_shift_minutes(
    start: DateTime<Utc>,
    duration_minutes: i64,
    calendar: &ShiftCalendar,
) -> Result<DateTime<Utc>, ReflowError> {
    end_within(start, duration_minutes, calendar, &[], SHIFT_ONLY_HORIZON_DAYS)
}

fn end_within(
    start: DateTime<Utc>,
    duration_minutes: i64,
    calendar: &ShiftCalendar,
    blocks: &[Interval],
    budget_days: u32,
) -> Result<DateTime<Utc>, ReflowError> {
    if duration_minutes <= 0 {
        return Ok(start);
    }

    let mut remaining = duration_minutes;
    let mut cursor = calendar.snap_forward(start)?;
    let mut day = day_start(cursor);
    let deadline = day_start(start) + Duration::days(i64::from(budget_days));

    while day < deadline {
        for window in calendar.windows_for_day(day)? {
            if window.end <= cursor {
                continue;
            }
            let effective = Interval {
                start: window.start.max(cursor),
                end: window.end,
            };
            for usable in subtract(&effective, blocks) {
                let available = usable.minutes();
                if remaining <= available {
                    return Ok(usable.start + Duration::minutes(remaining));
                }
                remaining -= available;
            }
        }
        cursor = calendar.snap_forward(day + Duration::days(1))?;
        day = day_start(cursor);
    }
    Err(ReflowError::Unschedulable { start, budget_days })
}

/// Total in-shift, non-blocked minutes inside `interval`.
///
/// The measurement dual of `end_after_working_minutes`, used to check
/// working-minute conservation on a finished schedule.
pub fn working_minutes_between(
    interval: &Interval,
    calendar: &ShiftCalendar,
    blocks: &[Interval],
) -> Result<i64, ReflowError> {
    let mut total = 0;
    let mut day = day_start(interval.start);
    while day < interval.end {
        for window in calendar.windows_for_day(day)? {
            let clipped = Interval {
                start: window.start.max(interval.start),
                end: window.end.min(interval.end),
            };
            if clipped.end <= clipped.start {
                continue;
            }
            for usable in subtract(&clipped, blocks) {
                total += usable.minutes();
            }
        }
        day += Duration::days(1);
    }
    Ok(total)
}

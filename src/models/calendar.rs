//! Shift calendar: recurring daily availability windows for a work center.
//!
//! A shift is keyed by UTC day-of-week (0 = Sunday through 6 = Saturday)
//! and whole start/end hours. Multiple shifts per day are allowed;
//! overnight shifts (`end_hour <= start_hour`) are rejected.
//!
//! # Bounded search
//! `snap_forward` walks at most 14 consecutive calendar days before
//! failing with `NoShiftFound`, which catches misconfigured calendars
//! (e.g. an empty shift set).

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReflowError;
use crate::models::Interval;

/// Day horizon for forward snapping.
pub const SNAP_HORIZON_DAYS: u32 = 14;

/// Midnight UTC of the calendar day containing `t`.
pub(crate) fn day_start(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight always exists")
        .and_utc()
}

/// A recurring daily availability window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    /// 0 = Sunday through 6 = Saturday (UTC).
    pub day_of_week: u8,
    /// Window start hour, 0–23.
    pub start_hour: u8,
    /// Window end hour, 0–23; must exceed `start_hour`.
    pub end_hour: u8,
}

impl Shift {
    /// Creates a new shift.
    pub fn new(day_of_week: u8, start_hour: u8, end_hour: u8) -> Self {
        Self {
            day_of_week,
            start_hour,
            end_hour,
        }
    }

    fn window_on(&self, day: DateTime<Utc>) -> Interval {
        Interval {
            start: day + Duration::hours(i64::from(self.start_hour)),
            end: day + Duration::hours(i64::from(self.end_hour)),
        }
    }
}

/// The shift set of one work center.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalendar {
    shifts: Vec<Shift>,
}

impl ShiftCalendar {
    /// Creates a calendar from a shift set.
    pub fn new(shifts: Vec<Shift>) -> Self {
        Self { shifts }
    }

    /// Adds a shift.
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }

    /// The underlying shift set.
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// Concrete shift windows for the calendar day starting at `day`
    /// (midnight UTC), ascending by start. Empty when no shift matches
    /// the weekday.
    pub fn windows_for_day(&self, day: DateTime<Utc>) -> Result<Vec<Interval>, ReflowError> {
        let weekday = day.weekday().num_days_from_sunday() as u8;
        let mut windows = Vec::new();
        for shift in &self.shifts {
            if shift.end_hour <= shift.start_hour {
                return Err(ReflowError::UnsupportedShift {
                    day_of_week: shift.day_of_week,
                    start_hour: shift.start_hour,
                    end_hour: shift.end_hour,
                });
            }
            if shift.day_of_week == weekday {
                windows.push(shift.window_on(day));
            }
        }
        windows.sort_by_key(|w| w.start);
        Ok(windows)
    }

    /// The smallest instant `>= t` that lies inside some shift window.
    ///
    /// Identity on in-shift inputs; monotone non-decreasing.
    pub fn snap_forward(&self, t: DateTime<Utc>) -> Result<DateTime<Utc>, ReflowError> {
        let mut day = day_start(t);
        for _ in 0..SNAP_HORIZON_DAYS {
            for window in self.windows_for_day(day)? {
                if window.contains(t) {
                    return Ok(t);
                }
                if t < window.start {
                    return Ok(window.start);
                }
            }
            day += Duration::days(1);
        }
        Err(ReflowError::NoShiftFound {
            from: t,
            horizon_days: SNAP_HORIZON_DAYS,
        })
    }
}

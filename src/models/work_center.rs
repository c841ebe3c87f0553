//! Work-center model.
//!
//! A work center is a capacity-1 resource (machine or line) that executes
//! at most one work order at a time. It carries the shift calendar that
//! defines when it is staffed and the maintenance windows during which it
//! cannot be used at all.

use serde::{Deserialize, Serialize};

use crate::models::{Interval, ShiftCalendar};

/// A time window during which a work center is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    pub interval: Interval,
    /// Free-text reason, when provided.
    pub reason: Option<String>,
}

impl MaintenanceWindow {
    /// Creates a maintenance window without a reason.
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            reason: None,
        }
    }

    /// Attaches a free-text reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// A capacity-1 production resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCenter {
    /// Unique opaque identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Staffed shift windows.
    pub calendar: ShiftCalendar,
    /// Windows during which the center is unavailable.
    pub maintenance_windows: Vec<MaintenanceWindow>,
}

impl WorkCenter {
    /// Creates a work center with an empty calendar.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calendar: ShiftCalendar::default(),
            maintenance_windows: Vec::new(),
        }
    }

    /// Sets the shift calendar.
    pub fn with_calendar(mut self, calendar: ShiftCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Adds a maintenance window.
    pub fn with_maintenance(mut self, window: MaintenanceWindow) -> Self {
        self.maintenance_windows.push(window);
        self
    }
}

//! Work-order model.
//!
//! A work order is a unit of production work: a working-minute duration
//! assigned to a single work center, with an ordered list of parent work
//! orders it depends on. Maintenance work orders are immovable — their
//! planned interval is authoritative and doubles as a reservation on the
//! work center.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReflowError;
use crate::models::timestamp::utc_millis;
use crate::models::Interval;

/// A work order to be (re)scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Unique opaque identifier.
    pub id: String,
    /// Human-facing work-order number.
    pub number: String,
    /// Owning manufacturing order, when known. Carried through untouched.
    pub manufacturing_order_id: Option<String>,
    /// Assigned work center.
    pub work_center_id: String,
    /// Planned start (UTC).
    #[serde(with = "utc_millis")]
    pub start: DateTime<Utc>,
    /// Planned end (UTC).
    #[serde(with = "utc_millis")]
    pub end: DateTime<Utc>,
    /// Working minutes to consume (in-shift, non-maintenance time).
    pub duration_minutes: i64,
    /// Immovable maintenance flag.
    pub is_maintenance: bool,
    /// Parent work-order ids this one depends on, in input order.
    pub depends_on: Vec<String>,
}

impl WorkOrder {
    /// Creates a work order with the given identity and placement.
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        work_center_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            manufacturing_order_id: None,
            work_center_id: work_center_id.into(),
            start,
            end,
            duration_minutes,
            is_maintenance: false,
            depends_on: Vec::new(),
        }
    }

    /// Marks this work order as immovable maintenance.
    pub fn as_maintenance(mut self) -> Self {
        self.is_maintenance = true;
        self
    }

    /// Adds a dependency on a parent work order.
    pub fn with_dependency(mut self, parent_id: impl Into<String>) -> Self {
        self.depends_on.push(parent_id.into());
        self
    }

    /// Sets the owning manufacturing order.
    pub fn with_manufacturing_order(mut self, mo_id: impl Into<String>) -> Self {
        self.manufacturing_order_id = Some(mo_id.into());
        self
    }

    /// The currently planned interval.
    pub fn interval(&self) -> Result<Interval, ReflowError> {
        Interval::new(self.start, self.end)
    }

    /// Whether this work order has any dependencies.
    pub fn has_dependencies(&self) -> bool {
        !self.depends_on.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 9, h, 0, 0).unwrap()
    }

    #[test]
    fn test_builder() {
        let wo = WorkOrder::new("wo-1", "WO-1", "wc-1", t(8), t(12), 240)
            .with_dependency("wo-0")
            .with_manufacturing_order("mo-1");

        assert_eq!(wo.id, "wo-1");
        assert_eq!(wo.number, "WO-1");
        assert_eq!(wo.work_center_id, "wc-1");
        assert_eq!(wo.duration_minutes, 240);
        assert!(!wo.is_maintenance);
        assert_eq!(wo.depends_on, vec!["wo-0".to_string()]);
        assert_eq!(wo.manufacturing_order_id.as_deref(), Some("mo-1"));
        assert!(wo.has_dependencies());
    }

    #[test]
    fn test_maintenance_flag() {
        let wo = WorkOrder::new("wo-m", "WO-M", "wc-1", t(8), t(9), 60).as_maintenance();
        assert!(wo.is_maintenance);
    }

    #[test]
    fn test_interval_rejects_inverted_plan() {
        let wo = WorkOrder::new("wo-1", "WO-1", "wc-1", t(12), t(8), 240);
        assert!(wo.interval().is_err());
    }
}

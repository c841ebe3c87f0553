//! Reflow result models.
//!
//! A reflow produces the rewritten work orders, one change record per
//! work order that actually moved, and a short prose explanation of the
//! strategy. Change records carry the contributory reasons so planners
//! can see *why* an order moved, not just where to.

use serde::{Deserialize, Serialize};

use crate::models::{Interval, WorkOrder};

/// A recorded movement of one work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    /// Moved work order.
    pub work_order_id: String,
    /// Its human-facing number.
    pub work_order_number: String,
    /// Work center it is assigned to.
    pub work_center_id: String,
    /// Interval before the reflow.
    pub original: Interval,
    /// Interval after the reflow.
    pub updated: Interval,
    /// Minutes the start moved (positive = later).
    pub start_delta_minutes: i64,
    /// Minutes the end moved (positive = later).
    pub end_delta_minutes: i64,
    /// Contributory causes, first occurrence first; never empty.
    pub reasons: Vec<String>,
}

/// The complete result of one reflow call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowOutput {
    /// All work orders (moved or not), with rewritten start/end.
    pub updated_work_orders: Vec<WorkOrder>,
    /// One record per work order whose interval moved.
    pub changes: Vec<ChangeRecord>,
    /// Two-sentence summary of what was done and how.
    pub explanation: Vec<String>,
}

impl ReflowOutput {
    /// Finds the change record for a work order, if it moved.
    pub fn change_for(&self, work_order_id: &str) -> Option<&ChangeRecord> {
        self.changes
            .iter()
            .find(|c| c.work_order_id == work_order_id)
    }

    /// Finds an updated work order by id.
    pub fn work_order(&self, work_order_id: &str) -> Option<&WorkOrder> {
        self.updated_work_orders
            .iter()
            .find(|w| w.id == work_order_id)
    }

    /// Number of work orders that moved.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

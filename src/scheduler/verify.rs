//! Post-hoc constraint verification.
//!
//! Re-checks a finished reflow against the hard constraints, entirely
//! outside the placement path. An accepted schedule yields an empty
//! violation list; anything else names the offending entity and what it
//! broke.
//!
//! # Checks
//!
//! | Check | Constraint |
//! |-------|-----------|
//! | Dependency order | parent.end ≤ child.start for every edge |
//! | Center exclusivity | no two orders on one center overlap |
//! | Shift alignment | every start lies inside a shift window |
//! | Maintenance clearance | no interval overlaps a maintenance window |
//! | Fixed stability | maintenance orders keep their input interval |
//! | Minute conservation | working minutes in the interval equal the duration |
//! | Forward-only | no order starts earlier than it originally did |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ReflowError;
use crate::models::{day_start, WorkCenter, WorkOrder};
use crate::scheduler::duration::working_minutes_between;

/// Classification of post-hoc violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A child starts before its parent ends.
    DependencyOrder,
    /// Two work orders overlap on the same work center.
    WorkCenterOverlap,
    /// A work order starts outside every shift window.
    StartOutsideShift,
    /// A work order overlaps a maintenance window.
    MaintenanceOverlap,
    /// An immovable maintenance order was moved.
    FixedMoved,
    /// The interval does not hold exactly the order's working minutes.
    DurationMismatch,
    /// A work order starts earlier than it originally did.
    EarlierStart,
}

/// A violated constraint on the finished schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_type: ViolationType,
    /// Work-order number the violation is about.
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

/// Checks a reflowed schedule against every hard constraint.
///
/// `originals` are the pre-reflow work orders, used for the fixed
/// stability and forward-only checks. Returns all violations found;
/// empty means the schedule is accepted.
pub fn verify_schedule(
    updated: &[WorkOrder],
    work_centers: &[WorkCenter],
    originals: &[WorkOrder],
) -> Result<Vec<Violation>, ReflowError> {
    let mut violations = Vec::new();
    let by_id: HashMap<&str, &WorkOrder> = updated.iter().map(|w| (w.id.as_str(), w)).collect();
    let original_by_id: HashMap<&str, &WorkOrder> =
        originals.iter().map(|w| (w.id.as_str(), w)).collect();
    let wc_by_id: HashMap<&str, &WorkCenter> =
        work_centers.iter().map(|wc| (wc.id.as_str(), wc)).collect();

    for wo in updated {
        let interval = wo
            .interval()
            .map_err(|err| ReflowError::for_work_order(&wo.number, err))?;
        let Some(wc) = wc_by_id.get(wo.work_center_id.as_str()) else {
            return Err(ReflowError::MissingWorkCenter {
                number: wo.number.clone(),
                work_center_id: wo.work_center_id.clone(),
            });
        };

        // Dependency order.
        for parent_id in &wo.depends_on {
            if let Some(parent) = by_id.get(parent_id.as_str()) {
                if parent.end > wo.start {
                    violations.push(Violation::new(
                        ViolationType::DependencyOrder,
                        &wo.number,
                        format!("starts at {} before parent {} ends at {}", wo.start, parent.number, parent.end),
                    ));
                }
            }
        }

        // Shift alignment.
        let windows = wc.calendar.windows_for_day(day_start(wo.start))?;
        if !windows.iter().any(|w| w.contains(wo.start)) {
            violations.push(Violation::new(
                ViolationType::StartOutsideShift,
                &wo.number,
                format!("start {} is outside every shift window of {}", wo.start, wc.name),
            ));
        }

        // Maintenance clearance.
        for mw in &wc.maintenance_windows {
            if interval.overlaps(&mw.interval) {
                violations.push(Violation::new(
                    ViolationType::MaintenanceOverlap,
                    &wo.number,
                    format!(
                        "overlaps maintenance window {} - {} on {}",
                        mw.interval.start, mw.interval.end, wc.name
                    ),
                ));
            }
        }

        // Minute conservation: maintenance windows are the only
        // non-working blocks inside a legal interval.
        let blocks: Vec<_> = wc.maintenance_windows.iter().map(|m| m.interval).collect();
        let worked = working_minutes_between(&interval, &wc.calendar, &blocks)?;
        if worked != wo.duration_minutes {
            violations.push(Violation::new(
                ViolationType::DurationMismatch,
                &wo.number,
                format!(
                    "interval holds {} working minutes, expected {}",
                    worked, wo.duration_minutes
                ),
            ));
        }

        // Stability against the input.
        if let Some(original) = original_by_id.get(wo.id.as_str()) {
            if wo.is_maintenance && (wo.start != original.start || wo.end != original.end) {
                violations.push(Violation::new(
                    ViolationType::FixedMoved,
                    &wo.number,
                    "immovable maintenance order was moved".to_string(),
                ));
            }
            if wo.start < original.start {
                violations.push(Violation::new(
                    ViolationType::EarlierStart,
                    &wo.number,
                    format!("moved earlier: {} before original {}", wo.start, original.start),
                ));
            }
        }
    }

    // Center exclusivity over all pairs.
    for (i, a) in updated.iter().enumerate() {
        let a_interval = a
            .interval()
            .map_err(|err| ReflowError::for_work_order(&a.number, err))?;
        for b in updated.iter().skip(i + 1) {
            if a.work_center_id != b.work_center_id {
                continue;
            }
            let b_interval = b
                .interval()
                .map_err(|err| ReflowError::for_work_order(&b.number, err))?;
            if a_interval.overlaps(&b_interval) {
                violations.push(Violation::new(
                    ViolationType::WorkCenterOverlap,
                    &a.number,
                    format!("overlaps {} on work center {}", b.number, a.work_center_id),
                ));
            }
        }
    }

    Ok(violations)
}

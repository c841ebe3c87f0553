//! The reflow engine: minimal forward repair of a disrupted schedule.
//!
//! # Algorithm
//!
//! 1. Deep-copy the input work orders; the input is never mutated.
//! 2. Topologically order the work orders under parent→child edges.
//! 3. Seed per-center reservations from maintenance windows and
//!    immovable maintenance work orders; seed the schedule map with the
//!    immovable intervals.
//! 4. Walk the topological order. For each movable work order: start
//!    from max(planned start, latest parent end), snap into shift, step
//!    the cursor past any reservation it falls inside, compute a
//!    tentative end, and push the whole interval past reservations until
//!    it fits. Book the placement and record the change.
//!
//! The result is minimal, stable disruption: no work order moves
//! earlier, and already-feasible orders do not move at all.
//!
//! # Guards
//! The feasibility and overlap loops each make forward progress every
//! iteration (the cursor strictly advances past a reservation end), so
//! the 500-iteration bound only trips on pathological input.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::ReflowError;
use crate::models::timestamp::format_utc_millis;
use crate::models::{
    first_overlap, ChangeRecord, Interval, ReflowOutput, Reservation, ReservationKind, WorkCenter,
    WorkOrder,
};
use crate::scheduler::duration::end_after_working_minutes;
use crate::scheduler::reservations::ReservationLedger;
use crate::scheduler::topo::topo_sort;

/// Iteration bound shared by the feasibility and overlap loops.
pub const PLACEMENT_GUARD: u32 = 500;

/// Fallback change reason when no specific cause was recorded.
const DEFAULT_REASON: &str = "Reflow adjustment";

/// Input container for a reflow call.
#[derive(Debug, Clone)]
pub struct ReflowInput {
    /// Work orders in input order (the topological tie-break order).
    pub work_orders: Vec<WorkOrder>,
    /// Work centers referenced by the work orders.
    pub work_centers: Vec<WorkCenter>,
}

impl ReflowInput {
    /// Creates a new input container.
    pub fn new(work_orders: Vec<WorkOrder>, work_centers: Vec<WorkCenter>) -> Self {
        Self {
            work_orders,
            work_centers,
        }
    }
}

/// Earliest-feasible forward placement engine.
///
/// Stateless between calls: each `run` builds its own reservation table
/// and schedule map over local copies of the input. Concurrent callers
/// should use independent instances.
#[derive(Debug, Clone, Default)]
pub struct ReflowEngine;

impl ReflowEngine {
    /// Creates a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Repairs the schedule, returning rewritten work orders, change
    /// records, and a short explanation. Any failure aborts the whole
    /// call; no partial schedule is returned.
    pub fn run(&self, input: &ReflowInput) -> Result<ReflowOutput, ReflowError> {
        // Step A: local copies and lookups.
        let mut work_orders: Vec<WorkOrder> = input.work_orders.clone();
        let wc_by_id: HashMap<&str, &WorkCenter> = input
            .work_centers
            .iter()
            .map(|wc| (wc.id.as_str(), wc))
            .collect();
        for wo in &work_orders {
            if !wc_by_id.contains_key(wo.work_center_id.as_str()) {
                return Err(ReflowError::MissingWorkCenter {
                    number: wo.number.clone(),
                    work_center_id: wo.work_center_id.clone(),
                });
            }
        }
        let index_by_id: HashMap<String, usize> = work_orders
            .iter()
            .enumerate()
            .map(|(idx, wo)| (wo.id.clone(), idx))
            .collect();

        let node_ids: Vec<String> = work_orders.iter().map(|wo| wo.id.clone()).collect();
        let mut edges: Vec<(String, String)> = Vec::new();
        for wo in &work_orders {
            for parent in &wo.depends_on {
                edges.push((parent.clone(), wo.id.clone()));
            }
        }

        // Step B: dependency order.
        let order = topo_sort(&node_ids, &edges)?;

        // Step C: seed reservations and the schedule map.
        let mut ledger = ReservationLedger::seed(&input.work_centers, &work_orders)?;
        let mut scheduled: HashMap<String, Interval> = HashMap::new();
        for wo in &work_orders {
            if wo.is_maintenance {
                let interval = wo
                    .interval()
                    .map_err(|err| ReflowError::for_work_order(&wo.number, err))?;
                scheduled.insert(wo.id.clone(), interval);
            }
        }

        // Step D: placement loop.
        let mut changes: Vec<ChangeRecord> = Vec::new();
        for wo_id in &order {
            let idx = index_by_id[wo_id.as_str()];
            let wo = work_orders[idx].clone();
            if wo.is_maintenance {
                debug!(number = %wo.number, "immovable maintenance order, skipping");
                continue;
            }
            let wc = wc_by_id[wo.work_center_id.as_str()];
            let original = wo
                .interval()
                .map_err(|err| ReflowError::for_work_order(&wo.number, err))?;

            // Earliest admissible start under dependencies.
            let mut earliest = original.start;
            let mut reasons: Vec<String> = Vec::new();
            for parent_id in &wo.depends_on {
                let parent = scheduled.get(parent_id).ok_or_else(|| {
                    ReflowError::MissingDependency {
                        number: wo.number.clone(),
                        parent_id: parent_id.clone(),
                    }
                })?;
                if parent.end > original.start {
                    let parent_number = index_by_id
                        .get(parent_id)
                        .map(|&i| work_orders[i].number.as_str())
                        .unwrap_or(parent_id.as_str());
                    reasons.push(format!(
                        "Dependency {} ready at {}",
                        parent_number,
                        format_utc_millis(&parent.end)
                    ));
                }
                if parent.end > earliest {
                    earliest = parent.end;
                }
            }

            let placed = self
                .place(&wo, wc, &ledger, earliest, &mut reasons)
                .map_err(|err| ReflowError::for_work_order(&wo.number, err))?;

            ledger.book(
                &wo.work_center_id,
                Reservation::new(placed, ReservationKind::ScheduledWork).with_source(wo.id.clone()),
            );
            scheduled.insert(wo.id.clone(), placed);
            work_orders[idx].start = placed.start;
            work_orders[idx].end = placed.end;

            if placed != original {
                if reasons.is_empty() {
                    reasons.push(DEFAULT_REASON.to_string());
                }
                changes.push(ChangeRecord {
                    work_order_id: wo.id.clone(),
                    work_order_number: wo.number.clone(),
                    work_center_id: wo.work_center_id.clone(),
                    original,
                    updated: placed,
                    start_delta_minutes: (placed.start - original.start).num_minutes(),
                    end_delta_minutes: (placed.end - original.end).num_minutes(),
                    reasons: dedup_reasons(reasons),
                });
                debug!(
                    number = %wo.number,
                    start = %placed.start,
                    end = %placed.end,
                    "work order moved"
                );
            }
        }

        let explanation = vec![
            format!(
                "{} of {} work orders were moved to repair the schedule.",
                changes.len(),
                work_orders.len()
            ),
            "Strategy: topological dependency ordering with earliest-feasible placement \
             per work center under shift and maintenance calendars."
                .to_string(),
        ];
        info!(changes = changes.len(), "reflow complete");

        Ok(ReflowOutput {
            updated_work_orders: work_orders,
            changes,
            explanation,
        })
    }

    /// Finds the earliest interval for `wo` starting at or after
    /// `earliest` that is in-shift and free of reservations.
    fn place(
        &self,
        wo: &WorkOrder,
        wc: &WorkCenter,
        ledger: &ReservationLedger,
        earliest: DateTime<Utc>,
        reasons: &mut Vec<String>,
    ) -> Result<Interval, ReflowError> {
        // Feasibility: the start must at least be reachable before the
        // more expensive duration calculation runs.
        let mut start = wc.calendar.snap_forward(earliest)?;
        let mut pushed = false;
        let mut guard = 0;
        while let Some(hit) = self
            .containing_reservation(ledger.reservations(&wo.work_center_id), start)
        {
            guard += 1;
            if guard > PLACEMENT_GUARD {
                return Err(ReflowError::GuardExceeded {
                    stage: "feasibility",
                    limit: PLACEMENT_GUARD,
                });
            }
            pushed = true;
            start = wc.calendar.snap_forward(hit)?;
        }

        // Overlap resolution: push the whole interval past reservations
        // until it fits.
        let blocks = ledger.blocks(&wo.work_center_id);
        let mut end = end_after_working_minutes(start, wo.duration_minutes, &wc.calendar, &blocks)?;
        let mut guard = 0;
        loop {
            let candidate = Interval::new(start, end)?;
            let hit = match first_overlap(ledger.reservations(&wo.work_center_id), &candidate) {
                None => break,
                Some(r) => r.interval.end,
            };
            guard += 1;
            if guard > PLACEMENT_GUARD {
                return Err(ReflowError::GuardExceeded {
                    stage: "overlap resolution",
                    limit: PLACEMENT_GUARD,
                });
            }
            pushed = true;
            start = wc.calendar.snap_forward(hit)?;
            end = end_after_working_minutes(start, wo.duration_minutes, &wc.calendar, &blocks)?;
        }

        if pushed {
            reasons.push(format!(
                "Pushed past reserved time on work center {}",
                wc.name
            ));
        }
        Interval::new(start, end)
    }

    /// The end of the reservation containing `t`, if any.
    fn containing_reservation(
        &self,
        reservations: &[Reservation],
        t: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        reservations
            .iter()
            .find(|r| r.interval.contains(t))
            .map(|r| r.interval.end)
    }
}

/// Deduplicates reasons preserving first occurrence.
fn dedup_reasons(reasons: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    reasons
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaintenanceWindow, Shift, ShiftCalendar};
    use chrono::TimeZone;

    fn t(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, d, h, m, 0).unwrap()
    }

    /// Mon-Fri 08:00-17:00.
    fn weekday_center(id: &str) -> WorkCenter {
        WorkCenter::new(id, format!("Center {id}")).with_calendar(ShiftCalendar::new(
            (1..=5).map(|d| Shift::new(d, 8, 17)).collect(),
        ))
    }

    #[test]
    fn test_unchanged_schedule_produces_no_changes() {
        let wo = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 12, 0), 240);
        let input = ReflowInput::new(vec![wo], vec![weekday_center("wc")]);
        let out = ReflowEngine::new().run(&input).unwrap();
        assert!(out.changes.is_empty());
        assert_eq!(out.work_order("a").unwrap().end, t(9, 12, 0));
    }

    #[test]
    fn test_dependency_pushes_child() {
        // Parent grew into the child's planned slot.
        let parent = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 12, 0), 300);
        let child = WorkOrder::new("b", "WO-B", "wc", t(9, 12, 0), t(9, 14, 0), 120)
            .with_dependency("a");
        let input = ReflowInput::new(vec![parent, child], vec![weekday_center("wc")]);
        let out = ReflowEngine::new().run(&input).unwrap();

        let a = out.work_order("a").unwrap();
        let b = out.work_order("b").unwrap();
        assert_eq!(a.end, t(9, 13, 0));
        assert_eq!(b.start, t(9, 13, 0));
        assert_eq!(b.end, t(9, 15, 0));

        let change = out.change_for("b").unwrap();
        assert_eq!(change.start_delta_minutes, 60);
        assert!(change.reasons.iter().any(|r| r.contains("WO-A")));
    }

    #[test]
    fn test_child_listed_before_parent_still_ordered() {
        let child = WorkOrder::new("b", "WO-B", "wc", t(9, 12, 0), t(9, 14, 0), 120)
            .with_dependency("a");
        let parent = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 13, 0), 300);
        let input = ReflowInput::new(vec![child, parent], vec![weekday_center("wc")]);
        let out = ReflowEngine::new().run(&input).unwrap();
        let a = out.work_order("a").unwrap();
        let b = out.work_order("b").unwrap();
        assert!(a.end <= b.start);
    }

    #[test]
    fn test_fixed_maintenance_never_moves() {
        let fixed = WorkOrder::new("m", "WO-M", "wc", t(9, 8, 0), t(9, 9, 0), 60)
            .as_maintenance();
        // Planned on top of the fixed order: must be pushed after it.
        let prod = WorkOrder::new("p", "WO-P", "wc", t(9, 8, 0), t(9, 10, 0), 120);
        let input = ReflowInput::new(vec![fixed, prod], vec![weekday_center("wc")]);
        let out = ReflowEngine::new().run(&input).unwrap();

        let m = out.work_order("m").unwrap();
        assert_eq!((m.start, m.end), (t(9, 8, 0), t(9, 9, 0)));
        assert!(out.change_for("m").is_none());

        let p = out.work_order("p").unwrap();
        assert_eq!(p.start, t(9, 9, 0));
        assert_eq!(p.end, t(9, 11, 0));
    }

    #[test]
    fn test_maintenance_window_forces_push() {
        let wc = weekday_center("wc").with_maintenance(MaintenanceWindow::new(
            Interval::new(t(11, 10, 0), t(11, 12, 0)).unwrap(),
        ));
        let fixed = WorkOrder::new("m", "WO-FIXED-MAINT", "wc", t(11, 8, 0), t(11, 9, 0), 60)
            .as_maintenance();
        let prod = WorkOrder::new("p", "WO-PROD-1", "wc", t(11, 9, 0), t(11, 12, 0), 180)
            .with_dependency("m");
        let input = ReflowInput::new(vec![fixed, prod], vec![wc]);
        let out = ReflowEngine::new().run(&input).unwrap();

        let p = out.work_order("p").unwrap();
        assert_eq!(p.start, t(11, 12, 0));
        assert_eq!(p.end, t(11, 15, 0));
    }

    #[test]
    fn test_multi_parent_waits_for_latest() {
        let wc1 = weekday_center("wc1");
        let wc2 = weekday_center("wc2");
        let d = WorkOrder::new("d", "WO-D", "wc2", t(9, 8, 0), t(9, 10, 0), 120);
        let e = WorkOrder::new("e", "WO-E", "wc2", t(9, 10, 0), t(9, 14, 0), 180);
        let merge = WorkOrder::new("g", "WO-MERGE", "wc1", t(9, 8, 0), t(9, 9, 0), 60)
            .with_dependency("d")
            .with_dependency("e");
        let input = ReflowInput::new(vec![d, e, merge], vec![wc1, wc2]);
        let out = ReflowEngine::new().run(&input).unwrap();

        let e_end = out.work_order("e").unwrap().end;
        let g = out.work_order("g").unwrap();
        assert!(g.start >= e_end);
    }

    #[test]
    fn test_cycle_fails_with_all_members() {
        let a = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 9, 0), 60)
            .with_dependency("c");
        let b = WorkOrder::new("b", "WO-B", "wc", t(9, 9, 0), t(9, 10, 0), 60)
            .with_dependency("a");
        let c = WorkOrder::new("c", "WO-C", "wc", t(9, 10, 0), t(9, 11, 0), 60)
            .with_dependency("b");
        let input = ReflowInput::new(vec![a, b, c], vec![weekday_center("wc")]);
        let err = ReflowEngine::new().run(&input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains('a') && msg.contains('b') && msg.contains('c'));
    }

    #[test]
    fn test_unknown_work_center_rejected() {
        let wo = WorkOrder::new("a", "WO-A", "ghost", t(9, 8, 0), t(9, 9, 0), 60);
        let input = ReflowInput::new(vec![wo], vec![weekday_center("wc")]);
        let err = ReflowEngine::new().run(&input).unwrap_err();
        assert!(matches!(err, ReflowError::MissingWorkCenter { .. }));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let wo = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 9, 0), 60)
            .with_dependency("ghost");
        let input = ReflowInput::new(vec![wo], vec![weekday_center("wc")]);
        let err = ReflowEngine::new().run(&input).unwrap_err();
        assert!(matches!(err, ReflowError::MissingDependency { .. }));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let parent = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 12, 0), 300);
        let child = WorkOrder::new("b", "WO-B", "wc", t(9, 12, 0), t(9, 14, 0), 120)
            .with_dependency("a");
        let input = ReflowInput::new(vec![parent, child], vec![weekday_center("wc")]);
        let before = input.work_orders.clone();
        let _ = ReflowEngine::new().run(&input).unwrap();
        assert_eq!(input.work_orders, before);
    }

    #[test]
    fn test_no_work_order_moves_earlier() {
        let a = WorkOrder::new("a", "WO-A", "wc", t(9, 10, 0), t(9, 12, 0), 120);
        let b = WorkOrder::new("b", "WO-B", "wc", t(9, 13, 0), t(9, 14, 0), 60);
        let input = ReflowInput::new(vec![a, b], vec![weekday_center("wc")]);
        let out = ReflowEngine::new().run(&input).unwrap();
        assert!(out.work_order("a").unwrap().start >= t(9, 10, 0));
        assert!(out.work_order("b").unwrap().start >= t(9, 13, 0));
    }

    #[test]
    fn test_reflow_is_idempotent() {
        let wc = weekday_center("wc").with_maintenance(MaintenanceWindow::new(
            Interval::new(t(11, 10, 0), t(11, 12, 0)).unwrap(),
        ));
        let a = WorkOrder::new("a", "WO-A", "wc", t(11, 8, 0), t(11, 12, 0), 300);
        let b = WorkOrder::new("b", "WO-B", "wc", t(11, 9, 0), t(11, 11, 0), 120)
            .with_dependency("a");
        let input = ReflowInput::new(vec![a, b], vec![wc.clone()]);
        let first = ReflowEngine::new().run(&input).unwrap();

        let again = ReflowInput::new(first.updated_work_orders.clone(), vec![wc]);
        let second = ReflowEngine::new().run(&again).unwrap();
        assert!(second.changes.is_empty());
        assert_eq!(second.updated_work_orders, first.updated_work_orders);
    }

    #[test]
    fn test_explanation_has_two_sentences() {
        let wo = WorkOrder::new("a", "WO-A", "wc", t(9, 8, 0), t(9, 12, 0), 240);
        let input = ReflowInput::new(vec![wo], vec![weekday_center("wc")]);
        let out = ReflowEngine::new().run(&input).unwrap();
        assert_eq!(out.explanation.len(), 2);
        assert!(out.explanation[1].contains("topological"));
    }
}

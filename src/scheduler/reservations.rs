//! Per-work-center reservation ledger.
//!
//! Tracks every unavailable run on each work center as a sorted list of
//! merged reservations. The list is re-merged on every insertion, which
//! keeps it canonical: sorted ascending by start, non-overlapping, with
//! touching runs coalesced. Per-center counts are small in practice, so
//! the linear re-merge is the whole story.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ReflowError;
use crate::models::{
    merge_reservations, Interval, Reservation, ReservationKind, WorkCenter, WorkOrder,
};

/// The reservation table: work-center id → merged unavailable runs.
#[derive(Debug, Clone, Default)]
pub struct ReservationLedger {
    by_center: HashMap<String, Vec<Reservation>>,
}

impl ReservationLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the ledger with every work center's maintenance windows and
    /// the planned intervals of its immovable work orders.
    pub fn seed(
        work_centers: &[WorkCenter],
        work_orders: &[WorkOrder],
    ) -> Result<Self, ReflowError> {
        let mut ledger = Self::new();
        for wc in work_centers {
            let reservations = wc
                .maintenance_windows
                .iter()
                .map(|mw| Reservation::new(mw.interval, ReservationKind::MaintenanceWindow))
                .collect();
            ledger.by_center.insert(wc.id.clone(), reservations);
        }
        for wo in work_orders {
            if !wo.is_maintenance {
                continue;
            }
            let interval = wo
                .interval()
                .map_err(|err| ReflowError::for_work_order(&wo.number, err))?;
            ledger
                .by_center
                .entry(wo.work_center_id.clone())
                .or_default()
                .push(
                    Reservation::new(interval, ReservationKind::FixedMaintenance)
                        .with_source(wo.id.clone()),
                );
        }
        for reservations in ledger.by_center.values_mut() {
            *reservations = merge_reservations(reservations);
        }
        Ok(ledger)
    }

    /// Appends a reservation to a work center and re-merges its list.
    pub fn book(&mut self, work_center_id: &str, reservation: Reservation) {
        debug!(
            work_center = work_center_id,
            start = %reservation.interval.start,
            end = %reservation.interval.end,
            "booking reservation"
        );
        let reservations = self.by_center.entry(work_center_id.to_string()).or_default();
        reservations.push(reservation);
        *reservations = merge_reservations(reservations);
    }

    /// Merged reservations for a work center; empty when none exist.
    pub fn reservations(&self, work_center_id: &str) -> &[Reservation] {
        self.by_center
            .get(work_center_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The reservation intervals alone, in order. This is what the
    /// duration calculator consumes as blocks: kinds are already merged
    /// away, and every reservation blocks minute consumption equally.
    pub fn blocks(&self, work_center_id: &str) -> Vec<Interval> {
        self.reservations(work_center_id)
            .iter()
            .map(|r| r.interval)
            .collect()
    }
}

//! Scheduling domain models.
//!
//! Core data types for the reflow engine: half-open intervals and
//! reservations, shift calendars, work orders and work centers, and the
//! change records a reflow emits. All entities are created from input
//! and mutated only by the engine; nothing is destroyed.

mod calendar;
mod change;
mod interval;
pub mod timestamp;
mod work_center;
mod work_order;

pub use calendar::{Shift, ShiftCalendar, SNAP_HORIZON_DAYS};
pub(crate) use calendar::day_start;
pub use change::{ChangeRecord, ReflowOutput};
pub use interval::{
    first_overlap, merge_reservations, sort_reservations, subtract, Interval, Reservation,
    ReservationKind,
};
pub use work_center::{MaintenanceWindow, WorkCenter};
pub use work_order::WorkOrder;

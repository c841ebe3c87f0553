//! Structural input validation.
//!
//! Checks the integrity of a reflow input before the engine runs.
//! Detects:
//! - Duplicate work-order / work-center IDs
//! - References to unknown work centers or parent work orders
//! - Non-positive durations
//! - Shift fields out of range (day 0–6, hours 0–23) and overnight shifts
//! - Maintenance windows and planned intervals with `end <= start`
//!
//! All problems are collected and returned together so callers can fix
//! a payload in one pass. Cycle detection is deliberately left to the
//! engine's topological sort, which reports the full residual set.

use std::collections::HashSet;

use crate::models::{WorkCenter, WorkOrder};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A work order references a work center that doesn't exist.
    UnknownWorkCenter,
    /// A work order references a parent that doesn't exist.
    UnknownDependency,
    /// A duration is zero or negative.
    NonPositiveDuration,
    /// A shift has out-of-range fields or spans midnight.
    InvalidShift,
    /// A maintenance window or planned interval has `end <= start`.
    InvalidInterval,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input for a reflow call.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with every detected issue.
pub fn validate_input(work_orders: &[WorkOrder], work_centers: &[WorkCenter]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut center_ids = HashSet::new();
    for wc in work_centers {
        if !center_ids.insert(wc.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate work center ID: {}", wc.id),
            ));
        }

        for shift in wc.calendar.shifts() {
            if shift.day_of_week > 6 || shift.start_hour > 23 || shift.end_hour > 23 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidShift,
                    format!(
                        "Work center '{}' has a shift with out-of-range fields \
                         (day {}, {:02}:00-{:02}:00)",
                        wc.id, shift.day_of_week, shift.start_hour, shift.end_hour
                    ),
                ));
            } else if shift.end_hour <= shift.start_hour {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidShift,
                    format!(
                        "Work center '{}' has an overnight or zero-length shift \
                         ({:02}:00-{:02}:00 on day {})",
                        wc.id, shift.start_hour, shift.end_hour, shift.day_of_week
                    ),
                ));
            }
        }

        for mw in &wc.maintenance_windows {
            if mw.interval.end <= mw.interval.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidInterval,
                    format!(
                        "Work center '{}' has a maintenance window ending at or \
                         before its start",
                        wc.id
                    ),
                ));
            }
        }
    }

    let mut order_ids = HashSet::new();
    for wo in work_orders {
        if !order_ids.insert(wo.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate work order ID: {}", wo.id),
            ));
        }

        if !center_ids.contains(wo.work_center_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownWorkCenter,
                format!(
                    "Work order '{}' references unknown work center '{}'",
                    wo.number, wo.work_center_id
                ),
            ));
        }

        if wo.duration_minutes <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!(
                    "Work order '{}' has non-positive duration {}",
                    wo.number, wo.duration_minutes
                ),
            ));
        }

        if wo.end <= wo.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!(
                    "Work order '{}' has a planned end at or before its start",
                    wo.number
                ),
            ));
        }
    }

    // Dependency references, once all IDs are known.
    let all_ids: HashSet<&str> = work_orders.iter().map(|wo| wo.id.as_str()).collect();
    for wo in work_orders {
        for parent in &wo.depends_on {
            if !all_ids.contains(parent.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDependency,
                    format!(
                        "Work order '{}' depends on unknown work order '{}'",
                        wo.number, parent
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

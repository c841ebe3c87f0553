//! JSON document payload loading and saving.
//!
//! The wire format is a document envelope `{docId, docType, data}` per
//! entity. Recognized docTypes are `workOrder`, `workCenter`, and
//! `manufacturingOrder`; the last is carried through without ever being
//! consulted. All timestamps are ISO-8601 UTC with millisecond
//! precision.
//!
//! Conversion to domain models is where the envelope checks happen; the
//! structural validation in [`crate::validation`] then runs over the
//! domain models themselves.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReflowError;
use crate::models::timestamp::utc_millis;
use crate::models::{
    ChangeRecord, Interval, MaintenanceWindow, ReflowOutput, Shift, ShiftCalendar, WorkCenter,
    WorkOrder,
};
use crate::scheduler::ReflowInput;

pub const DOC_TYPE_WORK_ORDER: &str = "workOrder";
pub const DOC_TYPE_WORK_CENTER: &str = "workCenter";
pub const DOC_TYPE_MANUFACTURING_ORDER: &str = "manufacturingOrder";

/// A document envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<T> {
    pub doc_id: String,
    pub doc_type: String,
    pub data: T,
}

/// Work-order document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderData {
    pub work_order_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing_order_id: Option<String>,
    pub work_center_id: String,
    #[serde(with = "utc_millis")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "utc_millis")]
    pub end_date: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_maintenance: bool,
    #[serde(default)]
    pub depends_on_work_order_ids: Vec<String>,
}

/// Maintenance-window document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowData {
    #[serde(with = "utc_millis")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "utc_millis")]
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Work-center document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCenterData {
    pub name: String,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindowData>,
}

/// The full input payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPayload {
    pub work_orders: Vec<Document<WorkOrderData>>,
    pub work_centers: Vec<Document<WorkCenterData>>,
    /// Carried through; never consulted by the engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manufacturing_orders: Vec<Document<serde_json::Value>>,
}

/// The full output payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPayload {
    pub updated_work_orders: Vec<Document<WorkOrderData>>,
    pub changes: Vec<ChangeRecord>,
    pub explanation: Vec<String>,
}

impl InputPayload {
    /// Converts the payload into domain models for the engine.
    pub fn to_reflow_input(&self) -> Result<ReflowInput, ReflowError> {
        for doc in &self.manufacturing_orders {
            expect_doc_type(&doc.doc_type, DOC_TYPE_MANUFACTURING_ORDER, &doc.doc_id)?;
        }

        let mut work_orders = Vec::with_capacity(self.work_orders.len());
        for doc in &self.work_orders {
            expect_doc_type(&doc.doc_type, DOC_TYPE_WORK_ORDER, &doc.doc_id)?;
            work_orders.push(work_order_from_document(doc));
        }

        let mut work_centers = Vec::with_capacity(self.work_centers.len());
        for doc in &self.work_centers {
            expect_doc_type(&doc.doc_type, DOC_TYPE_WORK_CENTER, &doc.doc_id)?;
            let mut wc = WorkCenter::new(doc.doc_id.clone(), doc.data.name.clone())
                .with_calendar(ShiftCalendar::new(doc.data.shifts.clone()));
            for mw in &doc.data.maintenance_windows {
                let interval = Interval::new(mw.start_date, mw.end_date)?;
                wc.maintenance_windows.push(MaintenanceWindow {
                    interval,
                    reason: mw.reason.clone(),
                });
            }
            work_centers.push(wc);
        }

        Ok(ReflowInput::new(work_orders, work_centers))
    }
}

impl OutputPayload {
    /// Builds the wire payload from an engine result.
    pub fn from_output(output: &ReflowOutput) -> Self {
        Self {
            updated_work_orders: output
                .updated_work_orders
                .iter()
                .map(work_order_to_document)
                .collect(),
            changes: output.changes.clone(),
            explanation: output.explanation.clone(),
        }
    }
}

fn expect_doc_type(actual: &str, expected: &str, doc_id: &str) -> Result<(), ReflowError> {
    if actual != expected {
        return Err(ReflowError::InvalidInput(format!(
            "document '{doc_id}' has docType '{actual}', expected '{expected}'"
        )));
    }
    Ok(())
}

fn work_order_from_document(doc: &Document<WorkOrderData>) -> WorkOrder {
    WorkOrder {
        id: doc.doc_id.clone(),
        number: doc.data.work_order_number.clone(),
        manufacturing_order_id: doc.data.manufacturing_order_id.clone(),
        work_center_id: doc.data.work_center_id.clone(),
        start: doc.data.start_date,
        end: doc.data.end_date,
        duration_minutes: doc.data.duration_minutes,
        is_maintenance: doc.data.is_maintenance,
        depends_on: doc.data.depends_on_work_order_ids.clone(),
    }
}

fn work_order_to_document(wo: &WorkOrder) -> Document<WorkOrderData> {
    Document {
        doc_id: wo.id.clone(),
        doc_type: DOC_TYPE_WORK_ORDER.to_string(),
        data: WorkOrderData {
            work_order_number: wo.number.clone(),
            manufacturing_order_id: wo.manufacturing_order_id.clone(),
            work_center_id: wo.work_center_id.clone(),
            start_date: wo.start,
            end_date: wo.end,
            duration_minutes: wo.duration_minutes,
            is_maintenance: wo.is_maintenance,
            depends_on_work_order_ids: wo.depends_on.clone(),
        },
    }
}

/// Parses an input payload from a JSON string.
pub fn load_input_from_str(json: &str) -> Result<InputPayload, ReflowError> {
    Ok(serde_json::from_str(json)?)
}

/// Loads an input payload from a JSON file.
pub fn load_input_from_json<P: AsRef<Path>>(path: P) -> Result<InputPayload, ReflowError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Writes an output payload as pretty JSON.
pub fn save_output_to_json<P: AsRef<Path>>(
    payload: &OutputPayload,
    path: P,
) -> Result<(), ReflowError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ReflowEngine;

    const SAMPLE: &str = r#"{
        "workOrders": [
            {
                "docId": "wo-a",
                "docType": "workOrder",
                "data": {
                    "workOrderNumber": "WO-A",
                    "manufacturingOrderId": "mo-1",
                    "workCenterId": "wc-1",
                    "startDate": "2026-02-09T08:00:00.000Z",
                    "endDate": "2026-02-09T12:00:00.000Z",
                    "durationMinutes": 240,
                    "isMaintenance": false
                }
            },
            {
                "docId": "wo-b",
                "docType": "workOrder",
                "data": {
                    "workOrderNumber": "WO-B",
                    "workCenterId": "wc-1",
                    "startDate": "2026-02-09T12:00:00.000Z",
                    "endDate": "2026-02-09T14:00:00.000Z",
                    "durationMinutes": 120,
                    "isMaintenance": false,
                    "dependsOnWorkOrderIds": ["wo-a"]
                }
            }
        ],
        "workCenters": [
            {
                "docId": "wc-1",
                "docType": "workCenter",
                "data": {
                    "name": "Line 1",
                    "shifts": [
                        {"dayOfWeek": 1, "startHour": 8, "endHour": 17}
                    ],
                    "maintenanceWindows": [
                        {
                            "startDate": "2026-02-09T15:00:00.000Z",
                            "endDate": "2026-02-09T16:00:00.000Z",
                            "reason": "calibration"
                        }
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_payload() {
        let payload = load_input_from_str(SAMPLE).unwrap();
        assert_eq!(payload.work_orders.len(), 2);
        assert_eq!(payload.work_centers.len(), 1);
        assert!(payload.manufacturing_orders.is_empty());

        let input = payload.to_reflow_input().unwrap();
        assert_eq!(input.work_orders[0].number, "WO-A");
        assert_eq!(input.work_orders[1].depends_on, vec!["wo-a".to_string()]);
        assert_eq!(input.work_centers[0].name, "Line 1");
        assert_eq!(input.work_centers[0].calendar.shifts().len(), 1);
        assert_eq!(
            input.work_centers[0].maintenance_windows[0]
                .reason
                .as_deref(),
            Some("calibration")
        );
    }

    #[test]
    fn test_unrecognized_doc_type_rejected() {
        let payload = load_input_from_str(&SAMPLE.replace(
            r#""docType": "workCenter""#,
            r#""docType": "machine""#,
        ))
        .unwrap();
        let err = payload.to_reflow_input().unwrap_err();
        assert!(matches!(err, ReflowError::InvalidInput(_)));
        assert!(err.to_string().contains("machine"));
    }

    #[test]
    fn test_inverted_maintenance_window_rejected() {
        let swapped = SAMPLE
            .replace(
                r#""startDate": "2026-02-09T15:00:00.000Z""#,
                r#""startDate": "2026-02-09T16:30:00.000Z""#,
            );
        let payload = load_input_from_str(&swapped).unwrap();
        assert!(matches!(
            payload.to_reflow_input().unwrap_err(),
            ReflowError::InvalidInterval { .. }
        ));
    }

    #[test]
    fn test_output_payload_wire_shape() {
        let input = load_input_from_str(SAMPLE).unwrap().to_reflow_input().unwrap();
        let output = ReflowEngine::new().run(&input).unwrap();
        let payload = OutputPayload::from_output(&output);

        let value = serde_json::to_value(&payload).unwrap();
        let orders = value["updatedWorkOrders"].as_array().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0]["docType"], "workOrder");
        let start = orders[0]["data"]["startDate"].as_str().unwrap();
        assert!(start.ends_with('Z') && start.contains('.'));
        assert!(value["explanation"].as_array().unwrap().len() == 2);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let in_path = dir.path().join("input.json");
        std::fs::write(&in_path, SAMPLE).unwrap();

        let payload = load_input_from_json(&in_path).unwrap();
        let input = payload.to_reflow_input().unwrap();
        let output = ReflowEngine::new().run(&input).unwrap();

        let out_path = dir.path().join("output.json");
        save_output_to_json(&OutputPayload::from_output(&output), &out_path).unwrap();

        let written: OutputPayload =
            serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(written.updated_work_orders.len(), 2);
        assert_eq!(written.explanation.len(), 2);
    }

    #[test]
    fn test_malformed_json_is_a_payload_error() {
        assert!(matches!(
            load_input_from_str("{not json").unwrap_err(),
            ReflowError::Json(_)
        ));
    }
}

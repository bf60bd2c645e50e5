//! Maintenance record payloads and representation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use medtrack_core::maintenance::{COST_DIGITS, PERFORMED_BY_MAX};
use medtrack_core::{FieldErrors, MaintenanceDraft, MaintenanceRecord, MaintenanceType, RecordId};

use super::device::required;
use super::payload::{FieldReader, WriteMode};

#[derive(Debug, Default)]
pub struct MaintenanceChanges {
    pub device: Option<RecordId>,
    pub maintenance_type: Option<MaintenanceType>,
    pub maintenance_date: Option<NaiveDate>,
    pub performed_by: Option<String>,
    pub description: Option<String>,
    pub cost: Option<Option<Decimal>>,
    pub next_maintenance_due: Option<Option<NaiveDate>>,
}

impl MaintenanceChanges {
    pub fn read(body: &Map<String, Value>, mode: WriteMode) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body, mode);
        reader.reject_read_only(&["created_at"]);

        let changes = Self {
            device: reader.reference("device"),
            maintenance_type: reader.choice("maintenance_type", true),
            maintenance_date: reader.date("maintenance_date"),
            performed_by: reader.text("performed_by", Some(PERFORMED_BY_MAX)),
            description: reader.text("description", None),
            cost: reader.nullable_decimal("cost", COST_DIGITS),
            next_maintenance_due: reader.nullable_date("next_maintenance_due"),
        };

        reader.finish()?;
        Ok(changes)
    }

    pub fn into_new_draft(self) -> Result<MaintenanceDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let device = required(&mut errors, "device", self.device);
        let maintenance_type = required(&mut errors, "maintenance_type", self.maintenance_type);
        let maintenance_date = required(&mut errors, "maintenance_date", self.maintenance_date);
        let performed_by = required(&mut errors, "performed_by", self.performed_by);
        let description = required(&mut errors, "description", self.description);

        match (device, maintenance_type, maintenance_date, performed_by, description) {
            (
                Some(device),
                Some(maintenance_type),
                Some(maintenance_date),
                Some(performed_by),
                Some(description),
            ) => Ok(MaintenanceDraft {
                device,
                maintenance_type,
                maintenance_date,
                performed_by,
                description,
                cost: self.cost.flatten(),
                next_maintenance_due: self.next_maintenance_due.flatten(),
            }),
            _ => Err(errors),
        }
    }

    pub fn apply(self, draft: &mut MaintenanceDraft) {
        if let Some(v) = self.device {
            draft.device = v;
        }
        if let Some(v) = self.maintenance_type {
            draft.maintenance_type = v;
        }
        if let Some(v) = self.maintenance_date {
            draft.maintenance_date = v;
        }
        if let Some(v) = self.performed_by {
            draft.performed_by = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        if let Some(v) = self.cost {
            draft.cost = v;
        }
        if let Some(v) = self.next_maintenance_due {
            draft.next_maintenance_due = v;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    pub id: RecordId,
    pub device: RecordId,
    pub maintenance_type: MaintenanceType,
    pub maintenance_date: NaiveDate,
    pub performed_by: String,
    pub description: String,
    pub cost: Option<Decimal>,
    pub next_maintenance_due: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<MaintenanceRecord> for MaintenanceResponse {
    fn from(r: MaintenanceRecord) -> Self {
        Self {
            id: r.id,
            device: r.device,
            maintenance_type: r.maintenance_type,
            maintenance_date: r.maintenance_date,
            performed_by: r.performed_by,
            description: r.description,
            cost: r.cost,
            next_maintenance_due: r.next_maintenance_due,
            created_at: r.created_at,
        }
    }
}

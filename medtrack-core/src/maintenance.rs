//! Maintenance records, owned by a device

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::choices::MaintenanceType;
use crate::RecordId;

pub const PERFORMED_BY_MAX: usize = 200;

/// `NUMERIC(10, 2)`
pub const COST_DIGITS: (u32, u32) = (10, 2);

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceRecord {
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

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceDraft {
    pub device: RecordId,
    pub maintenance_type: MaintenanceType,
    pub maintenance_date: NaiveDate,
    pub performed_by: String,
    pub description: String,
    pub cost: Option<Decimal>,
    pub next_maintenance_due: Option<NaiveDate>,
}

impl MaintenanceRecord {
    pub fn from_draft(id: RecordId, draft: MaintenanceDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            device: draft.device,
            maintenance_type: draft.maintenance_type,
            maintenance_date: draft.maintenance_date,
            performed_by: draft.performed_by,
            description: draft.description,
            cost: draft.cost,
            next_maintenance_due: draft.next_maintenance_due,
            created_at: now,
        }
    }

    pub fn to_draft(&self) -> MaintenanceDraft {
        MaintenanceDraft {
            device: self.device,
            maintenance_type: self.maintenance_type,
            maintenance_date: self.maintenance_date,
            performed_by: self.performed_by.clone(),
            description: self.description.clone(),
            cost: self.cost,
            next_maintenance_due: self.next_maintenance_due,
        }
    }
}

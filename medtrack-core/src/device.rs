//! Device: a tracked unit of medical equipment

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::choices::{DeviceStatus, DeviceType};
use crate::RecordId;

pub const NAME_MAX: usize = 200;
pub const MANUFACTURER_MAX: usize = 100;
pub const MODEL_NUMBER_MAX: usize = 100;
pub const SERIAL_NUMBER_MAX: usize = 100;
pub const LOCATION_MAX: usize = 200;

/// `NUMERIC(12, 2)`
pub const PURCHASE_PRICE_DIGITS: (u32, u32) = (12, 2);

/// Device record as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: RecordId,
    pub name: String,
    pub device_type: DeviceType,
    pub manufacturer: String,
    pub model_number: String,
    /// Unique across all devices
    pub serial_number: String,
    pub location: String,
    pub status: DeviceStatus,
    pub acquisition_date: NaiveDate,
    pub warranty_expiration: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub description: String,
    pub purchase_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every client-writable device field, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDraft {
    pub name: String,
    pub device_type: DeviceType,
    pub manufacturer: String,
    pub model_number: String,
    pub serial_number: String,
    pub location: String,
    pub status: DeviceStatus,
    pub acquisition_date: NaiveDate,
    pub warranty_expiration: Option<NaiveDate>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub description: String,
    pub purchase_price: Option<Decimal>,
}

impl Device {
    /// Materialize a draft as a new record.
    pub fn from_draft(id: RecordId, draft: DeviceDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            device_type: draft.device_type,
            manufacturer: draft.manufacturer,
            model_number: draft.model_number,
            serial_number: draft.serial_number,
            location: draft.location,
            status: draft.status,
            acquisition_date: draft.acquisition_date,
            warranty_expiration: draft.warranty_expiration,
            last_maintenance_date: draft.last_maintenance_date,
            next_maintenance_date: draft.next_maintenance_date,
            description: draft.description,
            purchase_price: draft.purchase_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the writable fields, keeping id and created_at.
    ///
    /// `updated_at` moves strictly forward even if the clock has not.
    pub fn apply_draft(&mut self, draft: DeviceDraft, now: DateTime<Utc>) {
        let created_at = self.created_at;
        let previous = self.updated_at;
        *self = Self::from_draft(self.id, draft, now);
        self.created_at = created_at;
        self.updated_at = if now > previous {
            now
        } else {
            previous + chrono::Duration::microseconds(1)
        };
    }

    /// The writable part of this record.
    pub fn to_draft(&self) -> DeviceDraft {
        DeviceDraft {
            name: self.name.clone(),
            device_type: self.device_type,
            manufacturer: self.manufacturer.clone(),
            model_number: self.model_number.clone(),
            serial_number: self.serial_number.clone(),
            location: self.location.clone(),
            status: self.status,
            acquisition_date: self.acquisition_date,
            warranty_expiration: self.warranty_expiration,
            last_maintenance_date: self.last_maintenance_date,
            next_maintenance_date: self.next_maintenance_date,
            description: self.description.clone(),
            purchase_price: self.purchase_price,
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.serial_number)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::draft;
    use super::*;

    #[test]
    fn apply_draft_keeps_identity() {
        let t0 = Utc::now();
        let mut device = Device::from_draft(7, draft("SN-1"), t0);

        let mut changed = device.to_draft();
        changed.location = "OR 2".into();
        device.apply_draft(changed, t0 + chrono::Duration::seconds(5));

        assert_eq!(device.id, 7);
        assert_eq!(device.created_at, t0);
        assert_eq!(device.location, "OR 2");
        assert_eq!(device.updated_at, t0 + chrono::Duration::seconds(5));
    }

    #[test]
    fn updated_at_is_strictly_monotonic() {
        let t0 = Utc::now();
        let mut device = Device::from_draft(1, draft("SN-1"), t0);
        // clock did not move (or went backwards)
        device.apply_draft(device.to_draft(), t0 - chrono::Duration::seconds(1));
        assert!(device.updated_at > t0);
    }

    #[test]
    fn display_uses_name_and_serial() {
        let device = Device::from_draft(1, draft("SN-42"), Utc::now());
        assert_eq!(device.to_string(), "Servo-i - SN-42");
    }
}

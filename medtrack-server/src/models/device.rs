//! Device write payloads and response representations

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use medtrack_core::device::{
    LOCATION_MAX, MANUFACTURER_MAX, MODEL_NUMBER_MAX, NAME_MAX, PURCHASE_PRICE_DIGITS,
    SERIAL_NUMBER_MAX,
};
use medtrack_core::{
    Device, DeviceDocument, DeviceDraft, DeviceStatus, DeviceType, FieldErrors,
    MaintenanceRecord, RecordId, ValidationError,
};

use super::document::DocumentResponse;
use super::maintenance::MaintenanceResponse;
use super::payload::{FieldReader, WriteMode};

/// Fields a client may not set on a device.
///
/// `id`, `maintenance_records` and `documents` are silently ignored instead.
const READ_ONLY: &[&str] = &["created_at", "updated_at"];

/// Validated subset of device fields present in a request.
#[derive(Debug, Default)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub device_type: Option<DeviceType>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub status: Option<DeviceStatus>,
    pub acquisition_date: Option<NaiveDate>,
    pub warranty_expiration: Option<Option<NaiveDate>>,
    pub last_maintenance_date: Option<Option<NaiveDate>>,
    pub next_maintenance_date: Option<Option<NaiveDate>>,
    pub description: Option<String>,
    pub purchase_price: Option<Option<Decimal>>,
}

impl DeviceChanges {
    pub fn read(body: &Map<String, Value>, mode: WriteMode) -> Result<Self, FieldErrors> {
        let mut reader = FieldReader::new(body, mode);
        reader.reject_read_only(READ_ONLY);

        let changes = Self {
            name: reader.text("name", Some(NAME_MAX)),
            device_type: reader.choice("device_type", true),
            manufacturer: reader.text("manufacturer", Some(MANUFACTURER_MAX)),
            model_number: reader.text("model_number", Some(MODEL_NUMBER_MAX)),
            serial_number: reader.text("serial_number", Some(SERIAL_NUMBER_MAX)),
            location: reader.text("location", Some(LOCATION_MAX)),
            status: reader.choice("status", false),
            acquisition_date: reader.date("acquisition_date"),
            warranty_expiration: reader.nullable_date("warranty_expiration"),
            last_maintenance_date: reader.nullable_date("last_maintenance_date"),
            next_maintenance_date: reader.nullable_date("next_maintenance_date"),
            description: reader.blank_text("description", None),
            purchase_price: reader.nullable_decimal("purchase_price", PURCHASE_PRICE_DIGITS),
        };

        reader.finish()?;
        Ok(changes)
    }

    /// Draft for a new device. Omitted optional fields take their defaults.
    pub fn into_new_draft(self) -> Result<DeviceDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name", self.name);
        let device_type = required(&mut errors, "device_type", self.device_type);
        let manufacturer = required(&mut errors, "manufacturer", self.manufacturer);
        let model_number = required(&mut errors, "model_number", self.model_number);
        let serial_number = required(&mut errors, "serial_number", self.serial_number);
        let location = required(&mut errors, "location", self.location);
        let acquisition_date = required(&mut errors, "acquisition_date", self.acquisition_date);

        match (
            name,
            device_type,
            manufacturer,
            model_number,
            serial_number,
            location,
            acquisition_date,
        ) {
            (
                Some(name),
                Some(device_type),
                Some(manufacturer),
                Some(model_number),
                Some(serial_number),
                Some(location),
                Some(acquisition_date),
            ) => Ok(DeviceDraft {
                name,
                device_type,
                manufacturer,
                model_number,
                serial_number,
                location,
                status: self.status.unwrap_or_default(),
                acquisition_date,
                warranty_expiration: self.warranty_expiration.flatten(),
                last_maintenance_date: self.last_maintenance_date.flatten(),
                next_maintenance_date: self.next_maintenance_date.flatten(),
                description: self.description.unwrap_or_default(),
                purchase_price: self.purchase_price.flatten(),
            }),
            _ => Err(errors),
        }
    }

    /// Overwrite the fields present in this change-set.
    pub fn apply(self, draft: &mut DeviceDraft) {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.device_type {
            draft.device_type = v;
        }
        if let Some(v) = self.manufacturer {
            draft.manufacturer = v;
        }
        if let Some(v) = self.model_number {
            draft.model_number = v;
        }
        if let Some(v) = self.serial_number {
            draft.serial_number = v;
        }
        if let Some(v) = self.location {
            draft.location = v;
        }
        if let Some(v) = self.status {
            draft.status = v;
        }
        if let Some(v) = self.acquisition_date {
            draft.acquisition_date = v;
        }
        if let Some(v) = self.warranty_expiration {
            draft.warranty_expiration = v;
        }
        if let Some(v) = self.last_maintenance_date {
            draft.last_maintenance_date = v;
        }
        if let Some(v) = self.next_maintenance_date {
            draft.next_maintenance_date = v;
        }
        if let Some(v) = self.description {
            draft.description = v;
        }
        if let Some(v) = self.purchase_price {
            draft.purchase_price = v;
        }
    }
}

/// Record a `Required` error when a create lacks a field.
pub(crate) fn required<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<T>,
) -> Option<T> {
    if value.is_none() {
        errors.push(ValidationError::Required { field });
    }
    value
}

/// Full device representation, with its records and documents.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceResponse {
    pub id: RecordId,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub maintenance_records: Vec<MaintenanceResponse>,
    pub documents: Vec<DocumentResponse>,
}

impl DeviceResponse {
    pub fn assemble(
        device: Device,
        maintenance_records: Vec<MaintenanceRecord>,
        documents: Vec<DeviceDocument>,
    ) -> Self {
        Self {
            id: device.id,
            name: device.name,
            device_type: device.device_type,
            manufacturer: device.manufacturer,
            model_number: device.model_number,
            serial_number: device.serial_number,
            location: device.location,
            status: device.status,
            acquisition_date: device.acquisition_date,
            warranty_expiration: device.warranty_expiration,
            last_maintenance_date: device.last_maintenance_date,
            next_maintenance_date: device.next_maintenance_date,
            description: device.description,
            purchase_price: device.purchase_price,
            created_at: device.created_at,
            updated_at: device.updated_at,
            maintenance_records: maintenance_records
                .into_iter()
                .map(MaintenanceResponse::from)
                .collect(),
            documents: documents.into_iter().map(DocumentResponse::from).collect(),
        }
    }
}

/// Reduced device view for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceListItem {
    pub id: RecordId,
    pub name: String,
    pub device_type: DeviceType,
    pub manufacturer: String,
    pub serial_number: String,
    pub location: String,
    pub status: DeviceStatus,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
}

impl From<Device> for DeviceListItem {
    fn from(d: Device) -> Self {
        Self {
            id: d.id,
            name: d.name,
            device_type: d.device_type,
            manufacturer: d.manufacturer,
            serial_number: d.serial_number,
            location: d.location,
            status: d.status,
            last_maintenance_date: d.last_maintenance_date,
            next_maintenance_date: d.next_maintenance_date,
        }
    }
}

//! Display labels for coded values
//!
//! Presentation only: storage and the wire always use codes.

use serde::Serialize;

use crate::choices::{DeviceStatus, DeviceType, DocumentType, MaintenanceType};

/// Types with a human-readable label per code.
pub trait Labeled: Copy + 'static {
    fn label(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

impl Labeled for DeviceType {
    fn label(&self) -> &'static str {
        match self {
            DeviceType::InfusionPump => "Infusion Pump",
            DeviceType::Ventilator => "Ventilator",
            DeviceType::EcgMachine => "ECG Machine",
            DeviceType::Monitor => "Vital Signs Monitor",
            DeviceType::Defibrillator => "Defibrillator",
            DeviceType::Ultrasound => "Ultrasound",
            DeviceType::Xray => "X-Ray",
            DeviceType::Mri => "Magnetic Resonance Imaging",
            DeviceType::CtScanner => "CT Scanner",
            DeviceType::Anesthesia => "Anesthesia Equipment",
        }
    }

    fn code(&self) -> &'static str {
        self.as_code()
    }
}

impl Labeled for DeviceStatus {
    fn label(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "Active",
            DeviceStatus::InMaintenance => "In Maintenance",
            DeviceStatus::InRepair => "In Repair",
            DeviceStatus::Decommissioned => "Decommissioned",
            DeviceStatus::Available => "Available",
            DeviceStatus::InUse => "In Use",
        }
    }

    fn code(&self) -> &'static str {
        self.as_code()
    }
}

impl Labeled for MaintenanceType {
    fn label(&self) -> &'static str {
        match self {
            MaintenanceType::Preventive => "Preventive",
            MaintenanceType::Corrective => "Corrective",
            MaintenanceType::Calibration => "Calibration",
            MaintenanceType::Inspection => "Inspection",
        }
    }

    fn code(&self) -> &'static str {
        self.as_code()
    }
}

impl Labeled for DocumentType {
    fn label(&self) -> &'static str {
        match self {
            DocumentType::Manual => "Manual",
            DocumentType::Warranty => "Warranty",
            DocumentType::Certificate => "Certificate",
            DocumentType::Invoice => "Invoice",
            DocumentType::Other => "Other",
        }
    }

    fn code(&self) -> &'static str {
        self.as_code()
    }
}

/// One `{code, label}` entry of a choice table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

/// Build the choice table for a set of values.
pub fn choices<T: Labeled>(values: &[T]) -> Vec<Choice> {
    values
        .iter()
        .map(|v| Choice {
            code: v.code(),
            label: v.label(),
        })
        .collect()
}

/// Choice tables for every coded field.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceTables {
    pub device_type: Vec<Choice>,
    pub status: Vec<Choice>,
    pub maintenance_type: Vec<Choice>,
    pub document_type: Vec<Choice>,
}

impl ChoiceTables {
    pub fn build() -> Self {
        Self {
            device_type: choices(DeviceType::ALL),
            status: choices(DeviceStatus::ALL),
            maintenance_type: choices(MaintenanceType::ALL),
            document_type: choices(DocumentType::ALL),
        }
    }
}

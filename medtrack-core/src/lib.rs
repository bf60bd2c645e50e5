//! medtrack-core: domain model for the medical device tracker
//!
//! Holds everything that does not depend on a database or on HTTP:
//! - closed enums for the coded fields and their display labels
//! - persisted records and the validated drafts written to storage
//! - filter specifications handed to the persistence layer
//! - the statistics snapshot and its reference computation
//! - configuration loading

pub mod choices;
pub mod config;
pub mod device;
pub mod document;
pub mod filter;
pub mod labels;
pub mod maintenance;
pub mod statistics;
pub mod validation;

pub use choices::{DeviceStatus, DeviceType, DocumentType, MaintenanceType};
pub use config::{ConfigError, MedtrackConfig};
pub use device::{Device, DeviceDraft};
pub use document::{DeviceDocument, DocumentDraft};
pub use filter::{DeviceFilter, RecordFilter};
pub use maintenance::{MaintenanceDraft, MaintenanceRecord};
pub use statistics::{DeviceStatistics, DueWindow};
pub use validation::{FieldErrors, ValidationError};

/// Identifier assigned by the store to every persisted row.
pub type RecordId = i64;

//! Request and response models
//!
//! Write payloads are read field by field into change-sets (see
//! [`payload`]); responses are plain `Serialize` structs built from the
//! core records.

pub mod device;
pub mod document;
pub mod maintenance;
pub mod pagination;
pub mod payload;
pub mod query;

pub use device::{DeviceChanges, DeviceListItem, DeviceResponse};
pub use document::{DocumentChanges, DocumentResponse};
pub use maintenance::{MaintenanceChanges, MaintenanceResponse};
pub use pagination::{InvalidPage, ListBody, Paginated, Pagination};
pub use payload::{FieldReader, WriteMode};
pub use query::{DeviceListParams, RecordListParams};

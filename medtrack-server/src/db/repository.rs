//! Repository traits for the three entities and the statistics snapshot
//!
//! Implementations: [`super::PgStore`] (PostgreSQL) and
//! [`super::MemoryStore`] (in-process, for local runs and tests). Both must
//! enforce the same rules:
//! - serial_number unique across devices
//! - maintenance records and documents reference an existing device
//! - deleting a device removes its dependents in the same atomic step
//! - default ordering: devices by created_at desc, maintenance by
//!   maintenance_date desc, documents by upload_date desc (ties by id desc)

use async_trait::async_trait;

use medtrack_core::statistics::StatisticsQuery;
use medtrack_core::{
    Device, DeviceDocument, DeviceDraft, DeviceFilter, DeviceStatistics, DocumentDraft,
    MaintenanceDraft, MaintenanceRecord, RecordFilter, RecordId,
};

use crate::models::Pagination;

pub type DbResult<T> = Result<T, DbError>;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: RecordId },

    #[error("{resource} with this {field} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
    },

    #[error("referenced {field} '{id}' does not exist")]
    MissingReference { field: &'static str, id: RecordId },

    #[error("corrupt {column} value in storage: '{value}'")]
    Corrupt { column: &'static str, value: String },
}

/// One page (or all) of a filtered listing.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Rows matching the filter, ignoring pagination
    pub total: i64,
}

impl<T> Listing<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Dependents removed together with a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub maintenance_records: u64,
    pub documents: u64,
}

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Devices matching `filter`, newest first.
    async fn list_devices(
        &self,
        filter: &DeviceFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<Device>>;

    async fn get_device(&self, id: RecordId) -> DbResult<Device>;

    /// Insert a device; `DbError::Conflict` on a duplicate serial number.
    async fn create_device(&self, draft: DeviceDraft) -> DbResult<Device>;

    /// Overwrite all writable fields and refresh updated_at.
    async fn update_device(&self, id: RecordId, draft: DeviceDraft) -> DbResult<Device>;

    /// Delete a device and everything it owns, all or nothing.
    async fn delete_device(&self, id: RecordId) -> DbResult<CascadeSummary>;
}

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn list_maintenance(
        &self,
        filter: &RecordFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<MaintenanceRecord>>;

    async fn get_maintenance(&self, id: RecordId) -> DbResult<MaintenanceRecord>;

    /// `DbError::MissingReference` if the device does not exist.
    async fn create_maintenance(&self, draft: MaintenanceDraft) -> DbResult<MaintenanceRecord>;

    async fn update_maintenance(
        &self,
        id: RecordId,
        draft: MaintenanceDraft,
    ) -> DbResult<MaintenanceRecord>;

    async fn delete_maintenance(&self, id: RecordId) -> DbResult<()>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn list_documents(
        &self,
        filter: &RecordFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<DeviceDocument>>;

    async fn get_document(&self, id: RecordId) -> DbResult<DeviceDocument>;

    async fn create_document(&self, draft: DocumentDraft) -> DbResult<DeviceDocument>;

    async fn update_document(&self, id: RecordId, draft: DocumentDraft)
        -> DbResult<DeviceDocument>;

    async fn delete_document(&self, id: RecordId) -> DbResult<()>;
}

#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Compute a fresh, mutually consistent snapshot.
    async fn statistics(&self, query: &StatisticsQuery) -> DbResult<DeviceStatistics>;
}

/// A complete storage backend.
#[async_trait]
pub trait Store:
    DeviceRepository + MaintenanceRepository + DocumentRepository + StatisticsRepository
{
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> DbResult<()>;
}

//! In-process store
//!
//! Holds all rows behind one `RwLock`, so every operation (including the
//! cascade delete and the statistics snapshot) sees a consistent state.
//! Used by `medtrack serve --memory` and by the router tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use medtrack_core::statistics::StatisticsQuery;
use medtrack_core::{
    Device, DeviceDocument, DeviceDraft, DeviceFilter, DeviceStatistics, DocumentDraft,
    MaintenanceDraft, MaintenanceRecord, RecordFilter, RecordId,
};

use super::{
    CascadeSummary, DbError, DbResult, DeviceRepository, DocumentRepository, Listing,
    MaintenanceRepository, StatisticsRepository, Store,
};
use crate::models::Pagination;

#[derive(Debug, Default)]
struct Tables {
    devices: BTreeMap<RecordId, Device>,
    maintenance: BTreeMap<RecordId, MaintenanceRecord>,
    documents: BTreeMap<RecordId, DeviceDocument>,
    next_device: RecordId,
    next_maintenance: RecordId,
    next_document: RecordId,
}

impl Tables {
    fn serial_taken(&self, serial_number: &str, except: Option<RecordId>) -> bool {
        self.devices
            .values()
            .any(|d| d.serial_number == serial_number && Some(d.id) != except)
    }

    fn require_device(&self, id: RecordId) -> DbResult<()> {
        if self.devices.contains_key(&id) {
            Ok(())
        } else {
            Err(DbError::MissingReference { field: "device", id })
        }
    }
}

fn bump(counter: &mut RecordId) -> RecordId {
    *counter += 1;
    *counter
}

fn listing<T>(items: Vec<T>, page: Option<Pagination>) -> Listing<T> {
    let total = items.len() as i64;
    let items = match page {
        Some(page) => page.slice(items),
        None => items,
    };
    Listing { items, total }
}

fn duplicate_serial() -> DbError {
    DbError::Conflict {
        resource: "device",
        field: "serial_number",
    }
}

/// In-memory [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRepository for MemoryStore {
    async fn list_devices(
        &self,
        filter: &DeviceFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<Device>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Device> = tables
            .devices
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listing(items, page))
    }

    async fn get_device(&self, id: RecordId) -> DbResult<Device> {
        let tables = self.tables.read().await;
        tables.devices.get(&id).cloned().ok_or(DbError::NotFound {
            resource: "device",
            id,
        })
    }

    async fn create_device(&self, draft: DeviceDraft) -> DbResult<Device> {
        let mut tables = self.tables.write().await;
        if tables.serial_taken(&draft.serial_number, None) {
            return Err(duplicate_serial());
        }

        let id = bump(&mut tables.next_device);
        let device = Device::from_draft(id, draft, Utc::now());
        tables.devices.insert(id, device.clone());
        Ok(device)
    }

    async fn update_device(&self, id: RecordId, draft: DeviceDraft) -> DbResult<Device> {
        let mut tables = self.tables.write().await;
        if !tables.devices.contains_key(&id) {
            return Err(DbError::NotFound {
                resource: "device",
                id,
            });
        }
        if tables.serial_taken(&draft.serial_number, Some(id)) {
            return Err(duplicate_serial());
        }

        let device = tables.devices.get_mut(&id).ok_or(DbError::NotFound {
            resource: "device",
            id,
        })?;
        device.apply_draft(draft, Utc::now());
        Ok(device.clone())
    }

    async fn delete_device(&self, id: RecordId) -> DbResult<CascadeSummary> {
        let mut tables = self.tables.write().await;
        if tables.devices.remove(&id).is_none() {
            return Err(DbError::NotFound {
                resource: "device",
                id,
            });
        }

        let before = (tables.maintenance.len(), tables.documents.len());
        tables.maintenance.retain(|_, r| r.device != id);
        tables.documents.retain(|_, d| d.device != id);

        Ok(CascadeSummary {
            maintenance_records: (before.0 - tables.maintenance.len()) as u64,
            documents: (before.1 - tables.documents.len()) as u64,
        })
    }
}

#[async_trait]
impl MaintenanceRepository for MemoryStore {
    async fn list_maintenance(
        &self,
        filter: &RecordFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<MaintenanceRecord>> {
        let tables = self.tables.read().await;
        let mut items: Vec<MaintenanceRecord> = tables
            .maintenance
            .values()
            .filter(|r| filter.matches(r.device))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.maintenance_date
                .cmp(&a.maintenance_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(listing(items, page))
    }

    async fn get_maintenance(&self, id: RecordId) -> DbResult<MaintenanceRecord> {
        let tables = self.tables.read().await;
        tables.maintenance.get(&id).cloned().ok_or(DbError::NotFound {
            resource: "maintenance record",
            id,
        })
    }

    async fn create_maintenance(&self, draft: MaintenanceDraft) -> DbResult<MaintenanceRecord> {
        let mut tables = self.tables.write().await;
        tables.require_device(draft.device)?;

        let id = bump(&mut tables.next_maintenance);
        let record = MaintenanceRecord::from_draft(id, draft, Utc::now());
        tables.maintenance.insert(id, record.clone());
        Ok(record)
    }

    async fn update_maintenance(
        &self,
        id: RecordId,
        draft: MaintenanceDraft,
    ) -> DbResult<MaintenanceRecord> {
        let mut tables = self.tables.write().await;
        let created_at = match tables.maintenance.get(&id) {
            Some(existing) => existing.created_at,
            None => {
                return Err(DbError::NotFound {
                    resource: "maintenance record",
                    id,
                })
            }
        };
        tables.require_device(draft.device)?;

        let record = MaintenanceRecord::from_draft(id, draft, created_at);
        tables.maintenance.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_maintenance(&self, id: RecordId) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .maintenance
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound {
                resource: "maintenance record",
                id,
            })
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn list_documents(
        &self,
        filter: &RecordFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<DeviceDocument>> {
        let tables = self.tables.read().await;
        let mut items: Vec<DeviceDocument> = tables
            .documents
            .values()
            .filter(|d| filter.matches(d.device))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.upload_date.cmp(&a.upload_date).then(b.id.cmp(&a.id)));
        Ok(listing(items, page))
    }

    async fn get_document(&self, id: RecordId) -> DbResult<DeviceDocument> {
        let tables = self.tables.read().await;
        tables.documents.get(&id).cloned().ok_or(DbError::NotFound {
            resource: "document",
            id,
        })
    }

    async fn create_document(&self, draft: DocumentDraft) -> DbResult<DeviceDocument> {
        let mut tables = self.tables.write().await;
        tables.require_device(draft.device)?;

        let id = bump(&mut tables.next_document);
        let document = DeviceDocument::from_draft(id, draft, Utc::now());
        tables.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        id: RecordId,
        draft: DocumentDraft,
    ) -> DbResult<DeviceDocument> {
        let mut tables = self.tables.write().await;
        let upload_date = match tables.documents.get(&id) {
            Some(existing) => existing.upload_date,
            None => {
                return Err(DbError::NotFound {
                    resource: "document",
                    id,
                })
            }
        };
        tables.require_device(draft.device)?;

        let document = DeviceDocument::from_draft(id, draft, upload_date);
        tables.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn delete_document(&self, id: RecordId) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .documents
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound {
                resource: "document",
                id,
            })
    }
}

#[async_trait]
impl StatisticsRepository for MemoryStore {
    async fn statistics(&self, query: &StatisticsQuery) -> DbResult<DeviceStatistics> {
        let tables = self.tables.read().await;
        Ok(DeviceStatistics::compute(tables.devices.values(), query))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> DbResult<()> {
        Ok(())
    }
}

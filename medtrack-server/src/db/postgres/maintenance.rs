//! Maintenance record repository over PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres, QueryBuilder, Row};

use medtrack_core::{MaintenanceDraft, MaintenanceRecord, RecordFilter, RecordId};

use super::{decode, map_write_error, PgStore};
use crate::db::{DbError, DbResult, Listing, MaintenanceRepository};
use crate::models::Pagination;

const MAINTENANCE_COLUMNS: &str = "id, device_id, maintenance_type, maintenance_date, \
     performed_by, description, cost, next_maintenance_due, created_at";

#[derive(Debug, FromRow)]
struct MaintenanceRow {
    id: i64,
    device_id: i64,
    maintenance_type: String,
    maintenance_date: NaiveDate,
    performed_by: String,
    description: String,
    cost: Option<Decimal>,
    next_maintenance_due: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MaintenanceRow> for MaintenanceRecord {
    type Error = DbError;

    fn try_from(row: MaintenanceRow) -> DbResult<Self> {
        Ok(MaintenanceRecord {
            id: row.id,
            device: row.device_id,
            maintenance_type: decode("maintenance_type", row.maintenance_type)?,
            maintenance_date: row.maintenance_date,
            performed_by: row.performed_by,
            description: row.description,
            cost: row.cost,
            next_maintenance_due: row.next_maintenance_due,
            created_at: row.created_at,
        })
    }
}

fn bind_draft<'q>(
    query: QueryAs<'q, Postgres, MaintenanceRow, PgArguments>,
    draft: &'q MaintenanceDraft,
) -> QueryAs<'q, Postgres, MaintenanceRow, PgArguments> {
    query
        .bind(draft.device)
        .bind(draft.maintenance_type.as_code())
        .bind(draft.maintenance_date)
        .bind(&draft.performed_by)
        .bind(&draft.description)
        .bind(draft.cost)
        .bind(draft.next_maintenance_due)
}

fn not_found(id: RecordId) -> DbError {
    DbError::NotFound {
        resource: "maintenance record",
        id,
    }
}

#[async_trait]
impl MaintenanceRepository for PgStore {
    async fn list_maintenance(
        &self,
        filter: &RecordFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<MaintenanceRecord>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {}, COUNT(*) OVER() AS total FROM maintenance_records WHERE 1=1",
            MAINTENANCE_COLUMNS
        ));
        if let Some(device) = filter.device {
            builder.push(" AND device_id = ").push_bind(device);
        }
        builder.push(" ORDER BY maintenance_date DESC, id DESC");
        if let Some(page) = page {
            builder
                .push(" LIMIT ")
                .push_bind(i64::from(page.limit()))
                .push(" OFFSET ")
                .push_bind(page.offset() as i64);
        }

        let rows: Vec<PgRow> = builder.build().fetch_all(&self.pool).await?;

        let total = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total")?,
            None => 0,
        };
        let items = rows
            .iter()
            .map(|row| MaintenanceRecord::try_from(MaintenanceRow::from_row(row)?))
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Listing { items, total })
    }

    async fn get_maintenance(&self, id: RecordId) -> DbResult<MaintenanceRecord> {
        let sql = format!(
            "SELECT {} FROM maintenance_records WHERE id = $1",
            MAINTENANCE_COLUMNS
        );
        let row: Option<MaintenanceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MaintenanceRecord::try_from)
            .unwrap_or_else(|| Err(not_found(id)))
    }

    async fn create_maintenance(&self, draft: MaintenanceDraft) -> DbResult<MaintenanceRecord> {
        let sql = format!(
            r#"
            INSERT INTO maintenance_records (
                device_id, maintenance_type, maintenance_date, performed_by,
                description, cost, next_maintenance_due
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MAINTENANCE_COLUMNS
        );

        let row = bind_draft(sqlx::query_as(&sql), &draft)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(draft.device)))?;

        MaintenanceRecord::try_from(row)
    }

    async fn update_maintenance(
        &self,
        id: RecordId,
        draft: MaintenanceDraft,
    ) -> DbResult<MaintenanceRecord> {
        let sql = format!(
            r#"
            UPDATE maintenance_records SET
                device_id = $1, maintenance_type = $2, maintenance_date = $3,
                performed_by = $4, description = $5, cost = $6, next_maintenance_due = $7
            WHERE id = $8
            RETURNING {}
            "#,
            MAINTENANCE_COLUMNS
        );

        let row = bind_draft(sqlx::query_as(&sql), &draft)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(draft.device)))?;

        row.map(MaintenanceRecord::try_from)
            .unwrap_or_else(|| Err(not_found(id)))
    }

    async fn delete_maintenance(&self, id: RecordId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::postgres::testing::{serial, store};
    use crate::db::DeviceRepository;
    use medtrack_core::{DeviceDraft, DeviceStatus, DeviceType, MaintenanceType};

    fn device_draft() -> DeviceDraft {
        DeviceDraft {
            name: "LIFEPAK 15".into(),
            device_type: DeviceType::Defibrillator,
            manufacturer: "Stryker".into(),
            model_number: "V4".into(),
            serial_number: serial("PG-MAINT"),
            location: "ER".into(),
            status: DeviceStatus::Active,
            acquisition_date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            warranty_expiration: None,
            last_maintenance_date: None,
            next_maintenance_date: None,
            description: String::new(),
            purchase_price: None,
        }
    }

    fn record(device: RecordId, day: u32) -> MaintenanceDraft {
        MaintenanceDraft {
            device,
            maintenance_type: MaintenanceType::Inspection,
            maintenance_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            performed_by: "Biomed team".into(),
            description: "Yearly inspection".into(),
            cost: Some(Decimal::new(12050, 2)),
            next_maintenance_due: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn records_follow_their_device() {
        let store = store().await;
        let device = store.create_device(device_draft()).await.unwrap();

        store.create_maintenance(record(device.id, 1)).await.unwrap();
        store.create_maintenance(record(device.id, 20)).await.unwrap();

        let listing = store
            .list_maintenance(&RecordFilter::for_device(device.id), None)
            .await
            .unwrap();
        assert_eq!(listing.total, 2);
        // newest maintenance date first
        assert_eq!(listing.items[0].maintenance_date.to_string(), "2024-03-20");

        let summary = store.delete_device(device.id).await.unwrap();
        assert_eq!(summary.maintenance_records, 2);

        let listing = store
            .list_maintenance(&RecordFilter::for_device(device.id), None)
            .await
            .unwrap();
        assert!(listing.items.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_device_is_a_missing_reference() {
        let store = store().await;
        let err = store.create_maintenance(record(i64::MAX, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::MissingReference {
                field: "device",
                ..
            }
        ));
    }
}

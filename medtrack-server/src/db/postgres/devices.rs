//! Device repository over PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres, QueryBuilder, Row};

use medtrack_core::{Device, DeviceDraft, DeviceFilter, RecordId};

use super::{decode, map_write_error, PgStore};
use crate::db::{CascadeSummary, DbError, DbResult, DeviceRepository, Listing};
use crate::models::Pagination;

const DEVICE_COLUMNS: &str = "id, name, device_type, manufacturer, model_number, \
     serial_number, location, status, acquisition_date, warranty_expiration, \
     last_maintenance_date, next_maintenance_date, description, purchase_price, \
     created_at, updated_at";

/// Columns matched by the free-text search.
const SEARCH_COLUMNS: [&str; 5] = [
    "name",
    "serial_number",
    "manufacturer",
    "model_number",
    "location",
];

#[derive(Debug, FromRow)]
struct DeviceRow {
    id: i64,
    name: String,
    device_type: String,
    manufacturer: String,
    model_number: String,
    serial_number: String,
    location: String,
    status: String,
    acquisition_date: NaiveDate,
    warranty_expiration: Option<NaiveDate>,
    last_maintenance_date: Option<NaiveDate>,
    next_maintenance_date: Option<NaiveDate>,
    description: String,
    purchase_price: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = DbError;

    fn try_from(row: DeviceRow) -> DbResult<Self> {
        Ok(Device {
            id: row.id,
            name: row.name,
            device_type: decode("device_type", row.device_type)?,
            manufacturer: row.manufacturer,
            model_number: row.model_number,
            serial_number: row.serial_number,
            location: row.location,
            status: decode("status", row.status)?,
            acquisition_date: row.acquisition_date,
            warranty_expiration: row.warranty_expiration,
            last_maintenance_date: row.last_maintenance_date,
            next_maintenance_date: row.next_maintenance_date,
            description: row.description,
            purchase_price: row.purchase_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Bind the writable columns as `$1..$13`, in `DEVICE_COLUMNS` order.
fn bind_draft<'q>(
    query: QueryAs<'q, Postgres, DeviceRow, PgArguments>,
    draft: &'q DeviceDraft,
) -> QueryAs<'q, Postgres, DeviceRow, PgArguments> {
    query
        .bind(&draft.name)
        .bind(draft.device_type.as_code())
        .bind(&draft.manufacturer)
        .bind(&draft.model_number)
        .bind(&draft.serial_number)
        .bind(&draft.location)
        .bind(draft.status.as_code())
        .bind(draft.acquisition_date)
        .bind(draft.warranty_expiration)
        .bind(draft.last_maintenance_date)
        .bind(draft.next_maintenance_date)
        .bind(&draft.description)
        .bind(draft.purchase_price)
}

#[async_trait]
impl DeviceRepository for PgStore {
    async fn list_devices(
        &self,
        filter: &DeviceFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<Device>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {}, COUNT(*) OVER() AS total FROM devices WHERE 1=1",
            DEVICE_COLUMNS
        ));
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_code());
        }
        if let Some(device_type) = filter.device_type {
            builder
                .push(" AND device_type = ")
                .push_bind(device_type.as_code());
        }
        if let Some(pattern) = filter.search_pattern() {
            builder.push(" AND (");
            for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(*column)
                    .push(" ILIKE ")
                    .push_bind(pattern.clone());
            }
            builder.push(")");
        }
        builder.push(" ORDER BY created_at DESC, id DESC");
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
            .map(|row| Device::try_from(DeviceRow::from_row(row)?))
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Listing { items, total })
    }

    async fn get_device(&self, id: RecordId) -> DbResult<Device> {
        let sql = format!("SELECT {} FROM devices WHERE id = $1", DEVICE_COLUMNS);
        let row: Option<DeviceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Device::try_from(row),
            None => Err(DbError::NotFound {
                resource: "device",
                id,
            }),
        }
    }

    async fn create_device(&self, draft: DeviceDraft) -> DbResult<Device> {
        let sql = format!(
            r#"
            INSERT INTO devices (
                name, device_type, manufacturer, model_number, serial_number, location,
                status, acquisition_date, warranty_expiration, last_maintenance_date,
                next_maintenance_date, description, purchase_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            DEVICE_COLUMNS
        );

        let row = bind_draft(sqlx::query_as(&sql), &draft)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None))?;

        Device::try_from(row)
    }

    async fn update_device(&self, id: RecordId, draft: DeviceDraft) -> DbResult<Device> {
        // updated_at must move forward even when NOW() has not
        let sql = format!(
            r#"
            UPDATE devices SET
                name = $1, device_type = $2, manufacturer = $3, model_number = $4,
                serial_number = $5, location = $6, status = $7, acquisition_date = $8,
                warranty_expiration = $9, last_maintenance_date = $10,
                next_maintenance_date = $11, description = $12, purchase_price = $13,
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $14
            RETURNING {}
            "#,
            DEVICE_COLUMNS
        );

        let row = bind_draft(sqlx::query_as(&sql), &draft)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None))?;

        match row {
            Some(row) => Device::try_from(row),
            None => Err(DbError::NotFound {
                resource: "device",
                id,
            }),
        }
    }

    async fn delete_device(&self, id: RecordId) -> DbResult<CascadeSummary> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so no dependent can be added between count and delete
        let locked: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM devices WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(DbError::NotFound {
                resource: "device",
                id,
            });
        }

        let (maintenance_records,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM maintenance_records WHERE device_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        let (documents,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM device_documents WHERE device_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        // ON DELETE CASCADE removes the dependents
        sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CascadeSummary {
            maintenance_records: maintenance_records as u64,
            documents: documents as u64,
        })
    }
}

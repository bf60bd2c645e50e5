//! Document repository over PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres, QueryBuilder, Row};

use medtrack_core::{DeviceDocument, DocumentDraft, RecordFilter, RecordId};

use super::{decode, map_write_error, PgStore};
use crate::db::{DbError, DbResult, DocumentRepository, Listing};
use crate::models::Pagination;

const DOCUMENT_COLUMNS: &str =
    "id, device_id, document_type, title, file_path, upload_date, description";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: i64,
    device_id: i64,
    document_type: String,
    title: String,
    file_path: String,
    upload_date: DateTime<Utc>,
    description: String,
}

impl TryFrom<DocumentRow> for DeviceDocument {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> DbResult<Self> {
        Ok(DeviceDocument {
            id: row.id,
            device: row.device_id,
            document_type: decode("document_type", row.document_type)?,
            title: row.title,
            file_path: row.file_path,
            upload_date: row.upload_date,
            description: row.description,
        })
    }
}

fn bind_draft<'q>(
    query: QueryAs<'q, Postgres, DocumentRow, PgArguments>,
    draft: &'q DocumentDraft,
) -> QueryAs<'q, Postgres, DocumentRow, PgArguments> {
    query
        .bind(draft.device)
        .bind(draft.document_type.as_code())
        .bind(&draft.title)
        .bind(&draft.file_path)
        .bind(&draft.description)
}

fn not_found(id: RecordId) -> DbError {
    DbError::NotFound {
        resource: "document",
        id,
    }
}

#[async_trait]
impl DocumentRepository for PgStore {
    async fn list_documents(
        &self,
        filter: &RecordFilter,
        page: Option<Pagination>,
    ) -> DbResult<Listing<DeviceDocument>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {}, COUNT(*) OVER() AS total FROM device_documents WHERE 1=1",
            DOCUMENT_COLUMNS
        ));
        if let Some(device) = filter.device {
            builder.push(" AND device_id = ").push_bind(device);
        }
        builder.push(" ORDER BY upload_date DESC, id DESC");
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
            .map(|row| DeviceDocument::try_from(DocumentRow::from_row(row)?))
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Listing { items, total })
    }

    async fn get_document(&self, id: RecordId) -> DbResult<DeviceDocument> {
        let sql = format!(
            "SELECT {} FROM device_documents WHERE id = $1",
            DOCUMENT_COLUMNS
        );
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(DeviceDocument::try_from)
            .unwrap_or_else(|| Err(not_found(id)))
    }

    async fn create_document(&self, draft: DocumentDraft) -> DbResult<DeviceDocument> {
        let sql = format!(
            r#"
            INSERT INTO device_documents (device_id, document_type, title, file_path, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let row = bind_draft(sqlx::query_as(&sql), &draft)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(draft.device)))?;

        DeviceDocument::try_from(row)
    }

    async fn update_document(
        &self,
        id: RecordId,
        draft: DocumentDraft,
    ) -> DbResult<DeviceDocument> {
        // upload_date is set once at insert
        let sql = format!(
            r#"
            UPDATE device_documents SET
                device_id = $1, document_type = $2, title = $3, file_path = $4, description = $5
            WHERE id = $6
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let row = bind_draft(sqlx::query_as(&sql), &draft)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(draft.device)))?;

        row.map(DeviceDocument::try_from)
            .unwrap_or_else(|| Err(not_found(id)))
    }

    async fn delete_document(&self, id: RecordId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM device_documents WHERE id = $1")
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
    use chrono::NaiveDate;
    use medtrack_core::{DeviceDraft, DeviceStatus, DeviceType, DocumentType};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn upload_date_survives_updates() {
        let store = store().await;
        let device = store
            .create_device(DeviceDraft {
                name: "Vivid E95".into(),
                device_type: DeviceType::Ultrasound,
                manufacturer: "GE".into(),
                model_number: "E95".into(),
                serial_number: serial("PG-DOC"),
                location: "Cardiology".into(),
                status: DeviceStatus::InUse,
                acquisition_date: NaiveDate::from_ymd_opt(2023, 2, 2).unwrap(),
                warranty_expiration: None,
                last_maintenance_date: None,
                next_maintenance_date: None,
                description: String::new(),
                purchase_price: None,
            })
            .await
            .unwrap();

        let doc = store
            .create_document(DocumentDraft {
                device: device.id,
                document_type: DocumentType::Manual,
                title: "Operator manual".into(),
                file_path: "/docs/e95/manual.pdf".into(),
                description: String::new(),
            })
            .await
            .unwrap();

        let mut draft = doc.to_draft();
        draft.title = "Operator manual rev B".into();
        let updated = store.update_document(doc.id, draft).await.unwrap();
        assert_eq!(updated.upload_date, doc.upload_date);
        assert_eq!(updated.title, "Operator manual rev B");

        let summary = store.delete_device(device.id).await.unwrap();
        assert_eq!(summary.documents, 1);
        assert!(matches!(
            store.get_document(doc.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}

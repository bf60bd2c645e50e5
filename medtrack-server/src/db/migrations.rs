//! Schema for devices, maintenance records and documents
//!
//! Idempotent: every statement uses `IF NOT EXISTS`, so `run` is safe on
//! every startup.

use sqlx::PgPool;

use medtrack_core::{DeviceStatus, DeviceType, DocumentType, MaintenanceType};

use super::DbResult;

/// Constraint name checked when mapping unique violations.
pub(crate) const SERIAL_NUMBER_UNIQUE: &str = "devices_serial_number_key";

/// `'A', 'B', ...` for a CHECK constraint.
fn code_list(codes: impl Iterator<Item = &'static str>) -> String {
    codes
        .map(|code| format!("'{}'", code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run all migrations
pub async fn run(pool: &PgPool) -> DbResult<()> {
    tracing::info!("Running medtrack migrations...");

    let devices = format!(
        r#"
        CREATE TABLE IF NOT EXISTS devices (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(200) NOT NULL,
            device_type VARCHAR(50) NOT NULL CHECK (device_type IN ({types})),
            manufacturer VARCHAR(100) NOT NULL,
            model_number VARCHAR(100) NOT NULL,
            serial_number VARCHAR(100) NOT NULL,
            location VARCHAR(200) NOT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'AVAILABLE' CHECK (status IN ({statuses})),
            acquisition_date DATE NOT NULL,
            warranty_expiration DATE,
            last_maintenance_date DATE,
            next_maintenance_date DATE,
            description TEXT NOT NULL DEFAULT '',
            purchase_price NUMERIC(12, 2),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT {unique} UNIQUE (serial_number)
        )
        "#,
        types = code_list(DeviceType::ALL.iter().map(|t| t.as_code())),
        statuses = code_list(DeviceStatus::ALL.iter().map(|s| s.as_code())),
        unique = SERIAL_NUMBER_UNIQUE,
    );
    sqlx::query(&devices).execute(pool).await?;

    let maintenance = format!(
        r#"
        CREATE TABLE IF NOT EXISTS maintenance_records (
            id BIGSERIAL PRIMARY KEY,
            device_id BIGINT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            maintenance_type VARCHAR(20) NOT NULL CHECK (maintenance_type IN ({types})),
            maintenance_date DATE NOT NULL,
            performed_by VARCHAR(200) NOT NULL,
            description TEXT NOT NULL,
            cost NUMERIC(10, 2),
            next_maintenance_due DATE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        types = code_list(MaintenanceType::ALL.iter().map(|t| t.as_code())),
    );
    sqlx::query(&maintenance).execute(pool).await?;

    let documents = format!(
        r#"
        CREATE TABLE IF NOT EXISTS device_documents (
            id BIGSERIAL PRIMARY KEY,
            device_id BIGINT NOT NULL REFERENCES devices(id) ON DELETE CASCADE,
            document_type VARCHAR(20) NOT NULL CHECK (document_type IN ({types})),
            title VARCHAR(200) NOT NULL,
            file_path VARCHAR(500) NOT NULL,
            upload_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            description TEXT NOT NULL DEFAULT ''
        )
        "#,
        types = code_list(DocumentType::ALL.iter().map(|t| t.as_code())),
    );
    sqlx::query(&documents).execute(pool).await?;

    create_indexes(pool).await?;

    tracing::info!("medtrack migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> DbResult<()> {
    // Device indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_devices_status ON devices(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_devices_type ON devices(device_type)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_devices_created ON devices(created_at DESC)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_devices_updated ON devices(updated_at DESC)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_devices_next_maintenance ON devices(next_maintenance_date) WHERE next_maintenance_date IS NOT NULL",
    )
    .execute(pool)
    .await?;

    // Maintenance indexes
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_maintenance_device ON maintenance_records(device_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_maintenance_date ON maintenance_records(maintenance_date DESC)",
    )
    .execute(pool)
    .await?;

    // Document indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_device ON device_documents(device_id)")
        .execute(pool)
        .await?;

    Ok(())
}

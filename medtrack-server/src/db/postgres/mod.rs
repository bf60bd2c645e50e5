//! PostgreSQL store
//!
//! One repository impl per entity, all sharing the same pool:
//! - [`devices`]: dynamic filters via `QueryBuilder`, cascade delete in a
//!   transaction
//! - [`maintenance`] and [`documents`]: rely on the FK constraint to reject
//!   unknown devices
//! - [`statistics`]: one read-only snapshot transaction

mod devices;
mod documents;
mod maintenance;
mod statistics;

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use medtrack_core::RecordId;

use super::migrations::SERIAL_NUMBER_UNIQUE;
use super::{DbError, DbResult, Store};

/// PostgreSQL-backed [`Store`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Parse a coded column, reporting unknown codes as corruption.
fn decode<T: FromStr>(column: &'static str, value: String) -> DbResult<T> {
    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(DbError::Corrupt { column, value }),
    }
}

/// Map constraint violations raised by a write to domain errors.
///
/// `device` is the referenced device id, when the write carries one.
fn map_write_error(err: sqlx::Error, device: Option<RecordId>) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(SERIAL_NUMBER_UNIQUE) {
            return DbError::Conflict {
                resource: "device",
                field: "serial_number",
            };
        }
        if db_err.is_foreign_key_violation() {
            if let Some(id) = device {
                return DbError::MissingReference { field: "device", id };
            }
        }
    }
    DbError::Sqlx(err)
}


#[cfg(test)]
mod tests {
    use super::*;
    use medtrack_core::DeviceStatus;

    #[test]
    fn decode_known_and_unknown_codes() {
        let status: DeviceStatus = decode("status", "IN_USE".to_string()).unwrap();
        assert_eq!(status, DeviceStatus::InUse);

        let err = decode::<DeviceStatus>("status", "BROKEN".to_string()).unwrap_err();
        assert!(matches!(
            err,
            DbError::Corrupt {
                column: "status",
                ref value
            } if value == "BROKEN"
        ));
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound, Some(1));
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }
}

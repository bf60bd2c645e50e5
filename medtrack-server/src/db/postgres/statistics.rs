//! Statistics snapshot over PostgreSQL
//!
//! All queries run inside one `REPEATABLE READ, READ ONLY` transaction so the
//! counts, groupings and activity feed come from the same snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use medtrack_core::statistics::{RecentActivity, StatisticsQuery, StatusCount, TypeCount};
use medtrack_core::{DeviceStatistics, DeviceStatus};

use super::{decode, PgStore};
use crate::db::{DbResult, StatisticsRepository};

#[derive(Debug, FromRow)]
struct Totals {
    total: i64,
    active: i64,
    available: i64,
    in_use: i64,
    in_maintenance: i64,
    due_soon: i64,
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: i64,
    name: String,
    serial_number: String,
    status: String,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl StatisticsRepository for PgStore {
    async fn statistics(&self, query: &StatisticsQuery) -> DbResult<DeviceStatistics> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let totals: Totals = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = $1) AS active,
                COUNT(*) FILTER (WHERE status = $2) AS available,
                COUNT(*) FILTER (WHERE status = $3) AS in_use,
                COUNT(*) FILTER (WHERE status = $4) AS in_maintenance,
                COUNT(*) FILTER (
                    WHERE next_maintenance_date BETWEEN $5 AND $6
                ) AS due_soon
            FROM devices
            "#,
        )
        .bind(DeviceStatus::Active.as_code())
        .bind(DeviceStatus::Available.as_code())
        .bind(DeviceStatus::InUse.as_code())
        .bind(DeviceStatus::InMaintenance.as_code())
        .bind(query.window.start)
        .bind(query.window.end)
        .fetch_one(&mut *tx)
        .await?;

        let types: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT device_type, COUNT(*) AS count
            FROM devices
            GROUP BY device_type
            ORDER BY count DESC, device_type ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let statuses: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*) AS count
            FROM devices
            GROUP BY status
            ORDER BY count DESC, status ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let recent: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT id, name, serial_number, status, updated_at
            FROM devices
            ORDER BY updated_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(query.recent_limit as i64)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DeviceStatistics {
            total_devices: totals.total,
            active_devices: totals.active,
            available_devices: totals.available,
            in_use_devices: totals.in_use,
            maintenance_needed: totals.in_maintenance,
            maintenance_due_soon: totals.due_soon,
            device_types: types
                .into_iter()
                .map(|(code, count)| {
                    Ok(TypeCount {
                        device_type: decode("device_type", code)?,
                        count,
                    })
                })
                .collect::<DbResult<_>>()?,
            status_distribution: statuses
                .into_iter()
                .map(|(code, count)| {
                    Ok(StatusCount {
                        status: decode("status", code)?,
                        count,
                    })
                })
                .collect::<DbResult<_>>()?,
            recent_activity: recent
                .into_iter()
                .map(|row| {
                    Ok(RecentActivity {
                        id: row.id,
                        name: row.name,
                        serial_number: row.serial_number,
                        status: decode("status", row.status)?,
                        updated_at: row.updated_at,
                    })
                })
                .collect::<DbResult<_>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::postgres::testing::store;
    use chrono::NaiveDate;
    use medtrack_core::DueWindow;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn groupings_sum_to_total() {
        let store = store().await;
        let query = StatisticsQuery {
            window: DueWindow::starting(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 30),
            recent_limit: 5,
        };

        let stats = store.statistics(&query).await.unwrap();
        let by_type: i64 = stats.device_types.iter().map(|c| c.count).sum();
        let by_status: i64 = stats.status_distribution.iter().map(|c| c.count).sum();
        assert_eq!(by_type, stats.total_devices);
        assert_eq!(by_status, stats.total_devices);
        assert!(stats.recent_activity.len() <= 5);
    }
}

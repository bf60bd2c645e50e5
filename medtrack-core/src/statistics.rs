//! Dashboard statistics snapshot
//!
//! [`DeviceStatistics::compute`] is the reference computation over an
//! in-memory set of devices; the PostgreSQL store produces the same snapshot
//! with aggregate queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::choices::{DeviceStatus, DeviceType};
use crate::device::Device;
use crate::RecordId;

/// Inclusive date range `[start, end]` for "maintenance due soon".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DueWindow {
    /// `[today, today + days]`
    pub fn starting(today: NaiveDate, days: u32) -> Self {
        let end = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }

    /// Null dates are never due.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        date.is_some_and(|d| d >= self.start && d <= self.end)
    }
}

/// Calendar date of `now` in the reference timezone.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Parameters of one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsQuery {
    pub window: DueWindow,
    pub recent_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub device_type: DeviceType,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: DeviceStatus,
    pub count: i64,
}

/// Reduced device view for the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub id: RecordId,
    pub name: String,
    pub serial_number: String,
    pub status: DeviceStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<&Device> for RecentActivity {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            serial_number: d.serial_number.clone(),
            status: d.status,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStatistics {
    pub total_devices: i64,
    pub active_devices: i64,
    pub available_devices: i64,
    pub in_use_devices: i64,
    /// Devices whose status is IN_MAINTENANCE
    pub maintenance_needed: i64,
    pub maintenance_due_soon: i64,
    pub device_types: Vec<TypeCount>,
    pub status_distribution: Vec<StatusCount>,
    pub recent_activity: Vec<RecentActivity>,
}

impl DeviceStatistics {
    pub fn compute<'a, I>(devices: I, query: &StatisticsQuery) -> Self
    where
        I: IntoIterator<Item = &'a Device>,
    {
        let mut stats = Self::default();
        let mut by_type: BTreeMap<DeviceType, i64> = BTreeMap::new();
        let mut by_status: BTreeMap<DeviceStatus, i64> = BTreeMap::new();
        let mut recent: Vec<&Device> = Vec::new();

        for device in devices {
            stats.total_devices += 1;
            match device.status {
                DeviceStatus::Active => stats.active_devices += 1,
                DeviceStatus::Available => stats.available_devices += 1,
                DeviceStatus::InUse => stats.in_use_devices += 1,
                DeviceStatus::InMaintenance => stats.maintenance_needed += 1,
                DeviceStatus::InRepair | DeviceStatus::Decommissioned => {}
            }
            if query.window.contains(device.next_maintenance_date) {
                stats.maintenance_due_soon += 1;
            }
            *by_type.entry(device.device_type).or_default() += 1;
            *by_status.entry(device.status).or_default() += 1;
            recent.push(device);
        }

        stats.device_types = by_type
            .into_iter()
            .map(|(device_type, count)| TypeCount { device_type, count })
            .collect();
        stats.device_types.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.device_type.as_code().cmp(b.device_type.as_code()))
        });

        stats.status_distribution = by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        stats.status_distribution.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.status.as_code().cmp(b.status.as_code()))
        });

        recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        stats.recent_activity = recent
            .into_iter()
            .take(query.recent_limit)
            .map(RecentActivity::from)
            .collect();

        stats
    }
}

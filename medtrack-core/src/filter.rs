//! Filter specifications passed to the persistence layer
//!
//! Every field is optional; `None` means "no constraint". Constraints combine
//! with AND. The `matches` methods are the reference semantics that the SQL
//! implementation mirrors.

use crate::choices::{DeviceStatus, DeviceType};
use crate::device::Device;
use crate::RecordId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub status: Option<DeviceStatus>,
    pub device_type: Option<DeviceType>,
    /// Case-insensitive substring over name, serial_number, manufacturer,
    /// model_number and location (any of them)
    pub search: Option<String>,
}

impl DeviceFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.status.is_none() && self.device_type.is_none() && self.search.is_none()
    }

    pub fn matches(&self, device: &Device) -> bool {
        if self.status.is_some_and(|s| s != device.status) {
            return false;
        }
        if self.device_type.is_some_and(|t| t != device.device_type) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let needle = term.to_lowercase();
                [
                    &device.name,
                    &device.serial_number,
                    &device.manufacturer,
                    &device.model_number,
                    &device.location,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// `ILIKE` pattern for the search term, with wildcards escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|term| format!("%{}%", escape_like(term)))
    }
}

/// Filter for rows owned by a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub device: Option<RecordId>,
}

impl RecordFilter {
    pub fn for_device(device: RecordId) -> Self {
        Self {
            device: Some(device),
        }
    }

    pub fn matches(&self, owner: RecordId) -> bool {
        self.device.map_or(true, |d| d == owner)
    }
}

/// Escape `LIKE` metacharacters so the term matches literally
/// (backslash is the default escape character in PostgreSQL).
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

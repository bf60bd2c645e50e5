//! List query parameters
//!
//! Parameters arrive as raw strings and are parsed here so that a bad value
//! becomes a field error instead of an extractor rejection. An empty value
//! counts as absent.

use serde::Deserialize;

use medtrack_core::{
    DeviceFilter, DeviceStatus, DeviceType, FieldErrors, RecordFilter, RecordId, ValidationError,
};

use super::pagination::Pagination;

/// `?status=&device_type=&search=&page=&page_size=`
#[derive(Debug, Default, Deserialize)]
pub struct DeviceListParams {
    pub status: Option<String>,
    pub device_type: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// `?device=&page=&page_size=`
#[derive(Debug, Default, Deserialize)]
pub struct RecordListParams {
    pub device: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn positive(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &Option<String>,
) -> Option<u32> {
    let raw = present(value)?;
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            errors.push(ValidationError::InvalidFormat {
                field,
                reason: "a valid positive integer is required".into(),
            });
            None
        }
    }
}

fn pagination(
    errors: &mut FieldErrors,
    page: &Option<String>,
    page_size: &Option<String>,
) -> Option<Pagination> {
    let size = positive(errors, "page_size", page_size);
    positive(errors, "page", page).map(|page| Pagination::new(page, size))
}

impl DeviceListParams {
    pub fn into_filter(self) -> Result<(DeviceFilter, Option<Pagination>), FieldErrors> {
        let mut errors = FieldErrors::new();

        let status = present(&self.status).and_then(|code| {
            code.parse::<DeviceStatus>()
                .map_err(|_| {
                    errors.push(ValidationError::InvalidChoice {
                        field: "status",
                        value: code.to_owned(),
                    })
                })
                .ok()
        });
        let device_type = present(&self.device_type).and_then(|code| {
            code.parse::<DeviceType>()
                .map_err(|_| {
                    errors.push(ValidationError::InvalidChoice {
                        field: "device_type",
                        value: code.to_owned(),
                    })
                })
                .ok()
        });
        let search = present(&self.search).map(str::to_owned);
        let page = pagination(&mut errors, &self.page, &self.page_size);

        errors.into_result()?;
        Ok((
            DeviceFilter {
                status,
                device_type,
                search,
            },
            page,
        ))
    }
}

impl RecordListParams {
    pub fn into_filter(self) -> Result<(RecordFilter, Option<Pagination>), FieldErrors> {
        let mut errors = FieldErrors::new();

        let device = present(&self.device).and_then(|raw| {
            raw.parse::<RecordId>()
                .map_err(|_| {
                    errors.push(ValidationError::InvalidFormat {
                        field: "device",
                        reason: "a valid integer is required".into(),
                    })
                })
                .ok()
        });
        let page = pagination(&mut errors, &self.page, &self.page_size);

        errors.into_result()?;
        Ok((RecordFilter { device }, page))
    }
}

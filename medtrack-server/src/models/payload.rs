//! Reading write payloads field by field
//!
//! [`FieldReader`] walks a JSON object, validates each field it is asked for
//! and collects every failure into one [`FieldErrors`] so a client sees all
//! problems of a request at once.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use medtrack_core::validation::{check_decimal, clean_text};
use medtrack_core::{FieldErrors, RecordId, ValidationError};

/// POST/PUT carry every required field; PATCH only what changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}

pub struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    mode: WriteMode,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(body: &'a Map<String, Value>, mode: WriteMode) -> Self {
        Self {
            body,
            mode,
            errors: FieldErrors::new(),
        }
    }

    /// Server-assigned fields may not be written.
    pub fn reject_read_only(&mut self, fields: &[&'static str]) {
        for field in fields {
            if self.body.contains_key(*field) {
                self.errors.push(ValidationError::ReadOnly { field });
            }
        }
    }

    /// Non-blank text, required on full writes.
    pub fn text(&mut self, field: &'static str, max: Option<usize>) -> Option<String> {
        let value = self.lookup(field, true)?;
        let result = as_text(field, value).and_then(|s| clean_text(field, &s, max, false));
        self.record(result)
    }

    /// Text that may be blank. Null is rejected.
    pub fn blank_text(&mut self, field: &'static str, max: Option<usize>) -> Option<String> {
        let value = self.lookup(field, false)?;
        let result = as_text(field, value).and_then(|s| clean_text(field, &s, max, true));
        self.record(result)
    }

    /// One of the codes of `T`.
    pub fn choice<T>(&mut self, field: &'static str, required: bool) -> Option<T>
    where
        T: FromStr,
    {
        let value = self.lookup(field, required)?;
        let result = as_text(field, value).and_then(|s| {
            s.parse::<T>().map_err(|_| ValidationError::InvalidChoice {
                field,
                value: s.into_owned(),
            })
        });
        self.record(result)
    }

    /// `YYYY-MM-DD`, required on full writes.
    pub fn date(&mut self, field: &'static str) -> Option<NaiveDate> {
        let value = self.lookup(field, true)?;
        let result = as_text(field, value).and_then(|s| parse_date(field, &s));
        self.record(result)
    }

    /// Optional date: `None` when absent, `Some(None)` for null or "".
    pub fn nullable_date(&mut self, field: &'static str) -> Option<Option<NaiveDate>> {
        let value = self.lookup(field, false)?;
        let result = match value {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            other => as_text(field, other).and_then(|s| parse_date(field, &s).map(Some)),
        };
        self.record(result)
    }

    /// Optional decimal given as a JSON number or a numeric string.
    pub fn nullable_decimal(
        &mut self,
        field: &'static str,
        (max_digits, decimal_places): (u32, u32),
    ) -> Option<Option<Decimal>> {
        let value = self.lookup(field, false)?;
        let parsed = match value {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => parse_decimal(field, s.trim()).map(Some),
            Value::Number(n) => parse_decimal(field, &n.to_string()).map(Some),
            _ => Err(invalid_number(field)),
        };
        let result = parsed.and_then(|value| match value {
            Some(d) => check_decimal(field, d, max_digits, decimal_places).map(Some),
            None => Ok(None),
        });
        self.record(result)
    }

    /// Id of a referenced row, as an integer or a numeric string.
    pub fn reference(&mut self, field: &'static str) -> Option<RecordId> {
        let value = self.lookup(field, true)?;
        let result = match value {
            Value::Null => Err(ValidationError::Null { field }),
            Value::Number(n) => n.as_i64().ok_or_else(|| wrong_pk_type(field)),
            Value::String(s) => s.trim().parse().map_err(|_| wrong_pk_type(field)),
            _ => Err(wrong_pk_type(field)),
        };
        self.record(result)
    }

    /// All errors recorded so far, or `Ok(())`.
    pub fn finish(self) -> Result<(), FieldErrors> {
        self.errors.into_result()
    }

    fn lookup(&mut self, field: &'static str, required: bool) -> Option<&'a Value> {
        let value = self.body.get(field);
        if value.is_none() && required && self.mode == WriteMode::Full {
            self.errors.push(ValidationError::Required { field });
        }
        value
    }

    fn record<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }
}

/// Strings as-is, numbers by their JSON text.
fn as_text<'v>(field: &'static str, value: &'v Value) -> Result<Cow<'v, str>, ValidationError> {
    match value {
        Value::String(s) => Ok(Cow::Borrowed(s)),
        Value::Number(n) => Ok(Cow::Owned(n.to_string())),
        Value::Null => Err(ValidationError::Null { field }),
        _ => Err(ValidationError::InvalidFormat {
            field,
            reason: "not a valid string".into(),
        }),
    }
}

fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field,
        reason: "date has wrong format, use YYYY-MM-DD".into(),
    })
}

fn parse_decimal(field: &'static str, s: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| invalid_number(field))
}

fn invalid_number(field: &'static str) -> ValidationError {
    ValidationError::InvalidFormat {
        field,
        reason: "a valid number is required".into(),
    }
}

fn wrong_pk_type(field: &'static str) -> ValidationError {
    ValidationError::InvalidFormat {
        field,
        reason: "incorrect type, expected pk value".into(),
    }
}

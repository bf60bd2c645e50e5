//! Field validation errors and checks shared by all entities

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field missing from a write that must carry it
    Required { field: &'static str },

    /// Field present but null where null is not allowed
    Null { field: &'static str },

    /// Field is empty (after trimming) when it shouldn't be
    Blank { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Value is not one of the codes of a coded enum
    InvalidChoice { field: &'static str, value: String },

    /// Value has the wrong shape (type, date syntax, ...)
    InvalidFormat { field: &'static str, reason: String },

    /// Decimal has more fractional digits than the column allows
    TooManyDecimalPlaces { field: &'static str, max: u32 },

    /// Decimal has more whole digits than the column allows
    TooManyWholeDigits { field: &'static str, max: u32 },

    /// Server-assigned field supplied by the client
    ReadOnly { field: &'static str },

    /// Reference to a row that does not exist
    UnknownReference { field: &'static str, id: i64 },

    /// Value collides with a unique column
    Duplicate {
        field: &'static str,
        resource: &'static str,
    },

    /// Request-level problem not tied to a field
    Malformed { reason: String },
}

impl ValidationError {
    /// Name of the field the error is reported under.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::Null { field }
            | Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::TooManyDecimalPlaces { field, .. }
            | Self::TooManyWholeDigits { field, .. }
            | Self::ReadOnly { field }
            | Self::UnknownReference { field, .. }
            | Self::Duplicate { field, .. } => field,
            Self::Malformed { .. } => NON_FIELD_ERRORS,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { .. } => write!(f, "this field is required"),
            Self::Null { .. } => write!(f, "this field may not be null"),
            Self::Blank { .. } => write!(f, "this field may not be blank"),
            Self::TooLong { max, .. } => {
                write!(f, "ensure this field has no more than {} characters", max)
            }
            Self::InvalidChoice { value, .. } => write!(f, "\"{}\" is not a valid choice", value),
            Self::InvalidFormat { reason, .. } => write!(f, "{}", reason),
            Self::TooManyDecimalPlaces { max, .. } => {
                write!(f, "ensure that there are no more than {} decimal places", max)
            }
            Self::TooManyWholeDigits { max, .. } => write!(
                f,
                "ensure that there are no more than {} digits before the decimal point",
                max
            ),
            Self::ReadOnly { .. } => write!(f, "this field is read-only"),
            Self::UnknownReference { id, .. } => {
                write!(f, "invalid pk \"{}\" - object does not exist", id)
            }
            Self::Duplicate { field, resource } => write!(
                f,
                "{} with this {} already exists",
                resource,
                field.replace('_', " ")
            ),
            Self::Malformed { reason } => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// All validation errors of one request, grouped by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0
            .entry(error.field())
            .or_default()
            .push(error.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push(error);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Trim a text value and enforce blank and length rules.
///
/// Length is counted in characters.
pub fn clean_text(
    field: &'static str,
    raw: &str,
    max: Option<usize>,
    allow_blank: bool,
) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() && !allow_blank {
        return Err(ValidationError::Blank { field });
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(value.to_owned())
}

/// Enforce a `NUMERIC(max_digits, decimal_places)` column shape and rescale
/// the value to exactly `decimal_places`.
pub fn check_decimal(
    field: &'static str,
    value: Decimal,
    max_digits: u32,
    decimal_places: u32,
) -> Result<Decimal, ValidationError> {
    let normalized = value.normalize();
    if normalized.scale() > decimal_places {
        return Err(ValidationError::TooManyDecimalPlaces {
            field,
            max: decimal_places,
        });
    }

    let whole = normalized.trunc().abs();
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_string().len() as u32
    };
    let max_whole = max_digits - decimal_places;
    if whole_digits > max_whole {
        return Err(ValidationError::TooManyWholeDigits {
            field,
            max: max_whole,
        });
    }

    let mut rescaled = normalized;
    rescaled.rescale(decimal_places);
    Ok(rescaled)
}

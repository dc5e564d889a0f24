//! Argument checks shared by the endpoint façade.
//!
//! Identifying arguments are substituted into URL paths. Zero, the empty
//! string and `None` all count as missing, so callers get a
//! `ValidationError` naming the argument instead of a malformed path.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::types::TrackingType;

/// A value that can fill one path segment.
pub trait PathArg {
    /// The rendered segment, or `None` when the argument counts as missing.
    fn segment(&self) -> Option<String>;

    /// The argument as it appears inside a JSON body.
    fn to_json(&self) -> Value;
}

macro_rules! numeric_path_arg {
    ($($t:ty),*) => {
        $(
            impl PathArg for $t {
                fn segment(&self) -> Option<String> {
                    (*self != 0).then(|| self.to_string())
                }

                fn to_json(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

numeric_path_arg!(u16, u32, u64, usize, i32, i64);

impl PathArg for str {
    fn segment(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }

    fn to_json(&self) -> Value {
        Value::from(self)
    }
}

impl PathArg for String {
    fn segment(&self) -> Option<String> {
        self.as_str().segment()
    }

    fn to_json(&self) -> Value {
        self.as_str().to_json()
    }
}

/// Identifiers taken straight from a response payload. Only non-zero
/// numbers, non-empty strings and `true` count as present.
impl PathArg for Value {
    fn segment(&self) -> Option<String> {
        match self {
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::String(s) => s.segment(),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        self.clone()
    }
}

impl<T: PathArg + ?Sized> PathArg for &T {
    fn segment(&self) -> Option<String> {
        (**self).segment()
    }

    fn to_json(&self) -> Value {
        (**self).to_json()
    }
}

impl<T: PathArg> PathArg for Option<T> {
    fn segment(&self) -> Option<String> {
        self.as_ref().and_then(PathArg::segment)
    }

    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, PathArg::to_json)
    }
}

/// Render `arg` as a path segment or fail naming the argument.
pub fn require(name: &'static str, arg: &impl PathArg) -> Result<String, ValidationError> {
    arg.segment().ok_or(ValidationError::MissingArgument(name))
}

/// Serialize a request payload.
pub fn payload(data: &impl Serialize) -> Result<Value, ValidationError> {
    serde_json::to_value(data).map_err(|e| ValidationError::InvalidArgument {
        name: "data",
        reason: format!("could not be serialized: {e}"),
    })
}

/// Payloads for supplier links must carry a known `TrackingTypeCode`.
pub fn check_tracking_type(data: &Value) -> Result<(), ValidationError> {
    let known = data
        .get("TrackingTypeCode")
        .and_then(Value::as_str)
        .is_some_and(|code| code.parse::<TrackingType>().is_ok());
    if known {
        return Ok(());
    }
    let codes: Vec<&str> = TrackingType::ALL.iter().map(|t| t.code()).collect();
    Err(ValidationError::InvalidArgument {
        name: "data.TrackingTypeCode",
        reason: format!("should be one of: {}", codes.join(",")),
    })
}

/// A day accepted by date-scoped endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateArg {
    /// Must already be `YYYY-MM-DD`.
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    /// Milliseconds since the Unix epoch, read as UTC.
    EpochMillis(i64),
}

impl From<&str> for DateArg {
    fn from(value: &str) -> Self {
        DateArg::Text(value.to_string())
    }
}

impl From<String> for DateArg {
    fn from(value: String) -> Self {
        DateArg::Text(value)
    }
}

impl From<NaiveDate> for DateArg {
    fn from(value: NaiveDate) -> Self {
        DateArg::Date(value)
    }
}

impl From<DateTime<Utc>> for DateArg {
    fn from(value: DateTime<Utc>) -> Self {
        DateArg::Timestamp(value)
    }
}

impl From<i64> for DateArg {
    fn from(value: i64) -> Self {
        DateArg::EpochMillis(value)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a date argument as `YYYY-MM-DD`.
pub fn require_date(name: &'static str, date: DateArg) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidArgument {
        name,
        reason: "should follow `YYYY-MM-DD` format".to_string(),
    };
    match date {
        DateArg::Text(text) if text.is_empty() => Err(ValidationError::MissingArgument(name)),
        DateArg::Text(text) if is_iso_day(&text) => Ok(text),
        DateArg::Text(_) => Err(invalid()),
        DateArg::Date(day) => Ok(day.format(DATE_FORMAT).to_string()),
        DateArg::Timestamp(ts) => Ok(ts.format(DATE_FORMAT).to_string()),
        DateArg::EpochMillis(0) => Err(ValidationError::MissingArgument(name)),
        DateArg::EpochMillis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|ts| ts.format(DATE_FORMAT).to_string())
            .ok_or_else(invalid),
    }
}

// Shape only (four digits, dash, two, dash, two); the API validates the day.
fn is_iso_day(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

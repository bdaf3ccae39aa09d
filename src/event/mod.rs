//! The record every logging call builds: a level, an optional in-place marker,
//! and the ordered where/what/results fields.

mod error_info;

pub use error_info::{Cause, ErrorInfo, MAX_CAUSE_DEPTH, error_cause, error_data};

use crate::level::Level;
use chrono::{DateTime, Local};

/// Tells the console output to rewrite the current line instead of appending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateMarker {
    /// Redraw the in-place region with this record.
    InPlaceUpdate,
    /// Redraw once more, then leave the region on screen.
    InPlaceDone,
}

/// One positional value of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    /// Structured data; an object with a string `message` renders as that message.
    Json(serde_json::Value),
    Error(ErrorInfo),
    /// An absent value. Skipped among results, empty in `where`/`what`.
    Missing,
}

impl Field {
    /// The text used where a value is rendered as-is (`where`, `what`, plain results).
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Json(serde_json::Value::String(s)) => s.clone(),
            Self::Json(value) => value.to_string(),
            Self::Error(info) => info.message.clone(),
            Self::Missing => String::new(),
        }
    }

    /// The `message` a value carries, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        let message = match self {
            Self::Json(value) => value.get("message").and_then(serde_json::Value::as_str),
            Self::Error(info) => Some(info.message.as_str()),
            _ => None,
        };
        message.filter(|m| !m.is_empty())
    }

    /// Captures any standard error, following its `source()` chain.
    #[must_use]
    pub fn error<E: std::error::Error + ?Sized>(e: &E) -> Self {
        Self::Error(ErrorInfo::from_error(e))
    }

    /// The error-like value behind this field, if it passes the capability check.
    #[must_use]
    pub fn as_error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Error(info) if info.is_error_like() => Some(info),
            _ => None,
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Field {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<serde_json::Value> for Field {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<ErrorInfo> for Field {
    fn from(info: ErrorInfo) -> Self {
        Self::Error(info)
    }
}

impl From<&crate::Error> for Field {
    fn from(e: &crate::Error) -> Self {
        Self::Error(ErrorInfo::from_error(e))
    }
}

impl From<&std::io::Error> for Field {
    fn from(e: &std::io::Error) -> Self {
        Self::Error(ErrorInfo::from_error(e))
    }
}

impl<T: Into<Self>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

macro_rules! field_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Field {
                fn from(value: $t) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

field_from_display!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Built per call, consumed synchronously by every output, then dropped.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub marker: Option<UpdateMarker>,
    /// `[where, what, results...]` in call order.
    pub fields: Vec<Field>,
}

impl LogEvent {
    /// Stamps the event with the current local time.
    #[must_use]
    pub fn new(level: Level, fields: Vec<Field>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            marker: None,
            fields,
        }
    }

    #[must_use]
    pub const fn marker(mut self, marker: Option<UpdateMarker>) -> Self {
        self.marker = marker;
        self
    }

    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Index 0 of the fields.
    #[must_use]
    pub fn place(&self) -> Option<&Field> {
        self.fields.first()
    }

    /// Index 1 of the fields.
    #[must_use]
    pub fn action(&self) -> Option<&Field> {
        self.fields.get(1)
    }

    /// Everything after `where` and `what`.
    #[must_use]
    pub fn results(&self) -> &[Field] {
        self.fields.get(2..).unwrap_or(&[])
    }
}

//! Severity levels that gate which records reach the outputs.

use crate::fmt::Color;
use std::fmt;
use std::str::FromStr;

/// Derives `Ord` so the facade can compare a record's level against the configured minimum.
///
/// `All` and `Off` are thresholds only: no record is ever emitted at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Threshold that lets every record through.
    #[default]
    All = 0,
    /// High-frequency, low-level data such as loop counters. Not for production.
    Trace = 1,
    /// Low-frequency calculation results and unimportant heartbeats.
    Debug = 2,
    /// Regular summaries, or expected exceptions that were handled.
    Info = 3,
    /// Operations that may lead to problems later (a retried connection).
    Warn = 4,
    /// Abnormal logic and unexpected errors that interrupt an operation.
    Error = 5,
    /// Critical failures that make the program exit.
    Fatal = 6,
    /// Notices unrelated to program state; shown unless logging is off.
    Mark = 7,
    /// Threshold that discards every record.
    Off = 8,
}

impl Level {
    /// Lowercase because options files, env vars and CLI args use lowercase level strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Mark => "mark",
            Self::Off => "off",
        }
    }

    /// Uppercase key used for locale lookups (`level.INFO`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Mark => "MARK",
            Self::Off => "OFF",
        }
    }

    /// Whole-line color used when highlighting is on.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Trace => Color::blue(),
            Self::Debug => Color::cyan(),
            Self::Info => Color::green(),
            Self::Warn => Color::yellow(),
            Self::Error => Color::red(),
            Self::Fatal => Color::magenta(),
            Self::Mark | Self::All | Self::Off => Color::grey(),
        }
    }

    /// A record passes when it is at or above `min`, and `min` is not `Off`.
    #[must_use]
    pub const fn passes(self, min: Self) -> bool {
        !matches!(min, Self::Off) && self as u8 >= min as u8
    }

    /// The seven levels a record can carry, lowest first.
    #[must_use]
    pub const fn records() -> [Self; 7] {
        [
            Self::Trace,
            Self::Debug,
            Self::Info,
            Self::Warn,
            Self::Error,
            Self::Fatal,
            Self::Mark,
        ]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `FromStr` so callers can distinguish "unknown level" from other parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl From<ParseLevelError> for crate::Error {
    fn from(e: ParseLevelError) -> Self {
        Self::InvalidLevel(e.0)
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "err" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "mark" => Ok(Self::Mark),
            "off" | "none" => Ok(Self::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Level {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

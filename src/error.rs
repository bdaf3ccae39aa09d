//! Unified error type for all hades operations.

use std::path::PathBuf;

/// Error type for hades operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(std::io::Error),
    /// TOML options or locale parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Invalid log level string.
    InvalidLevel(String),
    /// A file output was configured without a formatting handler.
    InvalidHandler(PathBuf),
    /// The writer thread behind a file output is gone.
    StreamClosed(PathBuf),
    /// Tearing down the outputs failed during shutdown or reload.
    Shutdown(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::InvalidLevel(level) => write!(f, "invalid log level: {level}"),
            Self::InvalidHandler(p) => {
                write!(f, "no formatting handler configured for {}", p.display())
            }
            Self::StreamClosed(p) => write!(f, "log stream closed: {}", p.display()),
            Self::Shutdown(s) => write!(f, "shutdown failed: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}

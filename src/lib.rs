//! `hades` - where/what/results structured logging.
//!
//! Every record is positional: the place it comes from, what happened, and any
//! number of results or errors:
//!
//! ```text
//! [24-05-01 12:00:00:000][INFO] Store >  Save  3 rows
//! ```
//!
//! - Console output with in-place line updates for progress-style logging
//! - Size-rolled log files with a separate `.stack.log` for error stacks and cause chains
//! - `~[term]` / `~{value}` highlight markup
//! - Backpressure signals when the file writer falls behind
//! - English and Chinese level labels
//!
//! # Example
//!
//! ```
//! use hades::{Field, Hades, Level};
//!
//! let hades = Hades::builder()
//!     .level(Level::Debug)
//!     .without_env()
//!     .announce_init(false)
//!     .build()
//!     .unwrap();
//!
//! hades.info("Store", "Save", &[Field::from("3 rows")]);
//! hades.info_u("Sync", "~[upload]", &[Field::from("40%")]);
//! hades.info_d("Sync", "~[upload]", &[Field::from("done")]);
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `hades` binary

mod macros;

pub mod config;
pub mod error;
pub mod event;
pub mod fmt;
pub mod internal;
pub mod level;
pub mod locale;
pub mod logger;
pub mod output;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Defaults, Generation, Options, Settings};
pub use error::Error;
pub use event::{Cause, ErrorInfo, Field, LogEvent, UpdateMarker, error_cause, error_data};
pub use fmt::{FormattedRecord, Formatter, format_event, highlight};
pub use level::Level;
pub use locale::Locale;
pub use logger::{Hades, HadesBuilder, RELOAD_BACKLOG};
pub use output::{Backpressure, ConsoleOutput, FileOutput, FileOutputBuilder, Output};

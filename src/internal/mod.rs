//! Hades' own diagnostics, rendered through the same formatter as user records
//! and written to stderr.
//!
//! This is also the error channel for failures that must not reach the caller,
//! such as a writer thread failing to append to its file. Before `init`, only
//! warnings and errors get through.

use crate::event::{Field, LogEvent};
use crate::fmt::format_event;
use crate::level::Level;
use crate::locale::Locale;
use std::io::{self, IsTerminal, Write};
use std::sync::{LazyLock, OnceLock};

static INTERNAL_LEVEL: OnceLock<Level> = OnceLock::new();
static INTERNAL_LOCALE: LazyLock<Locale> = LazyLock::new(Locale::english);

const PRE_INIT_LEVEL: Level = Level::Warn;

/// Sets the diagnostic threshold. Only the first call takes effect; returns whether it did.
pub fn init(level: Level) -> bool {
    let first = INTERNAL_LEVEL.set(level).is_ok();
    if first {
        debug("INTERNAL", &format!("diagnostics at level {level}"));
    }
    first
}

/// The active threshold.
#[must_use]
pub fn level() -> Level {
    INTERNAL_LEVEL.get().copied().unwrap_or(PRE_INIT_LEVEL)
}

fn log(level: Level, scope: &str, msg: &str) {
    if !level.passes(self::level()) {
        return;
    }

    let stderr = io::stderr();
    let event = LogEvent::new(level, vec![Field::from(scope), Field::from(msg)]);
    let record = format_event(&event, stderr.is_terminal(), &INTERNAL_LOCALE);
    let _ = writeln!(stderr.lock(), "{}", record.line);
}

/// Per-line detail such as rollovers and queue transitions.
pub fn trace(scope: &str, msg: &str) {
    log(Level::Trace, scope, msg);
}

/// Startup and teardown details.
pub fn debug(scope: &str, msg: &str) {
    log(Level::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

/// Recoverable problems: bad env values, dropped lines, fallbacks.
pub fn warn(scope: &str, msg: &str) {
    log(Level::Warn, scope, msg);
}

/// Failures that lose output: I/O errors in writer threads, failed reopens.
pub fn error(scope: &str, msg: &str) {
    log(Level::Error, scope, msg);
}

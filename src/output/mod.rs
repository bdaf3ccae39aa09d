//! Where formatted records go. The facade always registers a console output and,
//! with a log directory, two file outputs; the `Output` trait lets callers add
//! their own.

mod console;
mod file;
mod pressure;
mod rolling;
mod updater;

pub use console::ConsoleOutput;
pub use file::{
    DEFAULT_BACKUPS, DEFAULT_HIGH_WATER, DEFAULT_MAX_SIZE, DEFAULT_QUEUE_CAPACITY, FileOutput,
    FileOutputBuilder,
};
pub use pressure::{Backpressure, PressureListener};
pub use rolling::RollingFile;
pub use updater::LineUpdater;

use crate::event::LogEvent;
use crate::fmt::Formatter;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Turns an event into the text a file output appends. `None` or an empty string writes nothing.
pub type Handler = Arc<dyn Fn(&LogEvent, &Formatter) -> Option<String> + Send + Sync>;

/// The record line, for the primary log file.
#[must_use]
pub fn line_handler() -> Handler {
    Arc::new(|event: &LogEvent, formatter: &Formatter| {
        Some(formatter.format(event).line)
    })
}

/// Only the stack block, for the `.stack.log` file. Records without errors produce nothing.
#[must_use]
pub fn stack_handler() -> Handler {
    Arc::new(|event: &LogEvent, formatter: &Formatter| {
        formatter.format(event).stack_block
    })
}

/// `Send + Sync` so one facade can be shared across threads.
pub trait Output: Send + Sync {
    /// Renders and emits one event.
    ///
    /// # Errors
    /// Misconfiguration (`InvalidHandler`), a closed stream, or console I/O errors.
    /// Backpressure is never an error.
    fn write(&self, event: &LogEvent) -> Result<(), crate::Error>;

    /// Blocks until everything written so far has reached the sink.
    ///
    /// # Errors
    /// I/O errors from the underlying sink.
    fn flush(&self) -> Result<(), crate::Error>;

    /// Closes and reopens the underlying stream, for external log rotation.
    ///
    /// # Errors
    /// The stream is already closed.
    fn reopen(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Flushes and releases the sink. Later writes fail or are ignored.
    ///
    /// # Errors
    /// The sink could not be closed cleanly.
    fn shutdown(&self) -> Result<(), crate::Error> {
        self.flush()
    }

    /// Whether producers should currently throttle.
    fn is_paused(&self) -> bool {
        false
    }
}

/// Outputs keep working after a panic elsewhere; the guarded state is always consistent between writes.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

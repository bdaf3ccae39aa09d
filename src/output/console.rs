//! The console output: record lines on stdout (in place when the event carries an
//! update marker), stack blocks on stderr.

use super::{LineUpdater, Output, lock};
use crate::event::{LogEvent, UpdateMarker};
use crate::fmt::Formatter;
use std::io::{self, Write};
use std::sync::Mutex;

type Sink = Box<dyn Write + Send>;

pub struct ConsoleOutput {
    formatter: Formatter,
    out: Mutex<LineUpdater<Sink>>,
    err: Mutex<Sink>,
}

impl ConsoleOutput {
    /// Writes to the process's stdout and stderr.
    #[must_use]
    pub fn new(formatter: Formatter) -> Self {
        Self::with_writers(formatter, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Writes to arbitrary sinks instead of the standard streams.
    #[must_use]
    pub fn with_writers(formatter: Formatter, out: Sink, err: Sink) -> Self {
        Self {
            formatter,
            out: Mutex::new(LineUpdater::new(out)),
            err: Mutex::new(err),
        }
    }
}

impl Output for ConsoleOutput {
    fn write(&self, event: &LogEvent) -> Result<(), crate::Error> {
        let record = self.formatter.format(event);

        {
            let mut out = lock(&self.out);
            match event.marker {
                Some(UpdateMarker::InPlaceUpdate) => out.update(&record.line)?,
                Some(UpdateMarker::InPlaceDone) => {
                    out.update(&record.line)?;
                    out.done();
                }
                None => out.println(&record.line)?,
            }
        }

        if let Some(block) = record.stack_block {
            writeln!(lock(&self.err), "{block}")?;
        }

        Ok(())
    }

    fn flush(&self) -> Result<(), crate::Error> {
        lock(&self.out).flush()?;
        lock(&self.err).flush()?;
        Ok(())
    }
}

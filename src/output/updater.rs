//! Progress-style output: redraws the last block of lines instead of appending.

use crossterm::cursor::MoveUp;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

/// Remembers how many lines the last in-place draw took, so the next draw can erase them.
#[derive(Debug)]
pub struct LineUpdater<W: Write> {
    out: W,
    drawn: usize,
}

impl<W: Write> LineUpdater<W> {
    pub const fn new(out: W) -> Self {
        Self { out, drawn: 0 }
    }

    /// Erases the previous in-place region and draws `text` in its place.
    ///
    /// # Errors
    /// I/O errors from the terminal.
    pub fn update(&mut self, text: &str) -> io::Result<()> {
        for _ in 0..self.drawn {
            queue!(self.out, MoveUp(1), Clear(ClearType::CurrentLine))?;
        }
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        self.drawn = text.split('\n').count();
        Ok(())
    }

    /// Leaves the current region on screen; the next update starts below it.
    pub const fn done(&mut self) {
        self.drawn = 0;
    }

    /// Appends a regular line, finalizing any pending region first.
    ///
    /// # Errors
    /// I/O errors from the terminal.
    pub fn println(&mut self, text: &str) -> io::Result<()> {
        self.done();
        writeln!(self.out, "{text}")
    }

    /// Number of lines the pending region occupies.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.drawn
    }

    /// # Errors
    /// I/O errors from the terminal.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

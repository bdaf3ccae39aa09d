//! Size-based rolling file: `app.log` rolls to `app.log.1`, `app.log.1` to
//! `app.log.2`, and so on up to the backup count. Rotation and backup pruning
//! are done by `file-rotate`; this adapter only decides when to roll so a line
//! is never split across two files.

use crate::internal;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

type Rotating = BufWriter<FileRotate<AppendCount>>;

pub struct RollingFile {
    path: PathBuf,
    /// Rollover threshold in bytes; 0 never rolls.
    max_size: u64,
    backups: usize,
    file: Option<Rotating>,
    size: u64,
}

impl std::fmt::Debug for RollingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollingFile")
            .field("path", &self.path)
            .field("max_size", &self.max_size)
            .field("backups", &self.backups)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl RollingFile {
    /// Opens `path` for appending, creating parent directories as needed.
    ///
    /// A backup count of 0 is treated as 1.
    ///
    /// # Errors
    /// The directory or file cannot be created.
    pub fn open(path: impl Into<PathBuf>, max_size: u64, backups: usize) -> io::Result<Self> {
        let mut rolling = Self {
            path: path.into(),
            max_size,
            backups: backups.max(1),
            file: None,
            size: 0,
        };
        rolling.open_current()?;
        Ok(rolling)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn backups(&self) -> usize {
        self.backups
    }

    /// Bytes in the current file, including buffered ones.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// `app.log.<n>`.
    #[must_use]
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    /// Appends `bytes`, rolling first if they would push a non-empty file past the threshold.
    ///
    /// # Errors
    /// I/O errors while rolling or writing.
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let len = bytes.len() as u64;
        if self.file.is_none() {
            self.open_current()?;
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        if self.max_size > 0 && self.size > 0 && self.size + len > self.max_size {
            file.flush()?;
            file.get_mut().rotate()?;
            self.size = 0;
            internal::trace("FILE", &format!("Rolled {}", self.path.display()));
        }

        file.write_all(bytes)?;
        self.size += len;
        Ok(())
    }

    /// # Errors
    /// I/O errors from the file.
    pub fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Closes and reopens the same path; a file moved away by an external
    /// rotator is replaced by a fresh one.
    ///
    /// # Errors
    /// I/O errors while closing or opening.
    pub fn reopen(&mut self) -> io::Result<()> {
        self.close()?;
        self.open_current()
    }

    /// Flushes and releases the handle. A later `write` opens it again.
    ///
    /// # Errors
    /// Buffered bytes could not be flushed.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }

    fn open_current(&mut self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            internal::debug("FILE", &format!("Created directory: {}", parent.display()));
        }

        // FileRotate does not report open errors.
        let existing = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.size = existing.metadata()?.len();
        drop(existing);

        let limit = if self.max_size == 0 {
            ContentLimit::None
        } else {
            ContentLimit::Bytes(usize::try_from(self.max_size).unwrap_or(usize::MAX))
        };
        let rotate = FileRotate::new(
            &self.path,
            AppendCount::new(self.backups),
            limit,
            Compression::None,
            #[cfg(unix)]
            None,
        );
        self.file = Some(BufWriter::new(rotate));
        Ok(())
    }
}

impl Drop for RollingFile {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

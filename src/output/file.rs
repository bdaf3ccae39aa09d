//! Rolling file output. Formatting happens on the caller's thread; appending
//! happens on a writer thread fed through a bounded queue, so a slow disk
//! throttles producers (via `Backpressure`) instead of blocking them.

use super::pressure::{Gauge, Notifier, Signals};
use super::{Backpressure, Handler, Output, PressureListener, RollingFile, lock};
use crate::event::{Field, LogEvent};
use crate::fmt::{Formatter, strip_ansi};
use crate::internal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_MAX_SIZE: u64 = 20 * 1024 * 1024;
pub const DEFAULT_BACKUPS: usize = 5;
pub const DEFAULT_HIGH_WATER: usize = 256;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// How often an idle writer checks for a pending hangup.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum Command {
    Line(String),
    Flush(SyncSender<()>),
    Reopen(SyncSender<()>),
    Shutdown,
}

/// Builder for [`FileOutput`].
pub struct FileOutputBuilder {
    path: PathBuf,
    max_size: u64,
    backups: usize,
    formatter: Formatter,
    strip_color: bool,
    eol: String,
    handler: Option<Handler>,
    high_water: usize,
    capacity: usize,
    listener: Option<PressureListener>,
    reopen_on_hangup: bool,
}

impl FileOutputBuilder {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: DEFAULT_MAX_SIZE,
            backups: DEFAULT_BACKUPS,
            formatter: Formatter::default(),
            strip_color: true,
            eol: "\n".to_string(),
            handler: None,
            high_water: DEFAULT_HIGH_WATER,
            capacity: DEFAULT_QUEUE_CAPACITY,
            listener: None,
            reopen_on_hangup: false,
        }
    }

    /// Rollover threshold in bytes. 0 disables rollover.
    #[must_use]
    pub const fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Number of numbered backups kept. 0 is treated as 1.
    #[must_use]
    pub const fn backups(mut self, count: usize) -> Self {
        self.backups = count;
        self
    }

    #[must_use]
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn highlighted(mut self, enabled: bool) -> Self {
        self.formatter = self.formatter.highlighted(enabled);
        self
    }

    /// Remove ANSI color codes from text fields before the handler sees them.
    #[must_use]
    pub const fn strip_color(mut self, enabled: bool) -> Self {
        self.strip_color = enabled;
        self
    }

    #[must_use]
    pub fn eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Queued lines at which `Backpressure::Pause` fires.
    #[must_use]
    pub const fn high_water(mut self, lines: usize) -> Self {
        self.high_water = lines;
        self
    }

    /// Lines the queue holds before new ones are dropped. Never below the high-water mark.
    #[must_use]
    pub const fn capacity(mut self, lines: usize) -> Self {
        self.capacity = lines;
        self
    }

    #[must_use]
    pub fn on_backpressure(mut self, listener: PressureListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Reopen the file when the process receives `SIGHUP`. Unix only.
    #[must_use]
    pub const fn reopen_on_hangup(mut self, enabled: bool) -> Self {
        self.reopen_on_hangup = enabled;
        self
    }

    /// Opens the file and starts the writer thread.
    ///
    /// # Errors
    /// The file cannot be opened, the hangup hook cannot be installed, or the
    /// thread cannot be spawned.
    pub fn build(self) -> Result<FileOutput, crate::Error> {
        let file = RollingFile::open(&self.path, self.max_size, self.backups)?;
        let high_water = self.high_water.max(1);
        let gauge = Arc::new(Gauge::new(high_water));
        let (sender, receiver) = mpsc::sync_channel(self.capacity.max(high_water));

        let hangup = Arc::new(AtomicBool::new(false));
        let hook = if self.reopen_on_hangup {
            HangupHook::register(&hangup)?
        } else {
            HangupHook::none()
        };

        let name = self
            .path
            .file_name()
            .map_or_else(|| "hades-file".to_string(), |n| format!("hades:{}", n.to_string_lossy()));
        let notifier = self
            .listener
            .map(|listener| Notifier::spawn(format!("{name}:pressure"), listener))
            .transpose()?;
        let signals = notifier.as_ref().and_then(Notifier::signals);

        let worker = Worker {
            file,
            gauge: Arc::clone(&gauge),
            signals,
            hangup,
        };
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || worker.run(&receiver))?;

        internal::debug("FILE", &format!("Writing to {}", self.path.display()));

        Ok(FileOutput {
            path: self.path,
            formatter: self.formatter,
            strip_color: self.strip_color,
            eol: self.eol,
            handler: self.handler,
            gauge,
            notifier,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            hook: Mutex::new(hook),
        })
    }
}

/// Appends handler output to a size-rolled file on its own thread.
pub struct FileOutput {
    path: PathBuf,
    formatter: Formatter,
    strip_color: bool,
    eol: String,
    handler: Option<Handler>,
    gauge: Arc<Gauge>,
    notifier: Option<Notifier>,
    sender: Mutex<Option<SyncSender<Command>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    hook: Mutex<HangupHook>,
}

impl std::fmt::Debug for FileOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOutput")
            .field("path", &self.path)
            .field("strip_color", &self.strip_color)
            .field("gauge", &self.gauge)
            .finish_non_exhaustive()
    }
}

impl FileOutput {
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> FileOutputBuilder {
        FileOutputBuilder::new(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shuts down, then calls `done` once the file is closed.
    ///
    /// # Errors
    /// See [`Output::shutdown`].
    pub fn shutdown_with(&self, done: impl FnOnce()) -> Result<(), crate::Error> {
        let result = self.close();
        done();
        result
    }

    fn send(&self, command: Command) -> Result<(), crate::Error> {
        let sender = lock(&self.sender).clone();
        let Some(sender) = sender else {
            return Err(crate::Error::StreamClosed(self.path.clone()));
        };
        sender
            .send(command)
            .map_err(|_| crate::Error::StreamClosed(self.path.clone()))
    }

    /// Sends `make(ack)` and waits for the writer to acknowledge it.
    fn round_trip(&self, make: fn(SyncSender<()>) -> Command) -> Result<(), crate::Error> {
        let (ack, done) = mpsc::sync_channel(1);
        self.send(make(ack))?;
        done.recv()
            .map_err(|_| crate::Error::StreamClosed(self.path.clone()))
    }

    fn enqueue(&self, line: String) -> Result<(), crate::Error> {
        let sender = lock(&self.sender);
        let Some(sender) = sender.as_ref() else {
            return Err(crate::Error::StreamClosed(self.path.clone()));
        };

        // Queued before the line so the writer's Resume cannot overtake it.
        if let Some(signal) = self.gauge.enqueued()
            && let Some(notifier) = &self.notifier
        {
            notifier.send(signal);
        }
        match sender.try_send(Command::Line(line)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.gauge.rejected();
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                self.gauge.rejected();
                Err(crate::Error::StreamClosed(self.path.clone()))
            }
        }
    }

    fn close(&self) -> Result<(), crate::Error> {
        lock(&self.hook).unregister();

        let Some(sender) = lock(&self.sender).take() else {
            return Ok(());
        };
        // A dead writer already dropped its file; nothing left to close.
        let _ = sender.send(Command::Shutdown);
        drop(sender);

        if let Some(handle) = lock(&self.worker).take() {
            handle.join().map_err(|_| {
                crate::Error::Shutdown(format!("writer for {} panicked", self.path.display()))
            })?;
        }
        if let Some(notifier) = &self.notifier {
            notifier.close();
        }
        internal::debug("FILE", &format!("Closed {}", self.path.display()));
        Ok(())
    }
}

impl Output for FileOutput {
    fn write(&self, event: &LogEvent) -> Result<(), crate::Error> {
        let Some(handler) = &self.handler else {
            return Err(crate::Error::InvalidHandler(self.path.clone()));
        };

        let text = if self.strip_color {
            handler(&without_color(event), &self.formatter)
        } else {
            handler(event, &self.formatter)
        };

        match text {
            Some(text) if !text.is_empty() => self.enqueue(text + &self.eol),
            _ => Ok(()),
        }
    }

    /// Also waits for pending backpressure signals, except from inside a listener.
    fn flush(&self) -> Result<(), crate::Error> {
        self.round_trip(Command::Flush)?;
        if let Some(notifier) = &self.notifier {
            notifier.sync();
        }
        Ok(())
    }

    fn reopen(&self) -> Result<(), crate::Error> {
        self.round_trip(Command::Reopen)
    }

    fn shutdown(&self) -> Result<(), crate::Error> {
        self.close()
    }

    fn is_paused(&self) -> bool {
        self.gauge.is_paused()
    }
}

impl Drop for FileOutput {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            internal::error("FILE", &e.to_string());
        }
    }
}

fn without_color(event: &LogEvent) -> LogEvent {
    let mut event = event.clone();
    for field in &mut event.fields {
        match field {
            Field::Text(text) => *text = strip_ansi(text),
            Field::Json(serde_json::Value::String(text)) => *text = strip_ansi(text),
            _ => {}
        }
    }
    event
}

struct Worker {
    file: RollingFile,
    gauge: Arc<Gauge>,
    signals: Option<Signals>,
    hangup: Arc<AtomicBool>,
}

impl Worker {
    fn run(mut self, receiver: &mpsc::Receiver<Command>) {
        loop {
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok(Command::Line(line)) => {
                    self.append(&line);
                    if self.gauge.dequeued() {
                        self.idle();
                    }
                }
                Ok(Command::Flush(ack)) => {
                    self.idle();
                    let _ = ack.send(());
                }
                Ok(Command::Reopen(ack)) => {
                    self.reopen();
                    let _ = ack.send(());
                }
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                // A line refused while the writer was busy can leave the gauge paused.
                Err(RecvTimeoutError::Timeout) => self.settle(),
            }

            if self.hangup.swap(false, Ordering::AcqRel) {
                internal::info(
                    "FILE",
                    &format!("SIGHUP, reopening {}", self.file.path().display()),
                );
                self.reopen();
            }
        }

        let result = self.file.close();
        self.report("close", result);
    }

    fn append(&mut self, line: &str) {
        let result = self.file.write(line.as_bytes());
        self.report("write", result);
    }

    /// The queue just drained: make the bytes visible and lift any pause.
    fn idle(&mut self) {
        let result = self.file.flush();
        self.report("flush", result);
        self.settle();
    }

    fn settle(&self) {
        let Some(dropped) = self.gauge.settle() else {
            return;
        };
        internal::trace("FILE", &format!("{:?}", Backpressure::Resume));
        if let Some(signals) = &self.signals {
            signals.send(Backpressure::Resume);
        }
        if dropped > 0 {
            internal::warn(
                "FILE",
                &format!(
                    "{dropped} lines dropped while {} was paused",
                    self.file.path().display()
                ),
            );
        }
    }

    fn reopen(&mut self) {
        let result = self.file.reopen();
        self.report("reopen", result);
    }

    fn report(&self, action: &str, result: std::io::Result<()>) {
        if let Err(e) = result {
            internal::error(
                "FILE",
                &format!("{action} failed for {}: {e}", self.file.path().display()),
            );
        }
    }
}

/// The `SIGHUP` registration of one output.
struct HangupHook {
    #[cfg(unix)]
    id: Option<signal_hook::SigId>,
}

impl HangupHook {
    const fn none() -> Self {
        Self {
            #[cfg(unix)]
            id: None,
        }
    }

    #[cfg(unix)]
    fn register(flag: &Arc<AtomicBool>) -> Result<Self, crate::Error> {
        let id = signal_hook::flag::register(signal_hook::consts::SIGHUP, Arc::clone(flag))?;
        Ok(Self { id: Some(id) })
    }

    #[cfg(not(unix))]
    fn register(_flag: &Arc<AtomicBool>) -> Result<Self, crate::Error> {
        internal::debug("FILE", "SIGHUP reopen is not available on this platform");
        Ok(Self::none())
    }

    fn unregister(&mut self) {
        #[cfg(unix)]
        if let Some(id) = self.id.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

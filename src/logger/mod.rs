//! The `Hades` facade: resolves settings once, wires the console and file
//! outputs on `init`, and fans every record out to them.

mod builder;

pub use builder::HadesBuilder;

use crate::config::{Options, Settings};
use crate::event::{Field, LogEvent, UpdateMarker};
use crate::fmt::Formatter;
use crate::internal;
use crate::level::Level;
use crate::output::{
    Backpressure, ConsoleOutput, FileOutput, Handler, Output, PressureListener, line_handler,
    lock, stack_handler,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use tokio::sync::oneshot;

/// Records held for the file outputs while `reload` swaps them.
pub const RELOAD_BACKLOG: usize = 1024;

enum State {
    Uninitialized,
    /// Between closing the old files and opening the new ones in `reload`.
    Reloading(Mutex<Backlog>),
    /// The file outputs registered by the last `init`; empty without a log directory.
    Initialized(Vec<FileOutput>),
}

#[derive(Default)]
struct Backlog {
    events: Vec<LogEvent>,
    dropped: usize,
}

impl Backlog {
    fn push(&mut self, event: LogEvent) {
        if self.events.len() < RELOAD_BACKLOG {
            self.events.push(event);
        } else {
            self.dropped += 1;
        }
    }

    fn replay(self, files: &[FileOutput]) {
        for event in &self.events {
            for file in files {
                if let Err(e) = file.write(event) {
                    internal::error("HADES", &e.to_string());
                }
            }
        }
        self.report_dropped();
    }

    fn report_dropped(&self) {
        if self.dropped > 0 {
            internal::warn(
                "HADES",
                &format!("{} records dropped while reloading", self.dropped),
            );
        }
    }
}

/// Where/what/results logger.
///
/// Calls made before [`Hades::init`] (or after [`Hades::shutdown`]) are dropped.
pub struct Hades {
    settings: Settings,
    formatter: Formatter,
    console: ConsoleOutput,
    extra: Vec<Box<dyn Output>>,
    listeners: Arc<RwLock<Vec<PressureListener>>>,
    reopen_on_hangup: bool,
    state: RwLock<State>,
}

impl std::fmt::Debug for Hades {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hades")
            .field("settings", &self.settings)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

macro_rules! entry_points {
    ($($level:ident => $plain:ident, $update:ident, $done:ident;)*) => {
        $(
            #[doc = concat!("Logs at `", stringify!($level), "`.")]
            pub fn $plain(&self, place: &str, what: &str, results: &[Field]) {
                self.log(Level::$level, None, place, what, results);
            }

            #[doc = concat!("Logs at `", stringify!($level), "`, redrawing the in-place console region.")]
            pub fn $update(&self, place: &str, what: &str, results: &[Field]) {
                self.log(Level::$level, Some(UpdateMarker::InPlaceUpdate), place, what, results);
            }

            #[doc = concat!("Logs at `", stringify!($level), "` and finalizes the in-place console region.")]
            pub fn $done(&self, place: &str, what: &str, results: &[Field]) {
                self.log(Level::$level, Some(UpdateMarker::InPlaceDone), place, what, results);
            }
        )*
    };
}

impl Hades {
    #[must_use]
    pub fn builder() -> HadesBuilder {
        HadesBuilder::new()
    }

    /// Positional construction. `None` falls through to the environment and defaults.
    ///
    /// # Errors
    /// See [`HadesBuilder::build`].
    pub fn new(
        name: Option<&str>,
        level: Option<Level>,
        dir: Option<&Path>,
        options: Options,
    ) -> Result<Self, crate::Error> {
        let positional = Options {
            name: name.map(ToString::to_string),
            level,
            dir: dir.map(Path::to_path_buf),
            ..Options::default()
        };
        Self::builder().options(options.merge(positional)).build()
    }

    /// Registers the outputs. Calling it again while initialized does nothing.
    ///
    /// # Errors
    /// The log directory or one of the log files cannot be created.
    pub fn init(&self) -> Result<(), crate::Error> {
        {
            let mut state = write(&self.state);
            if matches!(*state, State::Initialized(_)) {
                internal::debug("HADES", "already initialized");
                return Ok(());
            }
            let backlog = match std::mem::replace(&mut *state, State::Uninitialized) {
                State::Reloading(backlog) => into_inner(backlog),
                _ => Backlog::default(),
            };
            let files = match self.open_files() {
                Ok(files) => files,
                Err(e) => {
                    if !backlog.events.is_empty() {
                        internal::warn(
                            "HADES",
                            &format!("{} records lost with the failed init", backlog.events.len()),
                        );
                    }
                    backlog.report_dropped();
                    return Err(e);
                }
            };
            backlog.replay(&files);
            *state = State::Initialized(files);
        }

        internal::debug(
            "HADES",
            &format!(
                "{} initialized at level {}",
                self.settings.name, self.settings.level
            ),
        );

        if self.settings.announce_init {
            self.announce();
        }
        Ok(())
    }

    /// Closes the files on a thread of their own, then initializes again.
    /// Works under any executor.
    ///
    /// The console keeps logging throughout. File records logged meanwhile
    /// are held (up to [`RELOAD_BACKLOG`]) and written to the new files.
    ///
    /// # Errors
    /// `Error::Shutdown` when the old outputs cannot be closed or the new ones
    /// cannot be opened. The facade is left uninitialized.
    pub async fn reload(&self) -> Result<&Self, crate::Error> {
        let files = self.begin_reload();
        internal::debug("HADES", &format!("reloading, closing {} files", files.len()));

        let (done, closed) = oneshot::channel();
        let teardown = thread::Builder::new()
            .name("hades-reload".to_string())
            .spawn(move || {
                let _ = done.send(close_all(files));
            });
        let closed = match teardown {
            Ok(_) => closed.await.unwrap_or_else(|_| {
                Err(crate::Error::Shutdown("reload teardown panicked".to_string()))
            }),
            Err(e) => Err(crate::Error::Shutdown(format!("reload teardown: {e}"))),
        };
        if let Err(e) = closed {
            self.abandon_reload();
            return Err(e);
        }

        self.init()
            .map_err(|e| crate::Error::Shutdown(format!("re-init failed: {e}")))?;
        Ok(self)
    }

    /// Flushes the console and closes the files. Records are dropped until the next `init`.
    ///
    /// # Errors
    /// `Error::Shutdown` if a file output could not be closed cleanly.
    pub fn shutdown(&self) -> Result<(), crate::Error> {
        let files = self.take_files();
        let flushed = self.flush_unregistered();
        close_all(files)?;
        flushed
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !matches!(*read(&self.state), State::Uninitialized)
    }

    /// Whether any file output is above its high-water mark.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        match &*read(&self.state) {
            State::Initialized(files) => files.iter().any(Output::is_paused),
            State::Uninitialized | State::Reloading(_) => false,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Adds a listener for pause/resume signals from the file outputs,
    /// including the ones opened by later `init`/`reload` calls.
    pub fn on_backpressure(&self, listener: impl Fn(Backpressure) + Send + Sync + 'static) {
        write(&self.listeners).push(Arc::new(listener));
    }

    /// Blocks until every output has written what it was given.
    ///
    /// # Errors
    /// The first error any output reports.
    pub fn flush(&self) -> Result<(), crate::Error> {
        self.flush_unregistered()?;
        if let State::Initialized(files) = &*read(&self.state) {
            for file in files {
                file.flush()?;
            }
        }
        Ok(())
    }

    /// The entry point every level method forwards to.
    pub fn log(
        &self,
        level: Level,
        marker: Option<UpdateMarker>,
        place: &str,
        what: &str,
        results: &[Field],
    ) {
        if !level.passes(self.settings.level) {
            return;
        }

        let state = read(&self.state);
        if matches!(*state, State::Uninitialized) {
            return;
        }

        let mut fields = Vec::with_capacity(results.len() + 2);
        fields.push(Field::from(place));
        fields.push(Field::from(what));
        fields.extend_from_slice(results);
        let event = LogEvent::new(level, fields).marker(marker);

        let emit = |output: &dyn Output| {
            if let Err(e) = output.write(&event) {
                internal::error("HADES", &e.to_string());
            }
        };
        emit(&self.console);
        self.extra.iter().for_each(|output| emit(output.as_ref()));
        match &*state {
            State::Initialized(files) => files.iter().for_each(|file| emit(file)),
            State::Reloading(backlog) => lock(backlog).push(event),
            State::Uninitialized => {}
        }
    }

    entry_points! {
        Trace => trace, trace_u, trace_d;
        Debug => debug, debug_u, debug_d;
        Info => info, info_u, info_d;
        Warn => warn, warn_u, warn_d;
        Error => error, error_u, error_d;
        Fatal => fatal, fatal_u, fatal_d;
        Mark => mark, mark_u, mark_d;
    }

    /// Logs at `Fatal`, flushes and closes what it can, and exits with `code`.
    pub fn fatal_e(&self, code: i32, place: &str, what: &str, results: &[Field]) -> ! {
        self.fatal(place, what, results);
        if let Err(e) = self.shutdown() {
            internal::error("HADES", &e.to_string());
        }
        std::process::exit(code)
    }

    fn announce(&self) {
        let locale = self.formatter.locale();
        let place = locale.translate("hades.where");
        let what = locale.translate("hades.init");
        let done = locale.translate("hades.done");

        let result = match &self.settings.dir {
            Some(dir) if self.settings.announce_dir => {
                let dir = dir.display().to_string();
                format!("{done} {}", locale.translate_with("hades.path", &[("dir", &dir)]))
            }
            _ => done,
        };
        self.info(&place, &what, &[Field::from(result)]);
    }

    fn open_files(&self) -> Result<Vec<FileOutput>, crate::Error> {
        let (Some(dir), Some(log_path), Some(stack_path)) = (
            self.settings.dir.as_ref(),
            self.settings.log_path(),
            self.settings.stack_path(),
        ) else {
            return Ok(Vec::new());
        };

        fs::create_dir_all(dir)?;

        let listeners = Arc::clone(&self.listeners);
        let dispatch: PressureListener = Arc::new(move |signal: Backpressure| {
            for listener in read(&listeners).iter() {
                listener(signal);
            }
        });

        let open = |path: PathBuf, handler: Handler| {
            FileOutput::builder(path)
                .max_size(self.settings.max_file_size)
                .backups(self.settings.backups)
                .formatter(self.formatter.clone())
                .handler(handler)
                .on_backpressure(Arc::clone(&dispatch))
                .reopen_on_hangup(self.reopen_on_hangup)
                .build()
        };

        Ok(vec![
            open(log_path, line_handler())?,
            open(stack_path, stack_handler())?,
        ])
    }

    fn take_files(&self) -> Vec<FileOutput> {
        match std::mem::replace(&mut *write(&self.state), State::Uninitialized) {
            State::Initialized(files) => files,
            State::Uninitialized => Vec::new(),
            State::Reloading(backlog) => {
                lock(&backlog).report_dropped();
                Vec::new()
            }
        }
    }

    /// Swaps the files for an empty backlog. A reload already in progress keeps its backlog.
    fn begin_reload(&self) -> Vec<FileOutput> {
        let mut state = write(&self.state);
        match std::mem::replace(&mut *state, State::Reloading(Mutex::default())) {
            State::Initialized(files) => files,
            State::Uninitialized => Vec::new(),
            reloading @ State::Reloading(_) => {
                *state = reloading;
                Vec::new()
            }
        }
    }

    fn abandon_reload(&self) {
        let state = std::mem::replace(&mut *write(&self.state), State::Uninitialized);
        if let State::Reloading(backlog) = state {
            let backlog = into_inner(backlog);
            if !backlog.events.is_empty() {
                internal::warn(
                    "HADES",
                    &format!("{} records lost with the failed reload", backlog.events.len()),
                );
            }
            backlog.report_dropped();
        }
    }

    /// Flushes the outputs that live across `init`/`shutdown` cycles.
    fn flush_unregistered(&self) -> Result<(), crate::Error> {
        self.console.flush()?;
        for output in &self.extra {
            output.flush()?;
        }
        Ok(())
    }
}

fn close_all(files: Vec<FileOutput>) -> Result<(), crate::Error> {
    let mut failures = Vec::new();
    for file in files {
        if let Err(e) = file.shutdown() {
            failures.push(format!("{}: {e}", file.path().display()));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Shutdown(failures.join("; ")))
    }
}

fn into_inner<T>(mutex: Mutex<T>) -> T {
    mutex.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::task::{Context, Poll, Waker};
    use tempfile::TempDir;

    fn facade(dir: &Path) -> Hades {
        Hades::builder()
            .without_env()
            .name("app")
            .dir(dir)
            .highlight(false)
            .time_format("T")
            .announce_init(false)
            .reopen_on_hangup(false)
            .console_writers(Box::new(io::sink()), Box::new(io::sink()))
            .build()
            .unwrap()
    }

    #[test]
    fn records_logged_while_reloading_reach_the_new_files() {
        let tmp_dir = TempDir::new().unwrap();
        let hades = facade(tmp_dir.path());

        let files = hades.begin_reload();
        assert_eq!(files.len(), 2);
        assert!(hades.is_initialized());
        hades.info("a", "between", &[]);
        close_all(files).unwrap();

        hades.init().unwrap();
        hades.flush().unwrap();
        let log = fs::read_to_string(tmp_dir.path().join("app.log")).unwrap();
        assert_eq!(log, "[T][INFO] a >  between\n");
        hades.shutdown().unwrap();
    }

    #[test]
    fn backlog_is_bounded() {
        let mut backlog = Backlog::default();
        for i in 0..=RELOAD_BACKLOG {
            backlog.push(LogEvent::new(Level::Info, vec![Field::from(i.to_string())]));
        }
        assert_eq!(backlog.events.len(), RELOAD_BACKLOG);
        assert_eq!(backlog.dropped, 1);
    }

    #[test]
    fn failed_reload_leaves_facade_uninitialized() {
        let tmp_dir = TempDir::new().unwrap();
        let hades = facade(tmp_dir.path());

        drop(hades.begin_reload());
        hades.info("a", "lost", &[]);
        hades.abandon_reload();
        assert!(!hades.is_initialized());
    }

    #[test]
    fn reload_runs_outside_tokio() {
        let tmp_dir = TempDir::new().unwrap();
        let hades = facade(tmp_dir.path());

        let mut reload = std::pin::pin!(hades.reload());
        let mut cx = Context::from_waker(Waker::noop());
        let reloaded = loop {
            if let Poll::Ready(result) = reload.as_mut().poll(&mut cx) {
                break result.map(Hades::is_initialized);
            }
            thread::yield_now();
        };
        assert!(reloaded.unwrap());
        hades.shutdown().unwrap();
    }
}

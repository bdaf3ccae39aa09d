//! Stepwise construction of a [`Hades`]: collect options, resolve them once
//! against the environment, build the formatter and console, and optionally
//! initialize right away.

use super::{Hades, State};
use crate::config::{Generation, Options, Settings};
use crate::fmt::Formatter;
use crate::level::Level;
use crate::locale::Locale;
use crate::output::{ConsoleOutput, Output};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

type EnvSource = Box<dyn Fn(&str) -> Option<String>>;
type Sink = Box<dyn Write + Send>;

pub struct HadesBuilder {
    options: Options,
    env: Option<EnvSource>,
    console: Option<(Sink, Sink)>,
    extra: Vec<Box<dyn Output>>,
    reopen_on_hangup: bool,
}

impl Default for HadesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HadesBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            env: None,
            console: None,
            extra: Vec::new(),
            reopen_on_hangup: true,
        }
    }

    /// Fields set in `options` replace the ones set so far.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = self.options.merge(options);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.options.level = Some(level);
        self
    }

    /// Enables the `<name>.log` and `<name>.stack.log` files under `dir`.
    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.options.max_file_size = Some(crate::config::ByteSize(bytes));
        self
    }

    #[must_use]
    pub const fn backups(mut self, count: usize) -> Self {
        self.options.backups = Some(count);
        self
    }

    #[must_use]
    pub const fn highlight(mut self, enabled: bool) -> Self {
        self.options.highlight = Some(enabled);
        self
    }

    #[must_use]
    pub const fn announce_init(mut self, enabled: bool) -> Self {
        self.options.announce_init = Some(enabled);
        self
    }

    #[must_use]
    pub const fn announce_dir(mut self, enabled: bool) -> Self {
        self.options.announce_dir = Some(enabled);
        self
    }

    #[must_use]
    pub const fn init_immediately(mut self, enabled: bool) -> Self {
        self.options.init_immediately = Some(enabled);
        self
    }

    #[must_use]
    pub fn locale(mut self, code: impl Into<String>) -> Self {
        self.options.locale = Some(code.into());
        self
    }

    /// A chrono strftime pattern.
    #[must_use]
    pub fn time_format(mut self, pattern: impl Into<String>) -> Self {
        self.options.time_format = Some(pattern.into());
        self
    }

    #[must_use]
    pub const fn defaults(mut self, generation: Generation) -> Self {
        self.options.defaults = Some(generation);
        self
    }

    /// Reads variables from `env` instead of the process environment.
    #[must_use]
    pub fn env(mut self, env: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Ignores `HADES_*` variables entirely.
    #[must_use]
    pub fn without_env(self) -> Self {
        self.env(|_| None)
    }

    /// Console records go to `out` and stack blocks to `err` instead of stdout/stderr.
    #[must_use]
    pub fn console_writers(mut self, out: Sink, err: Sink) -> Self {
        self.console = Some((out, err));
        self
    }

    /// An additional output that receives every record next to the console.
    #[must_use]
    pub fn output(mut self, output: impl Output + 'static) -> Self {
        self.extra.push(Box::new(output));
        self
    }

    /// Reopen the log files on `SIGHUP`. On by default.
    #[must_use]
    pub const fn reopen_on_hangup(mut self, enabled: bool) -> Self {
        self.reopen_on_hangup = enabled;
        self
    }

    /// Resolves the settings and, unless `init_immediately` is off, initializes.
    ///
    /// # Errors
    /// The initial `init` failed.
    pub fn build(self) -> Result<Hades, crate::Error> {
        let settings = match &self.env {
            Some(env) => Settings::resolve(&self.options, env),
            None => Settings::from_env(&self.options),
        };

        let formatter = Formatter::new(Arc::new(Locale::load(&settings.locale)))
            .highlighted(settings.highlight)
            .time_format(&settings.time_format);

        let console = match self.console {
            Some((out, err)) => ConsoleOutput::with_writers(formatter.clone(), out, err),
            None => ConsoleOutput::new(formatter.clone()),
        };

        let hades = Hades {
            settings,
            formatter,
            console,
            extra: self.extra,
            listeners: Arc::new(RwLock::new(Vec::new())),
            reopen_on_hangup: self.reopen_on_hangup,
            state: RwLock::new(State::Uninitialized),
        };

        if hades.settings.init_immediately {
            hades.init()?;
        }
        Ok(hades)
    }
}

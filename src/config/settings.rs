//! Resolved, immutable settings: explicit option, then environment, then the
//! versioned defaults.

use super::Options;
use super::size::parse_size;
use crate::fmt::DEFAULT_TIME_FORMAT;
use crate::internal;
use crate::level::Level;
use crate::output::{DEFAULT_BACKUPS, DEFAULT_MAX_SIZE};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_NAME: &str = "HADES_NAME";
pub const ENV_LEVEL: &str = "HADES_LEVEL";
pub const ENV_DIR: &str = "HADES_DIR";
pub const ENV_SIZE: &str = "HADES_SIZE";
pub const ENV_BACKUPS: &str = "HADES_BACKUPS";
pub const ENV_LOCALE: &str = "HADES_LOCALE";
pub const ENV_TIME: &str = "HADES_TIME";
pub const ENV_FLAGS: &str = "HADES_FLAGS";

/// Which generation of built-in defaults applies when neither an option nor
/// the environment decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    #[default]
    Modern,
    /// Chinese labels, as the first releases shipped.
    Classic,
}

impl Generation {
    #[must_use]
    pub fn defaults(self) -> Defaults {
        match self {
            Self::Modern => Defaults::modern(),
            Self::Classic => Defaults::classic(),
        }
    }
}

/// Built-in values for everything an option or variable can leave unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub name: String,
    pub level: Level,
    pub max_file_size: u64,
    pub backups: usize,
    pub highlight: bool,
    pub announce_init: bool,
    pub announce_dir: bool,
    pub init_immediately: bool,
    pub locale: String,
    pub time_format: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self::modern()
    }
}

impl Defaults {
    #[must_use]
    pub fn modern() -> Self {
        Self {
            name: "default".to_string(),
            level: Level::All,
            max_file_size: DEFAULT_MAX_SIZE,
            backups: DEFAULT_BACKUPS,
            highlight: true,
            announce_init: true,
            announce_dir: true,
            init_immediately: true,
            locale: "en".to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    #[must_use]
    pub fn classic() -> Self {
        Self {
            locale: "zh".to_string(),
            ..Self::modern()
        }
    }
}

/// `HADES_FLAGS`: comma separated `Flag` or `!Flag` tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub highlight: Option<bool>,
    pub announce_init: Option<bool>,
    pub announce_dir: Option<bool>,
    pub init_immediately: Option<bool>,
}

impl Flags {
    /// Unknown tokens are reported and skipped. Later tokens win.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let mut flags = Self::default();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (value, name) = token
                .strip_prefix('!')
                .map_or((true, token), |rest| (false, rest.trim()));

            let slot = match name.to_lowercase().as_str() {
                "highlight" => &mut flags.highlight,
                "announceinit" => &mut flags.announce_init,
                "announcedir" => &mut flags.announce_dir,
                "initimmediate" | "initimmediately" => &mut flags.init_immediately,
                _ => {
                    internal::warn("CONFIG", &format!("unknown flag in {ENV_FLAGS}: {token}"));
                    continue;
                }
            };
            *slot = Some(value);
        }
        flags
    }
}

/// Everything a facade needs, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub name: String,
    pub level: Level,
    /// No directory means console only.
    pub dir: Option<PathBuf>,
    pub max_file_size: u64,
    pub backups: usize,
    pub highlight: bool,
    pub announce_init: bool,
    pub announce_dir: bool,
    pub init_immediately: bool,
    pub locale: String,
    pub time_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&Options::default(), |_| None)
    }
}

impl Settings {
    /// Resolves against the process environment.
    #[must_use]
    pub fn from_env(options: &Options) -> Self {
        Self::resolve(options, |key| std::env::var(key).ok())
    }

    /// Resolves with `env` standing in for the process environment.
    /// Unparseable variables are reported and ignored.
    #[must_use]
    pub fn resolve(options: &Options, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = options.defaults.unwrap_or_default().defaults();
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let flags = var(ENV_FLAGS).map(|f| Flags::parse(&f)).unwrap_or_default();

        let level = options.level.or_else(|| {
            var(ENV_LEVEL).and_then(|v| {
                v.parse()
                    .map_err(|e| internal::warn("CONFIG", &format!("{ENV_LEVEL}: {e}")))
                    .ok()
            })
        });

        let max_file_size = options.max_file_size.map(|s| s.0).or_else(|| {
            var(ENV_SIZE).and_then(|v| {
                let size = parse_size(&v);
                if size.is_none() {
                    internal::warn("CONFIG", &format!("{ENV_SIZE}: invalid size {v:?}"));
                }
                size
            })
        });

        let backups = options.backups.or_else(|| {
            var(ENV_BACKUPS).and_then(|v| {
                v.parse()
                    .map_err(|e| internal::warn("CONFIG", &format!("{ENV_BACKUPS}: {e}")))
                    .ok()
            })
        });

        let dir = options
            .dir
            .clone()
            .or_else(|| var(ENV_DIR).map(PathBuf::from))
            .filter(|d| !d.as_os_str().is_empty())
            .map(|d| expand(&d));

        Self {
            name: options
                .name
                .clone()
                .or_else(|| var(ENV_NAME))
                .unwrap_or(defaults.name),
            level: level.unwrap_or(defaults.level),
            dir,
            max_file_size: max_file_size.unwrap_or(defaults.max_file_size),
            backups: backups.unwrap_or(defaults.backups).max(1),
            highlight: options
                .highlight
                .or(flags.highlight)
                .unwrap_or(defaults.highlight),
            announce_init: options
                .announce_init
                .or(flags.announce_init)
                .unwrap_or(defaults.announce_init),
            announce_dir: options
                .announce_dir
                .or(flags.announce_dir)
                .unwrap_or(defaults.announce_dir),
            init_immediately: options
                .init_immediately
                .or(flags.init_immediately)
                .unwrap_or(defaults.init_immediately),
            locale: options
                .locale
                .clone()
                .or_else(|| var(ENV_LOCALE))
                .unwrap_or(defaults.locale),
            time_format: options
                .time_format
                .clone()
                .or_else(|| var(ENV_TIME))
                .unwrap_or(defaults.time_format),
        }
    }

    /// `<dir>/<name>.log`.
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.log", self.name)))
    }

    /// `<dir>/<name>.stack.log`.
    #[must_use]
    pub fn stack_path(&self) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.stack.log", self.name)))
    }
}

/// Expands a leading `~`.
fn expand(path: &std::path::Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_options_or_env() {
        let settings = Settings::resolve(&Options::default(), env(&[]));
        assert_eq!(settings.name, "default");
        assert_eq!(settings.level, Level::All);
        assert_eq!(settings.dir, None);
        assert_eq!(settings.max_file_size, 20 * 1024 * 1024);
        assert_eq!(settings.backups, 5);
        assert!(settings.highlight);
        assert_eq!(settings.locale, "en");
    }

    #[test]
    fn option_beats_env_beats_default() {
        let options = Options {
            name: Some("opt".to_string()),
            ..Options::default()
        };
        let settings = Settings::resolve(
            &options,
            env(&[(ENV_NAME, "env"), (ENV_LEVEL, "warn"), (ENV_SIZE, "1K")]),
        );
        assert_eq!(settings.name, "opt");
        assert_eq!(settings.level, Level::Warn);
        assert_eq!(settings.max_file_size, 1024);
    }

    #[test]
    fn bad_env_values_fall_back() {
        let settings = Settings::resolve(
            &Options::default(),
            env(&[(ENV_LEVEL, "loud"), (ENV_BACKUPS, "many")]),
        );
        assert_eq!(settings.level, Level::All);
        assert_eq!(settings.backups, 5);
    }

    #[test]
    fn zero_backups_become_one() {
        let settings = Settings::resolve(&Options::default(), env(&[(ENV_BACKUPS, "0")]));
        assert_eq!(settings.backups, 1);
    }

    #[test]
    fn flags_toggle_booleans() {
        let settings = Settings::resolve(
            &Options::default(),
            env(&[(ENV_FLAGS, "!highlight, !AnnounceInit,bogus")]),
        );
        assert!(!settings.highlight);
        assert!(!settings.announce_init);
        assert!(settings.announce_dir);
    }

    #[test]
    fn flags_parse_later_token_wins() {
        let flags = Flags::parse("Highlight,!Highlight,InitImmediate");
        assert_eq!(flags.highlight, Some(false));
        assert_eq!(flags.init_immediately, Some(true));
        assert_eq!(flags.announce_dir, None);
    }

    #[test]
    fn classic_generation_speaks_chinese() {
        let options = Options {
            defaults: Some(Generation::Classic),
            ..Options::default()
        };
        let settings = Settings::resolve(&options, env(&[]));
        assert_eq!(settings.locale, "zh");
    }

    #[test]
    fn file_paths_follow_name() {
        let settings = Settings::resolve(
            &Options::default(),
            env(&[(ENV_DIR, "/var/log/app"), (ENV_NAME, "svc")]),
        );
        assert_eq!(settings.log_path(), Some(PathBuf::from("/var/log/app/svc.log")));
        assert_eq!(
            settings.stack_path(),
            Some(PathBuf::from("/var/log/app/svc.stack.log"))
        );
    }
}

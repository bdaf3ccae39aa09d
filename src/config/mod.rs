//! Construction options, the optional `hades.toml` options file, and their
//! resolution against the environment.

mod settings;
mod size;

pub use settings::{
    Defaults, ENV_BACKUPS, ENV_DIR, ENV_FLAGS, ENV_LEVEL, ENV_LOCALE, ENV_NAME, ENV_SIZE,
    ENV_TIME, Flags, Generation, Settings,
};
pub use size::{ByteSize, parse_size};

use crate::internal;
use crate::level::Level;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Explicit construction options. Every field left `None` falls through to the
/// environment and then to the defaults of the chosen [`Generation`].
///
/// An empty options file is valid and changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub name: Option<String>,
    pub level: Option<Level>,
    pub dir: Option<PathBuf>,
    pub max_file_size: Option<ByteSize>,
    pub backups: Option<usize>,
    pub highlight: Option<bool>,
    pub announce_init: Option<bool>,
    pub announce_dir: Option<bool>,
    pub init_immediately: Option<bool>,
    pub locale: Option<String>,
    pub time_format: Option<String>,
    pub defaults: Option<Generation>,
}

impl Options {
    /// Reads the options file at the default location. A missing file yields
    /// empty options.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined, the file can't be
    /// read, or it isn't valid TOML.
    pub fn load() -> Result<Self, crate::Error> {
        let path = Self::default_path()?;
        if !path.exists() {
            internal::debug("CONFIG", "No options file, using defaults");
            return Ok(Self::default());
        }
        let options = Self::load_from(&path)?;
        internal::debug("CONFIG", &format!("Options loaded from {}", path.display()));
        Ok(options)
    }

    /// Reads options from an explicit path. A leading `~` is expanded.
    ///
    /// # Errors
    /// The file can't be read or isn't valid TOML.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        let raw = path.to_string_lossy();
        let expanded = shellexpand::tilde(&raw);
        let content = fs::read_to_string(expanded.as_ref())?;
        Self::parse(&content)
    }

    /// # Errors
    /// `content` isn't valid TOML for these options.
    pub fn parse(content: &str) -> Result<Self, crate::Error> {
        Ok(toml::from_str(content)?)
    }

    /// `~/.config/hades/hades.toml` on Linux, the platform equivalent elsewhere.
    ///
    /// # Errors
    /// The platform has no config directory.
    pub fn default_path() -> Result<PathBuf, crate::Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("hades").join("hades.toml"))
            .ok_or(crate::Error::ConfigDirNotFound)
    }

    /// Fields set in `other` replace the ones in `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            name: other.name.or(self.name),
            level: other.level.or(self.level),
            dir: other.dir.or(self.dir),
            max_file_size: other.max_file_size.or(self.max_file_size),
            backups: other.backups.or(self.backups),
            highlight: other.highlight.or(self.highlight),
            announce_init: other.announce_init.or(self.announce_init),
            announce_dir: other.announce_dir.or(self.announce_dir),
            init_immediately: other.init_immediately.or(self.init_immediately),
            locale: other.locale.or(self.locale),
            time_format: other.time_format.or(self.time_format),
            defaults: other.defaults.or(self.defaults),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Options::parse("").unwrap(), Options::default());
    }

    #[test]
    fn parses_every_field() {
        let options = Options::parse(
            r#"
            name = "svc"
            level = "warning"
            dir = "/tmp/logs"
            max_file_size = "1M"
            backups = 2
            highlight = false
            announce_init = false
            announce_dir = false
            init_immediately = false
            locale = "zh"
            time_format = "%H:%M"
            defaults = "classic"
            "#,
        )
        .unwrap();

        assert_eq!(options.name.as_deref(), Some("svc"));
        assert_eq!(options.level, Some(Level::Warn));
        assert_eq!(options.max_file_size, Some(ByteSize(1024 * 1024)));
        assert_eq!(options.backups, Some(2));
        assert_eq!(options.highlight, Some(false));
        assert_eq!(options.defaults, Some(Generation::Classic));
    }

    #[test]
    fn integer_size_is_bytes() {
        let options = Options::parse("max_file_size = 4096").unwrap();
        assert_eq!(options.max_file_size, Some(ByteSize(4096)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Options::parse("colour = true"),
            Err(crate::Error::ConfigParse(_))
        ));
    }

    #[test]
    fn merge_prefers_other() {
        let base = Options {
            name: Some("a".to_string()),
            backups: Some(3),
            ..Options::default()
        };
        let over = Options {
            name: Some("b".to_string()),
            ..Options::default()
        };
        let merged = base.merge(over);
        assert_eq!(merged.name.as_deref(), Some("b"));
        assert_eq!(merged.backups, Some(3));
    }
}

//! 24-bit level colors and the ANSI plumbing around them.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Any SGR sequence.
static SGR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("Invalid SGR regex"));

/// A 24-bit foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn fg_ansi(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }

    /// Resets the foreground only, so bold/underline around the colored text survive.
    pub const FG_RESET: &'static str = "\x1b[39m";

    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    #[must_use]
    pub const fn green() -> Self {
        Self::new(80, 250, 123)
    }

    #[must_use]
    pub const fn yellow() -> Self {
        Self::new(241, 250, 140)
    }

    #[must_use]
    pub const fn cyan() -> Self {
        Self::new(139, 233, 253)
    }

    #[must_use]
    pub const fn red() -> Self {
        Self::new(255, 85, 85)
    }

    #[must_use]
    pub const fn magenta() -> Self {
        Self::new(255, 121, 198)
    }

    #[must_use]
    pub const fn blue() -> Self {
        Self::new(98, 114, 228)
    }

    #[must_use]
    pub const fn grey() -> Self {
        Self::new(128, 128, 128)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Wraps `text` in `color`. Foreground resets already inside `text` (from a nested
/// value emphasis) re-open `color`, so the rest of the line keeps the level color.
#[must_use]
pub fn colorize(text: &str, color: Color) -> String {
    let fg = color.fg_ansi();
    let reset = Color::FG_RESET;
    let reopened = text.replace(reset, &format!("{reset}{fg}"));
    format!("{fg}{reopened}{reset}")
}

/// Removes every SGR escape, leaving the visible text.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    SGR_REGEX.replace_all(text, "").into_owned()
}

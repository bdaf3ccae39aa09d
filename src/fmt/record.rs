//! Turns an event into `[time][level] where >  what  results`, plus a stack
//! block whenever one of the results is error-like.

use super::cause::{Link, unwind};
use super::{colorize, highlight};
use crate::event::{ErrorInfo, Field, LogEvent};
use crate::internal;
use crate::level::Level;
use crate::locale::{Locale, SharedLocale};
use chrono::format::{Item, StrftimeItems};
use std::sync::Arc;

/// `YY-MM-DD HH:mm:ss:SSS`.
pub const DEFAULT_TIME_FORMAT: &str = "%y-%m-%d %H:%M:%S:%3f";

const STACK_HEADER: &str = "-------------- Stack --------------";
const STACK_DIVIDER: &str = "\n--------------\n";
const STACK_FOOTER: &str = "===================================\n";

/// The rendered text of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedRecord {
    pub line: String,
    /// Present iff the event carried at least one error-like value.
    pub stack_block: Option<String>,
}

/// Rendering settings shared by every output of one facade.
#[derive(Debug, Clone)]
pub struct Formatter {
    highlighted: bool,
    locale: SharedLocale,
    time_format: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(Arc::new(Locale::english()))
    }
}

impl Formatter {
    /// Highlighting on, default time format.
    #[must_use]
    pub fn new(locale: SharedLocale) -> Self {
        Self {
            highlighted: true,
            locale,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    #[must_use]
    pub const fn highlighted(mut self, enabled: bool) -> Self {
        self.highlighted = enabled;
        self
    }

    /// A strftime pattern. Invalid patterns are rejected in favor of the default,
    /// since chrono would otherwise panic while rendering.
    #[must_use]
    pub fn time_format(mut self, pattern: &str) -> Self {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            internal::warn(
                "FORMAT",
                &format!("invalid time format {pattern:?}, keeping {DEFAULT_TIME_FORMAT:?}"),
            );
        } else {
            self.time_format = pattern.to_string();
        }
        self
    }

    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    #[must_use]
    pub fn format(&self, event: &LogEvent) -> FormattedRecord {
        compose(event, self.highlighted, &self.locale, &self.time_format)
    }
}

/// Formats with the default time pattern.
#[must_use]
pub fn format_event(event: &LogEvent, highlighted: bool, locale: &Locale) -> FormattedRecord {
    compose(event, highlighted, locale, DEFAULT_TIME_FORMAT)
}

fn compose(
    event: &LogEvent,
    highlighted: bool,
    locale: &Locale,
    time_format: &str,
) -> FormattedRecord {
    if event.fields.is_empty() {
        return FormattedRecord::default();
    }

    let label = locale.translate(&format!("level.{}", event.level.key()));
    let time = event.timestamp.format(time_format);

    let mut texts = Vec::new();
    let mut errors: Vec<&ErrorInfo> = Vec::new();
    for field in event.results() {
        if matches!(field, Field::Missing) {
            continue;
        }

        if let Some(info) = field.as_error() {
            for (i, link) in unwind(info).into_iter().enumerate() {
                if i == 0 {
                    texts.push(link.text().to_string());
                } else {
                    texts.push(format!("--> {}", link.text()));
                }
                if let Link::Error(e) = link {
                    errors.push(e);
                }
            }
        } else if let Some(message) = field.message() {
            texts.push(message.to_string());
        } else {
            texts.push(field.text());
        }
    }

    let mut place = event.place().map(Field::text).unwrap_or_default();
    let mut action = event.action().map(Field::text).unwrap_or_default();
    let mut results = texts.join("\n\t");

    if highlighted {
        place = highlight(&place);
        action = highlight(&action);
        results = highlight(&results);
    }

    let mut line = format!("[{time}][{label}] {place}");
    if !action.is_empty() {
        line.push_str(" >  ");
        line.push_str(&action);
    }
    if !results.is_empty() {
        line.push_str("  ");
        line.push_str(&results);
    }
    if highlighted {
        line = colorize(&line, event.level.color());
    }

    let stack_block = if errors.is_empty() {
        None
    } else {
        Some(stack_block(&line, &errors, highlighted, event.level))
    };

    FormattedRecord { line, stack_block }
}

fn stack_block(line: &str, errors: &[&ErrorInfo], highlighted: bool, level: Level) -> String {
    let sections: Vec<String> = errors
        .iter()
        .map(|error| {
            let mut section = if highlighted {
                colorize(&highlight(&error.message), level.color())
            } else {
                error.message.clone()
            };
            if let Some(stack) = error.stack.as_deref().filter(|s| !s.is_empty()) {
                section.push('\n');
                section.push_str(&stack.replace("    ", "\t"));
            }
            if let Some(data) = error.data_text() {
                section.push_str("\n[Data] ");
                section.push_str(&data);
            }
            section
        })
        .collect();

    [
        line.to_string(),
        STACK_HEADER.to_string(),
        sections.join(STACK_DIVIDER),
        STACK_FOOTER.to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_time_format_keeps_default() {
        let formatter = Formatter::default().time_format("%Q%");
        assert_eq!(formatter.time_format, DEFAULT_TIME_FORMAT);
    }

    #[test]
    fn custom_time_format_is_used() {
        let formatter = Formatter::default().highlighted(false).time_format("%H");
        let event = LogEvent::new(Level::Info, vec!["a".into()]);
        let expected = format!("[{}][INFO] a", event.timestamp.format("%H"));
        assert_eq!(formatter.format(&event).line, expected);
    }
}

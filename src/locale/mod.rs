//! Level labels and fixed phrases per language.
//!
//! Catalogs are flat `key -> template` maps loaded from TOML, with nested tables
//! joined by dots (`[level] INFO = ...` becomes `level.INFO`). Every catalog is
//! layered over English so a missing key still renders something readable.

use crate::internal;
use std::collections::HashMap;
use std::sync::Arc;

const EN: &str = include_str!("en.toml");
const ZH: &str = include_str!("zh.toml");

/// Codes with a built-in catalog.
pub const SUPPORTED: &[&str] = &["en", "zh"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    code: String,
    entries: HashMap<String, String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl Locale {
    /// The English catalog, which every other catalog falls back on.
    #[must_use]
    pub fn english() -> Self {
        let entries = parse_catalog(EN).unwrap_or_default();
        Self {
            code: "en".to_string(),
            entries,
        }
    }

    /// Built-in catalog for `code` (`zh`, `zh-CN`, `en_US.UTF-8`, ...).
    ///
    /// Unknown codes fall back to English.
    #[must_use]
    pub fn load(code: &str) -> Self {
        let lang = code
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match lang.as_str() {
            "en" => Self::english(),
            "zh" => Self::english().layer("zh", ZH).unwrap_or_else(|e| {
                internal::warn("LOCALE", &format!("built-in catalog zh is broken: {e}"));
                Self::english()
            }),
            _ => {
                internal::debug(
                    "LOCALE",
                    &format!("no catalog for {code} (built-in: {}), using en", SUPPORTED.join(", ")),
                );
                Self::english()
            }
        }
    }

    /// A custom catalog layered over English.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` when `toml` is not valid TOML.
    pub fn from_toml(code: &str, toml: &str) -> Result<Self, crate::Error> {
        Self::english().layer(code, toml)
    }

    fn layer(mut self, code: &str, toml: &str) -> Result<Self, crate::Error> {
        self.entries.extend(parse_catalog(toml)?);
        self.code = code.to_string();
        Ok(self)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The template for `key`, or the key itself when nothing matches.
    #[must_use]
    pub fn translate(&self, key: &str) -> String {
        self.translate_with(key, &[])
    }

    /// Renders the template for `key`, filling `{{name}}` placeholders from `args`.
    ///
    /// `{{name, value}}` and `{{name, term}}` wrap the argument in `~{...}` and
    /// `~[...]` markup. Unknown names render empty.
    #[must_use]
    pub fn translate_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.entries
            .get(key)
            .map_or_else(|| key.to_string(), |template| render(template, args))
    }
}

/// Shared handle used by formatters and outputs.
pub type SharedLocale = Arc<Locale>;

fn parse_catalog(toml: &str) -> Result<HashMap<String, String>, crate::Error> {
    let table: toml::Table = toml::from_str(toml)?;
    let mut entries = HashMap::new();
    flatten("", &table, &mut entries);
    Ok(entries)
}

fn flatten(prefix: &str, table: &toml::Table, entries: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten(&full, inner, entries),
            toml::Value::String(s) => {
                entries.insert(full, s.clone());
            }
            other => {
                entries.insert(full, other.to_string());
            }
        }
    }
}

fn render(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let mut parts = after[..end].splitn(2, ',').map(str::trim);
        let name = parts.next().unwrap_or_default();
        let value = args
            .iter()
            .find(|(n, _)| *n == name)
            .map_or("", |(_, v)| *v);

        match parts.next() {
            Some("value") => {
                out.push_str("~{");
                out.push_str(value);
                out.push('}');
            }
            Some("term") => {
                out.push_str("~[");
                out.push_str(value);
                out.push(']');
            }
            _ => out.push_str(value),
        }

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_has_every_level_label() {
        let locale = Locale::english();
        for level in crate::level::Level::records() {
            let key = format!("level.{}", level.key());
            assert_ne!(locale.translate(&key), key);
        }
    }

    #[test]
    fn chinese_overrides_level_labels() {
        let locale = Locale::load("zh-CN");
        assert_eq!(locale.code(), "zh");
        assert_eq!(locale.translate("level.ERROR"), "错误");
    }

    #[test]
    fn every_supported_code_loads_itself() {
        for code in SUPPORTED {
            assert_eq!(Locale::load(code).code(), *code);
        }
    }

    #[test]
    fn unknown_code_falls_back_to_english() {
        assert_eq!(Locale::load("xx").code(), "en");
    }

    #[test]
    fn placeholders_and_markup_formatters() {
        assert_eq!(render("a {{x}} b", &[("x", "1")]), "a 1 b");
        assert_eq!(render("{{x, value}}", &[("x", "/tmp")]), "~{/tmp}");
        assert_eq!(render("{{x, term}}", &[("x", "t")]), "~[t]");
        assert_eq!(render("{{missing}}!", &[]), "!");
        assert_eq!(render("open {{x", &[("x", "1")]), "open {{x");
    }

    #[test]
    fn custom_catalog_keeps_english_fallback() {
        let locale = Locale::from_toml("pirate", "[level]\nINFO = \"AHOY\"\n").unwrap();
        assert_eq!(locale.translate("level.INFO"), "AHOY");
        assert_eq!(locale.translate("level.WARN"), "WARN");
        assert_eq!(locale.translate("no.such.key"), "no.such.key");
    }
}

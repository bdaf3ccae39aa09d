//! `~[term]` and `~{value}` markup lets messages and locale templates flag the
//! words worth looking at without embedding ANSI codes directly.
//!
//! A backslash before `~`, `[`, `]`, `{` or `}` keeps the character literal.

use super::Color;

const TERM_OPEN: &str = "\x1b[4m\x1b[1m";
const TERM_CLOSE: &str = "\x1b[22m\x1b[24m";

/// Renders both markup spans and then unescapes the delimiters.
///
/// Terms are replaced before values, so a value span inside a term is rendered
/// on the second pass. Nested spans of the same kind are not supported.
#[must_use]
pub fn highlight(text: &str) -> String {
    let terms = replace_spans(text, '[', ']', |capture| {
        format!("{TERM_OPEN}{capture}{TERM_CLOSE}")
    });
    let values = replace_spans(&terms, '{', '}', |capture| {
        format!("{}[{capture}]{}", Color::white().fg_ansi(), Color::FG_RESET)
    });
    unescape(&values)
}

/// Replaces every `~<open>capture<close>` whose `~` and closing delimiter are not escaped.
///
/// The capture is the shortest run up to the first unescaped `close` and never
/// crosses a newline; an unterminated span is left as-is.
fn replace_spans(text: &str, open: char, close: char, render: impl Fn(&str) -> String) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let escaped = i > 0 && chars[i - 1] == '\\';
        if chars[i] == '~'
            && !escaped
            && chars.get(i + 1) == Some(&open)
            && let Some(end) = find_close(&chars, i + 2, close)
        {
            let capture: String = chars[i + 2..end].iter().collect();
            out.push_str(&render(&capture));
            i = end + 1;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn find_close(chars: &[char], start: usize, close: char) -> Option<usize> {
    let mut j = start;
    while j < chars.len() {
        match chars[j] {
            '\n' => return None,
            c if c == close && chars[j - 1] != '\\' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '~' | '[' | ']' | '{' | '}') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

//! Flattens an error and everything it was caused by into render order.

use crate::event::{Cause, ErrorInfo, MAX_CAUSE_DEPTH};

/// One entry of an unwound chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Link<'a> {
    /// An error-like value; it gets a section in the stack block.
    Error(&'a ErrorInfo),
    /// The non-error value that ended the chain.
    Terminal(&'a str),
}

impl<'a> Link<'a> {
    /// The text shown in the record line for this link.
    #[must_use]
    pub fn text(self) -> &'a str {
        match self {
            Self::Error(info) => info.message.as_str(),
            Self::Terminal(value) => value,
        }
    }
}

/// `[root, cause(root), cause(cause(root)), ...]`.
///
/// Stops at the first cause that is not error-like: a non-empty one is kept as a
/// `Terminal` link, an empty one is dropped. At most `MAX_CAUSE_DEPTH` causes
/// follow the root.
#[must_use]
pub fn unwind(root: &ErrorInfo) -> Vec<Link<'_>> {
    let mut links = vec![Link::Error(root)];
    let mut next = root.cause.as_ref();

    while let Some(cause) = next {
        if links.len() > MAX_CAUSE_DEPTH {
            break;
        }
        match cause {
            Cause::Error(info) if info.is_error_like() => {
                links.push(Link::Error(info));
                next = info.cause.as_ref();
            }
            Cause::Error(info) => {
                if !info.message.is_empty() {
                    links.push(Link::Terminal(&info.message));
                }
                break;
            }
            Cause::Value(value) => {
                if !value.is_empty() {
                    links.push(Link::Terminal(value));
                }
                break;
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::error_cause;

    #[test]
    fn chain_ends_with_plain_value() {
        let err = error_cause("a", error_cause("b", "c"));
        let texts: Vec<&str> = unwind(&err).into_iter().map(Link::text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(matches!(unwind(&err)[2], Link::Terminal("c")));
    }

    #[test]
    fn text_outlives_the_links() {
        let err = error_cause("a", "b");
        let last = {
            let links = unwind(&err);
            links[1].text()
        };
        assert_eq!(last, "b");
    }

    #[test]
    fn empty_terminal_is_dropped() {
        let err = error_cause("a", "");
        assert_eq!(unwind(&err).len(), 1);
    }

    #[test]
    fn deep_chain_is_cut_off() {
        let mut err = ErrorInfo::new("0");
        for i in 1..100 {
            err = error_cause(i.to_string(), err);
        }
        assert_eq!(unwind(&err).len(), MAX_CAUSE_DEPTH + 1);
    }
}

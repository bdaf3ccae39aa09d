//! Error-like values: anything with a message that either carries a stack or is a
//! real error. Captured by value.

use std::backtrace::Backtrace;
use std::collections::HashSet;

/// Longest cause chain that is rendered; anything deeper is cut off.
pub const MAX_CAUSE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub message: String,
    pub stack: Option<String>,
    /// Attached context, printed as `[Data] ...` in the stack block.
    pub data: Option<serde_json::Value>,
    pub cause: Option<Cause>,
    /// Set for real errors; a bare message object without a stack is not error-like.
    pub exception: bool,
}

/// What an error was caused by.
#[derive(Debug, Clone, PartialEq)]
pub enum Cause {
    Error(Box<ErrorInfo>),
    /// A plain value ends the chain; it is rendered as `--> value`.
    Value(String),
}

impl ErrorInfo {
    /// An exception with `message` and no stack.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            data: None,
            cause: None,
            exception: true,
        }
    }

    /// A plain object that only has a message. Not error-like unless given a stack.
    #[must_use]
    pub fn bare(message: impl Into<String>) -> Self {
        Self {
            exception: false,
            ..Self::new(message)
        }
    }

    /// An exception whose stack is the backtrace of the calling thread.
    #[must_use]
    pub fn capture(message: impl Into<String>) -> Self {
        let stack = Backtrace::force_capture().to_string();
        Self::new(message).with_stack(stack)
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<serde_json::Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Has a non-empty message, and either a stack or is an exception.
    #[must_use]
    pub fn is_error_like(&self) -> bool {
        !self.message.is_empty() && (self.stack.is_some() || self.exception)
    }

    /// Attached data as text; strings are printed without quotes.
    #[must_use]
    pub fn data_text(&self) -> Option<String> {
        match self.data.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            value => Some(value.to_string()),
        }
    }

    /// Captures a standard error and its `source()` chain.
    ///
    /// The chain stops at `MAX_CAUSE_DEPTH` or at the first source already seen.
    #[must_use]
    pub fn from_error<E: std::error::Error + ?Sized>(e: &E) -> Self {
        let mut chain = Vec::new();
        let mut seen: HashSet<*const ()> = HashSet::new();
        let mut next = e.source();

        while let Some(source) = next {
            let addr = std::ptr::from_ref(source).cast::<()>();
            if chain.len() >= MAX_CAUSE_DEPTH || !seen.insert(addr) {
                break;
            }
            chain.push(Self::new(source.to_string()));
            next = source.source();
        }

        let cause = chain.into_iter().rev().fold(None, |cause, mut info| {
            info.cause = cause;
            Some(Cause::Error(Box::new(info)))
        });

        Self {
            cause,
            ..Self::new(e.to_string())
        }
    }
}

impl From<&str> for ErrorInfo {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ErrorInfo {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<ErrorInfo> for Cause {
    fn from(info: ErrorInfo) -> Self {
        Self::Error(Box::new(info))
    }
}

impl From<&str> for Cause {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Cause {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

/// An error with `cause` attached.
#[must_use]
pub fn error_cause(message: impl Into<ErrorInfo>, cause: impl Into<Cause>) -> ErrorInfo {
    message.into().with_cause(cause)
}

/// An error with `data` attached for the stack block.
#[must_use]
pub fn error_data(message: impl Into<ErrorInfo>, data: impl Into<serde_json::Value>) -> ErrorInfo {
    message.into().with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layered {
        msg: &'static str,
        inner: Option<Box<Layered>>,
    }

    impl fmt::Display for Layered {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.msg)
        }
    }

    impl std::error::Error for Layered {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.inner.as_deref().map(|e| e as _)
        }
    }

    /// Reports itself as its own source.
    #[derive(Debug)]
    struct Loop;

    impl fmt::Display for Loop {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("loop")
        }
    }

    impl std::error::Error for Loop {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&Loop)
        }
    }

    #[test]
    fn from_error_follows_sources() {
        let err = Layered {
            msg: "outer",
            inner: Some(Box::new(Layered {
                msg: "inner",
                inner: None,
            })),
        };
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.message, "outer");
        let Some(Cause::Error(inner)) = info.cause else {
            panic!("expected an error cause");
        };
        assert_eq!(inner.message, "inner");
        assert!(inner.cause.is_none());
    }

    #[test]
    fn from_error_stops_on_repeated_source() {
        let info = ErrorInfo::from_error(&Loop);
        let Some(Cause::Error(first)) = info.cause else {
            panic!("expected an error cause");
        };
        assert!(first.cause.is_none());
    }

    #[test]
    fn capture_records_a_stack() {
        let info = ErrorInfo::capture("boom");
        assert!(info.is_error_like());
        assert!(info.stack.is_some_and(|stack| !stack.is_empty()));
    }

    #[test]
    fn bare_message_is_not_error_like() {
        assert!(!ErrorInfo::bare("m").is_error_like());
        assert!(ErrorInfo::bare("m").with_stack("s").is_error_like());
        assert!(ErrorInfo::new("m").is_error_like());
        assert!(!ErrorInfo::new("").is_error_like());
    }

    #[test]
    fn data_text_unquotes_strings() {
        assert_eq!(error_data("m", "ctx").data_text().as_deref(), Some("ctx"));
        assert_eq!(
            error_data("m", serde_json::json!({"id": 1})).data_text().as_deref(),
            Some(r#"{"id":1}"#)
        );
    }
}

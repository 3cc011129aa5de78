//! Error types for future completion and combinators.
//!
//! Every failure recorded in a future's result slot is an [`Error`]. Errors
//! are cheap to clone so that every reader of a failed future, and every
//! future derived from it, observes the same failure.
//!
//! # Error Kinds
//!
//! - **Timeout**: a blocking wait exceeded the future's deadline
//! - **Transformation**: a user-supplied function panicked
//! - **NoMatch**: a `filter` predicate rejected the value
//! - **UnsupportedOperation**: `reduce` over empty input
//! - **Panicked**: a producer body or a listener panicked
//! - **User**: a producer returned an error
//!
//! Failures forwarded from an upstream future keep their original kind.
//! Only [`ErrorKind::Timeout`] is raised to a blocking caller without being
//! recorded in the future itself.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Blocking wait exceeded the deadline.
    Timeout,
    /// A user-supplied transformation panicked.
    Transformation,
    /// A filter predicate did not match the value.
    NoMatch,
    /// Operation not supported for the given input.
    UnsupportedOperation,
    /// A producer body or a completion listener panicked.
    Panicked,
    /// Error raised by a producer.
    User,
}

/// The main error type for future operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true if this error is a deadline expiry.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Returns true if a user-supplied function failed.
    #[must_use]
    pub const fn is_transformation(&self) -> bool {
        matches!(self.kind, ErrorKind::Transformation)
    }

    /// Creates a timeout error for a wait that lasted `waited`.
    #[must_use]
    pub fn timeout(waited: std::time::Duration) -> Self {
        Self::new(ErrorKind::Timeout)
            .with_message(format!("future timed out after {}ms", waited.as_millis()))
    }

    /// Creates a user error wrapping a producer's error.
    #[must_use]
    pub fn user(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        let message = source.to_string();
        Self::new(ErrorKind::User)
            .with_message(message)
            .with_source(source)
    }

    /// Creates a user error from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::User).with_message(message)
    }

    /// Creates a no-match error for a value rejected by a predicate.
    #[must_use]
    pub fn no_match() -> Self {
        Self::new(ErrorKind::NoMatch).with_message("predicate rejected the value")
    }

    /// Creates an unsupported-operation error.
    #[must_use]
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedOperation).with_message(detail)
    }

    /// Converts a caught panic payload into an error of the given kind.
    #[must_use]
    pub fn from_panic(kind: ErrorKind, payload: &(dyn Any + Send)) -> Self {
        Self::new(kind).with_message(panic_message(payload))
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

/// Extension trait for adding context to Results.
#[allow(clippy::result_large_err)]
pub trait ResultExt<T> {
    /// Attach a context message on error.
    fn context(self, msg: impl Into<String>) -> Result<T>;
    /// Attach context message computed lazily on error.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for core::result::Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_message(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().with_message(f()))
    }
}

/// A specialized Result type for future operations.
#[allow(clippy::result_large_err)]
pub type Result<T> = core::result::Result<T, Error>;

/// The content of a completed future's result slot.
pub type Outcome<T> = Result<T>;

//! Failure reporting for transformations, aggregations and producers.
//!
//! A [`FailureSink`] receives every error raised inside user-supplied code
//! (map/flat_map/filter/fold/reduce functions, producer bodies, listeners).
//! Reporting is purely diagnostic: the error recorded as the future's outcome
//! is already fixed when the sink is called, and nothing the sink does can
//! change it.
//!
//! Every future carries a sink; futures derived from it inherit the same sink.
//! The default is [`TracingSink`], which emits a `tracing` error event.

use crate::error::Error;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// Receives `(error, source)` pairs for diagnostics.
pub trait FailureSink: Send + Sync + 'static {
    /// Called once per failure raised inside user-supplied code.
    ///
    /// `source` names the operation that observed the failure, e.g. `"map"`.
    fn report(&self, error: &Error, source: &str);
}

/// Sink that emits a structured `tracing` error event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn report(&self, error: &Error, source: &str) {
        tracing::error!(
            source = %source,
            kind = ?error.kind(),
            message = error.message().unwrap_or(""),
            "future failure"
        );
    }
}

/// Sink that discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl FailureSink for NoOpSink {
    fn report(&self, _error: &Error, _source: &str) {}
}

/// Sink that records every report, for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<(Error, String)>>,
}

impl CollectingSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded reports.
    #[must_use]
    pub fn reports(&self) -> Vec<(Error, String)> {
        self.reports.lock().clone()
    }

    /// Returns the number of recorded reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl FailureSink for CollectingSink {
    fn report(&self, error: &Error, source: &str) {
        self.reports.lock().push((error.clone(), source.to_string()));
    }
}

/// Returns the process-wide default sink.
pub fn default_sink() -> Arc<dyn FailureSink> {
    static DEFAULT: OnceLock<Arc<dyn FailureSink>> = OnceLock::new();
    Arc::clone(DEFAULT.get_or_init(|| Arc::new(TracingSink)))
}

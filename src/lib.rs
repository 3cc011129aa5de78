//! Promissory: thread-safe completable futures and their combinators.
//!
//! # Overview
//!
//! A producer eventually supplies a value or a failure; any number of other
//! threads register callbacks, block until the result is ready, transform
//! it, or combine many outstanding results into one. There is no central
//! scheduler: combinators wire `on_complete` callbacks between futures and
//! completion propagates through that callback graph.
//!
//! # Core Guarantees
//!
//! - **One-shot completion**: the first `complete` wins; later calls are no-ops
//! - **Exactly-once listeners**: every callback runs once with the final state,
//!   whether registered before or after completion
//! - **Fixed deadlines**: a future's deadline is set at construction and blocking
//!   waits never outlive it
//! - **No cross-future locks**: each future guards only its own slot and listeners
//!
//! # Module Structure
//!
//! - [`future`]: The completable future state machine and per-instance combinators
//! - [`combinator`]: first-completed, fold, reduce, sequence, traverse, blocking waits
//! - [`executor`]: The executor seam used by [`spawn`]
//! - [`observability`]: Failure sinks for diagnostics
//! - [`config`]: Timeout configuration
//! - [`error`]: Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod config;
pub mod error;
pub mod executor;
pub mod future;
pub mod observability;

// Re-exports for convenient access to core types
pub use combinator::{
    await_all, await_either, await_map, await_one, first_completed_of, fold, reduce, sequence,
    traverse,
};
pub use config::{ConfigError, FutureConfig, DEFAULT_TIMEOUT};
pub use error::{Error, ErrorKind, Outcome, Result, ResultExt};
pub use executor::{CallingThread, Executor, Work};
pub use future::{spawn, spawn_with_sink, CompletableFuture, Future};
pub use observability::{CollectingSink, FailureSink, NoOpSink, TracingSink};

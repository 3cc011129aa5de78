//! Per-instance combinators.
//!
//! `map`, `flat_map`, `filter` and `recover` each create a new future with
//! the source's remaining timeout and sink, and wire it with one
//! `on_complete` on the source. Exactly one of the source failure, the
//! transformed value, or the transformation's own failure reaches the
//! derived future.
//!
//! `foreach` and `receive` only observe: nothing is derived and failed or
//! non-matching outcomes are skipped.

use super::Future;
use crate::error::{Error, ErrorKind, Outcome};
use crate::observability::FailureSink;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runs user code, converting a panic into a reported `Transformation` error.
pub(crate) fn guarded<R>(sink: &dyn FailureSink, source: &str, f: impl FnOnce() -> R) -> Outcome<R> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let error = Error::from_panic(ErrorKind::Transformation, payload.as_ref());
        sink.report(&error, source);
        error
    })
}

impl<T: Clone + Send + 'static> Future<T> {
    /// Applies `f` to the success value.
    ///
    /// A source failure is forwarded unchanged and `f` is not called.
    pub fn map<U, F>(&self, f: F) -> Future<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let derived = self.derive::<U>();
        let target = derived.clone();
        self.on_complete(move |source| {
            let Some(outcome) = source.value() else {
                return;
            };
            let mapped = outcome.and_then(|v| guarded(source.sink().as_ref(), "map", || f(v)));
            target.complete(mapped);
        });
        derived.future()
    }

    /// Applies `f` to the success value and adopts the future it returns.
    pub fn flat_map<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        let derived = self.derive::<U>();
        let target = derived.clone();
        self.on_complete(move |source| {
            let Some(outcome) = source.value() else {
                return;
            };
            match outcome.and_then(|v| guarded(source.sink().as_ref(), "flat_map", || f(v))) {
                Ok(inner) => {
                    target.complete_with(&inner);
                }
                Err(error) => {
                    target.complete(Err(error));
                }
            }
        });
        derived.future()
    }

    /// Keeps the success value if `predicate` holds, else fails with `NoMatch`.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool + Send + 'static,
    {
        let derived = self.derive::<T>();
        let target = derived.clone();
        self.on_complete(move |source| {
            let Some(outcome) = source.value() else {
                return;
            };
            let filtered = outcome.and_then(|v| {
                let keep = guarded(source.sink().as_ref(), "filter", || predicate(&v))?;
                if keep {
                    Ok(v)
                } else {
                    Err(Error::no_match())
                }
            });
            target.complete(filtered);
        });
        derived.future()
    }

    /// Turns a failure into a success value; success passes through untouched.
    pub fn recover<F>(&self, f: F) -> Self
    where
        F: FnOnce(Error) -> T + Send + 'static,
    {
        let derived = self.derive::<T>();
        let target = derived.clone();
        self.on_complete(move |source| {
            let Some(outcome) = source.value() else {
                return;
            };
            let recovered = outcome
                .or_else(|error| guarded(source.sink().as_ref(), "recover", || f(error)));
            target.complete(recovered);
        });
        derived.future()
    }

    /// Calls `f` with the success value; failures are ignored.
    pub fn foreach<F>(&self, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.on_complete(move |source| {
            if let Some(value) = source.result() {
                f(value);
            }
        })
    }

    /// Calls `handler` only if the success value is a `U`.
    ///
    /// Outcomes that failed or hold another type are skipped silently.
    pub fn receive<U, F>(&self, handler: F) -> &Self
    where
        U: Any,
        F: FnOnce(&U) + Send + 'static,
    {
        self.on_complete(move |source| {
            if let Some(value) = source.result() {
                if let Some(matched) = (&value as &dyn Any).downcast_ref::<U>() {
                    handler(matched);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::CompletableFuture;
    use crate::observability::CollectingSink;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn promise<T: Send + 'static>() -> (CompletableFuture<T>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        (
            CompletableFuture::with_sink(Duration::from_secs(5), sink.clone()),
            sink,
        )
    }

    #[test]
    fn map_transforms_success() {
        let (p, _) = promise();
        let mapped = p.future().map(|v: i32| v.to_string());
        p.complete_with_result(12);
        assert_eq!(mapped.result().as_deref(), Some("12"));
    }

    #[test]
    fn map_forwards_failure_without_calling_f() {
        let (p, sink) = promise::<i32>();
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let mapped = p.future().map(move |v| {
            flag.store(true, Ordering::SeqCst);
            v + 1
        });
        p.complete_with_error(Error::msg("upstream"));

        assert!(!called.load(Ordering::SeqCst));
        let err = mapped.exception().expect("failed");
        assert_eq!(err.kind(), ErrorKind::User);
        assert_eq!(err.message(), Some("upstream"));
        assert!(sink.is_empty());
    }

    #[test]
    fn map_panic_becomes_transformation_error() {
        let (p, sink) = promise::<i32>();
        let mapped = p.future().map(|v| {
            assert!(v > 100, "value too small");
            v
        });
        p.complete_with_result(1);

        let err = mapped.exception().expect("failed");
        assert!(err.is_transformation());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.reports()[0].1, "map");
    }

    #[test]
    fn derived_future_inherits_remaining_budget() {
        let p: CompletableFuture<u8> = CompletableFuture::with_timeout(Duration::from_secs(2));
        std::thread::sleep(Duration::from_millis(50));
        let mapped = p.future().map(|v| v);
        assert!(mapped.timeout() < Duration::from_secs(2));
        assert!(mapped.timeout() > Duration::from_secs(1));
        assert!(!mapped.ptr_eq(&p.future().map(|v| v)));
    }

    #[test]
    fn flat_map_adopts_inner_future() {
        let (p, _) = promise();
        let inner = CompletableFuture::with_timeout(Duration::from_secs(5));
        let inner_view = inner.future();
        let chained = p.future().flat_map(move |v: u32| inner_view.map(move |w: u32| v + w));

        p.complete_with_result(40);
        assert!(!chained.is_completed());
        inner.complete_with_result(2);
        assert_eq!(chained.result(), Some(42));
    }

    #[test]
    fn flat_map_propagates_inner_failure() {
        let (p, _) = promise::<u32>();
        let chained = p
            .future()
            .flat_map(|_| Future::<u32>::failed(Error::unsupported("inner")));
        p.complete_with_result(1);
        assert_eq!(
            chained.exception().map(|e| e.kind()),
            Some(ErrorKind::UnsupportedOperation)
        );
    }

    #[test]
    fn filter_keeps_or_rejects() {
        let (p, _) = promise();
        let even = p.future().filter(|v: &u32| v % 2 == 0);
        let odd = p.future().filter(|v: &u32| v % 2 == 1);
        p.complete_with_result(4);

        assert_eq!(even.result(), Some(4));
        assert_eq!(odd.exception().map(|e| e.kind()), Some(ErrorKind::NoMatch));
    }

    #[test]
    fn recover_replaces_failure() {
        let (p, _) = promise::<String>();
        let recovered = p.future().recover(|e| format!("fallback after {e}"));
        p.complete_with_error(Error::msg("gone"));
        assert!(recovered.result().is_some_and(|s| s.starts_with("fallback")));
    }

    #[test]
    fn foreach_skips_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (ok, _) = promise::<u8>();
        let sink = Arc::clone(&seen);
        ok.foreach(move |v| sink.lock().push(v));
        ok.complete_with_result(1);

        let (failed, _) = promise::<u8>();
        let sink = Arc::clone(&seen);
        failed.foreach(move |v| sink.lock().push(v));
        failed.complete_with_error(Error::msg("skip me"));

        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn receive_matches_by_type() {
        let (p, _) = promise::<&'static str>();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&hits);
        p.receive(move |s: &&'static str| sink.lock().push((*s).to_string()));
        let sink = Arc::clone(&hits);
        p.receive(move |n: &u64| sink.lock().push(n.to_string()));

        p.complete_with_result("pong");
        assert_eq!(*hits.lock(), vec!["pong".to_string()]);
    }
}

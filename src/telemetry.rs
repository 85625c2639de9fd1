//! Tracing support for railway pipelines.
//!
//! A [`Telemetry`] handle opens one span per observed step. The span is named
//! `railway`, carries the step name in its `operation` field, and records
//! `otel.status_code` as `OK` or `ERROR` once the step finishes. A failure
//! additionally emits a `warn!` event with the error. Observing a step never
//! changes its result.
//!
//! The handle is passed explicitly; there is no global registry. Spans are
//! children of the handle's parent span, so a pipeline nests under whatever
//! request span created the handle.
//!
//! Feature-gated behind `#[cfg(feature = "tracing")]`.
//!
//! # Example
//!
//! ```
//! use railway::telemetry::{AsyncTraceExt, Telemetry, TraceExt};
//! use railway::{AsyncResultExt, Error, ResultExt};
//!
//! # tokio_test::block_on(async {
//! let telemetry = Telemetry::current();
//!
//! let checked = Ok::<_, Error>(21)
//!     .ensure(|age| *age >= 18, Error::validation("too young"))
//!     .traced(&telemetry, "Ensure");
//!
//! let doubled = checked
//!     .into_async()
//!     .map(|age| age * 2)
//!     .traced(&telemetry, "Map")
//!     .await;
//! assert_eq!(doubled, Ok(42));
//! # });
//! ```

use std::fmt::Display;
use std::future::Future;

use tracing::field::Empty;
use tracing::{Instrument, Span};

/// Handle that opens spans for observed steps.
#[derive(Debug, Clone)]
pub struct Telemetry {
    parent: Option<Span>,
}

impl Telemetry {
    /// Observe steps as children of `parent`.
    pub fn new(parent: Span) -> Self {
        Self {
            parent: Some(parent),
        }
    }

    /// Observe steps as children of the currently entered span.
    pub fn current() -> Self {
        Self::new(Span::current())
    }

    /// A handle that opens no spans and emits no events.
    pub fn disabled() -> Self {
        Self { parent: None }
    }

    /// Whether this handle records anything
    pub fn is_enabled(&self) -> bool {
        self.parent.is_some()
    }

    /// Open the span for one step.
    ///
    /// Returns a disabled span when the handle is disabled.
    pub fn span(&self, operation: &'static str) -> Span {
        match &self.parent {
            Some(parent) => tracing::debug_span!(
                parent: parent,
                "railway",
                operation,
                otel.status_code = Empty
            ),
            None => Span::none(),
        }
    }

    /// Run a synchronous step inside its own span.
    ///
    /// ```
    /// use railway::telemetry::Telemetry;
    /// use railway::Error;
    ///
    /// let telemetry = Telemetry::current();
    /// let r = telemetry.observe("Parse", || "42".parse::<i32>().map_err(|e| Error::bad_request(e.to_string())));
    /// assert_eq!(r, Ok(42));
    /// ```
    pub fn observe<T, E, F>(&self, operation: &'static str, f: F) -> Result<T, E>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let span = self.span(operation);
        let result = span.in_scope(f);
        record(&span, &result);
        result
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::current()
    }
}

fn record<T, E: Display>(span: &Span, result: &Result<T, E>) {
    if span.is_disabled() {
        return;
    }
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(error) => {
            span.record("otel.status_code", "ERROR");
            span.in_scope(|| tracing::warn!(error = %error, "railway step failed"));
        }
    }
}

/// Attach an already computed result to a step span.
pub trait TraceExt<T, E>: Sized {
    /// Record this result under a span named after `operation`.
    fn traced(self, telemetry: &Telemetry, operation: &'static str) -> Self;
}

impl<T, E: Display> TraceExt<T, E> for Result<T, E> {
    fn traced(self, telemetry: &Telemetry, operation: &'static str) -> Self {
        let span = telemetry.span(operation);
        record(&span, &self);
        self
    }
}

/// Run a pipeline future inside a step span.
pub trait AsyncTraceExt<T, E>: Future<Output = Result<T, E>> + Sized {
    /// Instrument this future with a span named after `operation` and record
    /// its outcome.
    fn traced(
        self,
        telemetry: &Telemetry,
        operation: &'static str,
    ) -> impl Future<Output = Result<T, E>>
    where
        E: Display,
    {
        let span = telemetry.span(operation);
        async move {
            let result = self.instrument(span.clone()).await;
            record(&span, &result);
            result
        }
    }
}

impl<Fut, T, E> AsyncTraceExt<T, E> for Fut where Fut: Future<Output = Result<T, E>> {}

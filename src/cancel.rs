//! Cooperative cancellation for async pipelines
//!
//! A [`CancellationToken`] is shared between the code that may cancel a
//! pipeline and the steps of that pipeline. Cancellable steps check the token
//! before running a continuation and race the continuation against it while
//! it runs. A cancelled step drops the pending work and fails with
//! [`Cancelled`], converted into the pipeline's error type.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::error::Error;

/// Code of the error produced when a pipeline is cancelled.
pub const CANCELLED_CODE: &str = "operation.cancelled";

/// The failure produced by a cancelled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("operation was cancelled")]
pub struct Cancelled;

impl From<Cancelled> for Error {
    fn from(cancelled: Cancelled) -> Self {
        Error::unexpected(cancelled.to_string()).with_code(CANCELLED_CODE)
    }
}

impl Error {
    /// Whether this error was produced by cancellation.
    ///
    /// Only an `Unexpected` error carrying [`CANCELLED_CODE`] qualifies, so a
    /// domain error that happens to reuse the code is not mistaken for one.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Unexpected(_)) && self.code() == CANCELLED_CODE
    }
}

/// Error types that can tell a cancellation failure apart from other ones.
///
/// Failure-side async steps such as
/// [`AsyncResultExt::compensate_async`](crate::AsyncResultExt::compensate_async)
/// pass a cancellation failure through untouched. Error types with no notion
/// of cancellation implement this trait with an empty body.
///
/// ```
/// use railway::Cancellation;
///
/// #[derive(Debug)]
/// struct Refused;
///
/// impl Cancellation for Refused {}
///
/// assert!(!Refused.is_cancellation());
/// ```
pub trait Cancellation {
    /// Whether this failure came from a cancelled step
    fn is_cancellation(&self) -> bool {
        false
    }
}

impl Cancellation for Error {
    fn is_cancellation(&self) -> bool {
        Error::is_cancellation(self)
    }
}

impl Cancellation for Cancelled {
    fn is_cancellation(&self) -> bool {
        true
    }
}

impl Cancellation for String {}
impl Cancellation for &str {}
impl Cancellation for () {}
impl Cancellation for std::io::Error {}
impl<T> Cancellation for Vec<T> {}

/// A token that can be used to request and observe cancellation.
///
/// Clone-able and thread-safe for sharing across async tasks.
///
/// # Example
///
/// ```
/// use railway::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
///
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation and wake every waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Completes once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// `Err(Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Run `fut` unless `token` is cancelled before it starts or while it runs.
pub(crate) async fn guard<F, T, E>(token: &CancellationToken, fut: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: From<Cancelled>,
{
    use futures::future::{select, Either};

    token.check()?;
    let fut = std::pin::pin!(fut);
    let cancelled = std::pin::pin!(token.cancelled());
    match select(fut, cancelled).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(Cancelled.into()),
    }
}

//! Converting faults into failures
//!
//! Combinators never catch panics: a panicking callback unwinds through
//! `bind`, `map` and friends untouched. The functions here are the boundary
//! where foreign code is allowed to fault. A panic raised inside is caught and
//! turned into a failure, and a foreign error type is turned into an
//! [`Error::Unexpected`](crate::Error::Unexpected).
//!
//! # Examples
//!
//! ```
//! use railway::{attempt, Error, ErrorKind};
//!
//! assert_eq!(attempt(|| 123), Ok(123));
//!
//! let failed = attempt(|| -> i32 { panic!("Boom") });
//! let error = failed.unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::Unexpected);
//! assert_eq!(error.detail(), "Boom");
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::FutureExt;

use crate::error::Error;

/// A panic caught at an [`attempt()`] boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    message: String,
}

impl Fault {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };
        Self { message }
    }

    /// The panic message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        Error::unexpected(fault.message)
    }
}

/// Run `f`, turning a panic into [`Error::Unexpected`] with the panic message.
pub fn attempt<T, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> T,
{
    attempt_with(f, Error::from)
}

/// Run `f`, turning a panic into a failure built by `mapper`.
///
/// ```
/// use railway::attempt::{attempt_with, Fault};
///
/// let r: Result<(), String> = attempt_with(
///     || panic!("disk on fire"),
///     |fault: Fault| format!("storage: {}", fault),
/// );
/// assert_eq!(r, Err("storage: disk on fire".to_string()));
/// ```
pub fn attempt_with<T, E, F, M>(f: F, mapper: M) -> Result<T, E>
where
    F: FnOnce() -> T,
    M: FnOnce(Fault) -> E,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| mapper(Fault::from_payload(payload)))
}

/// Await `fut`, turning a panic while polling into [`Error::Unexpected`].
pub async fn attempt_async<T, Fut>(fut: Fut) -> Result<T, Error>
where
    Fut: Future<Output = T>,
{
    attempt_async_with(fut, Error::from).await
}

/// Await `fut`, turning a panic while polling into a failure built by `mapper`.
pub async fn attempt_async_with<T, E, Fut, M>(fut: Fut, mapper: M) -> Result<T, E>
where
    Fut: Future<Output = T>,
    M: FnOnce(Fault) -> E,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(|payload| mapper(Fault::from_payload(payload)))
}

/// Run `f` and map its foreign error to [`Error::Unexpected`].
///
/// The detail of the failure is the foreign error's display text.
///
/// ```
/// use railway::attempt::from_fallible;
///
/// let port = from_fallible(|| "8080".parse::<u16>());
/// assert_eq!(port, Ok(8080));
///
/// let bad = from_fallible(|| "eighty".parse::<u16>()).unwrap_err();
/// assert_eq!(bad.detail(), "invalid digit found in string");
/// ```
pub fn from_fallible<T, X, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, X>,
    X: std::error::Error,
{
    f().map_err(|error| Error::unexpected(error.to_string()))
}

//! Async railway combinators
//!
//! [`AsyncResultExt`] is implemented for every future whose output is a
//! `Result`, so an async pipeline is written with the same vocabulary as a
//! synchronous one. Each combinator comes in two flavours:
//!
//! - `bind`, `map`, `ensure`, `tap`, ... take a synchronous continuation;
//! - `bind_async`, `map_async`, `ensure_async`, `tap_async`, ... take a
//!   continuation returning a future.
//!
//! A result that is already available joins an async pipeline through
//! [`ResultExt::into_async`](crate::ResultExt::into_async), which covers the
//! "immediate input, async continuation" case without a separate method set.
//!
//! Every step awaits its predecessor to completion before running, so two
//! steps of one pipeline never run at the same time. Short-circuiting is the
//! same as in the synchronous combinators: a failure skips every continuation
//! up to the next failure-side step.
//!
//! # Cancellation
//!
//! [`AsyncResultExt::with_cancellation`] guards any pipeline with a
//! [`CancellationToken`]; the `*_cancellable` combinators additionally hand a
//! token clone to their continuation. A cancelled step never starts its
//! continuation, drops a continuation that is already running, and fails with
//! [`Cancelled`] converted into the pipeline's error type.
//!
//! Failure-side steps (`compensate`, `compensate_with`, `compensate_if`,
//! `compensate_async`, `compensate_cancellable`) never recover a cancellation
//! failure: an error for which [`Cancellation::is_cancellation`] holds passes
//! through them unchanged, so a cancelled pipeline stays cancelled.
//!
//! # Method names
//!
//! `map` and `map_err` share their names with [`futures::FutureExt::map`] and
//! [`futures::TryFutureExt::map_err`]. With either of those traits in scope
//! a method call becomes ambiguous. Import this crate's
//! [`prelude`](crate::prelude) instead of the `futures` prelude in modules
//! that build pipelines, or call the method through the trait:
//!
//! ```
//! use futures::FutureExt as _;
//! use railway::{AsyncResultExt, Error, ResultExt};
//!
//! # tokio_test::block_on(async {
//! let doubled = AsyncResultExt::map(Ok::<_, Error>(2).into_async(), |x| x * 2).await;
//! assert_eq!(doubled, Ok(4));
//! # });
//! ```
//!
//! # Examples
//!
//! ```
//! use railway::{AsyncResultExt, Error, ResultExt};
//!
//! async fn load_user(id: u32) -> Result<String, Error> {
//!     if id == 7 { Ok("ada".to_string()) } else { Err(Error::not_found("user")) }
//! }
//!
//! async fn load_quota(name: String) -> Result<(String, u32), Error> {
//!     Ok((name, 3))
//! }
//!
//! # tokio_test::block_on(async {
//! let quota = load_user(7)
//!     .ensure(|name| !name.is_empty(), Error::validation("empty name"))
//!     .bind_async(load_quota)
//!     .map(|(_, quota)| quota)
//!     .await;
//! assert_eq!(quota, Ok(3));
//!
//! let missing = load_user(1)
//!     .bind_async(|_| async { panic!("never runs") as Result<(String, u32), Error> })
//!     .await;
//! assert_eq!(missing, Err(Error::not_found("user")));
//! # });
//! ```

use std::future::Future;

use crate::cancel::{guard, Cancellation, CancellationToken, Cancelled};
use crate::combinators::ResultExt;

/// Railway combinators for futures of `Result`.
pub trait AsyncResultExt<T, E>: Future<Output = Result<T, E>> + Sized {
    /// Continue with a synchronous fallible step on success.
    fn bind<U, F>(self, f: F) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        async move { self.await.and_then(f) }
    }

    /// Continue with an async fallible step on success.
    fn bind_async<U, F, Fut>(self, f: F) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        async move {
            match self.await {
                Ok(value) => f(value).await,
                Err(error) => Err(error),
            }
        }
    }

    /// Transform the success value.
    fn map<U, F>(self, f: F) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T) -> U,
    {
        async move { self.await.map(f) }
    }

    /// Transform the success value with an async function.
    fn map_async<U, F, Fut>(self, f: F) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = U>,
    {
        async move {
            match self.await {
                Ok(value) => Ok(f(value).await),
                Err(error) => Err(error),
            }
        }
    }

    /// Transform the error on the failure track.
    fn map_err<E2, F>(self, f: F) -> impl Future<Output = Result<T, E2>>
    where
        F: FnOnce(E) -> E2,
    {
        async move { self.await.map_err(f) }
    }

    /// Transform the error with an async function.
    fn map_err_async<E2, F, Fut>(self, f: F) -> impl Future<Output = Result<T, E2>>
    where
        F: FnOnce(E) -> Fut,
        Fut: Future<Output = E2>,
    {
        async move {
            match self.await {
                Ok(value) => Ok(value),
                Err(error) => Err(f(error).await),
            }
        }
    }

    /// Fail with `error` unless `predicate` holds for the value.
    fn ensure<P, Er>(self, predicate: P, error: Er) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        Er: Into<E>,
    {
        async move { self.await.ensure(predicate, error) }
    }

    /// Fail with an error built from the value unless `predicate` holds.
    fn ensure_with<P, F>(self, predicate: P, error: F) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(&T) -> E,
    {
        async move { self.await.ensure_with(predicate, error) }
    }

    /// Fail with `error` unless the value-independent `predicate` holds.
    fn ensure_that<P, Er>(self, predicate: P, error: Er) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce() -> bool,
        Er: Into<E>,
    {
        async move { self.await.ensure_that(predicate, error) }
    }

    /// Fail with `error` when `predicate` holds for the value.
    fn ensure_not<P, Er>(self, predicate: P, error: Er) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        Er: Into<E>,
    {
        async move { self.await.ensure_not(predicate, error) }
    }

    /// Validate with a fallible check, keeping the original value.
    fn ensure_result<U, F>(self, check: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&T) -> Result<U, E>,
    {
        async move { self.await.ensure_result(check) }
    }

    /// Fail with `error` unless the async `predicate` resolves to true.
    ///
    /// The predicate's future must not borrow the value; copy out what it
    /// needs before the `async` block.
    fn ensure_async<P, Fut, Er>(
        self,
        predicate: P,
        error: Er,
    ) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> Fut,
        Fut: Future<Output = bool>,
        Er: Into<E>,
    {
        async move {
            let value = self.await?;
            if predicate(&value).await {
                Ok(value)
            } else {
                Err(error.into())
            }
        }
    }

    /// Fail with an error built from the value unless the async `predicate`
    /// resolves to true.
    fn ensure_with_async<P, Fut, F>(
        self,
        predicate: P,
        error: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> Fut,
        Fut: Future<Output = bool>,
        F: FnOnce(&T) -> E,
    {
        async move {
            let value = self.await?;
            if predicate(&value).await {
                Ok(value)
            } else {
                Err(error(&value))
            }
        }
    }

    /// Validate with an async fallible check, keeping the original value.
    fn ensure_result_async<U, F, Fut>(self, check: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        async move {
            let value = self.await?;
            check(&value).await?;
            Ok(value)
        }
    }

    /// Run a side effect on success.
    fn tap<F>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&T),
    {
        async move { self.await.tap(f) }
    }

    /// Run an async side effect on success.
    fn tap_async<F, Fut>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&T) -> Fut,
        Fut: Future<Output = ()>,
    {
        async move {
            let result = self.await;
            if let Ok(value) = &result {
                f(value).await;
            }
            result
        }
    }

    /// Run a side effect on failure.
    fn tap_err<F>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&E),
    {
        async move { self.await.tap_err(f) }
    }

    /// Run an async side effect on failure.
    fn tap_err_async<F, Fut>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&E) -> Fut,
        Fut: Future<Output = ()>,
    {
        async move {
            let result = self.await;
            if let Err(error) = &result {
                f(error).await;
            }
            result
        }
    }

    /// Replace a failure with the outcome of a fallback.
    ///
    /// A cancellation failure is passed through.
    fn compensate<F>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce() -> Result<T, E>,
        E: Cancellation,
    {
        async move { self.await.compensate_if(|error| !error.is_cancellation(), |_| f()) }
    }

    /// Replace a failure with a fallback that receives the error.
    ///
    /// A cancellation failure is passed through.
    fn compensate_with<F>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(E) -> Result<T, E>,
        E: Cancellation,
    {
        async move { self.await.compensate_if(|error| !error.is_cancellation(), f) }
    }

    /// Replace a failure with the outcome of an async fallback.
    ///
    /// A cancellation failure is passed through.
    ///
    /// ```
    /// use railway::{AsyncResultExt, Error, ResultExt};
    ///
    /// # tokio_test::block_on(async {
    /// let r = Err::<u32, _>(Error::transient("primary busy"))
    ///     .into_async()
    ///     .compensate_async(|_| async { Ok(2) })
    ///     .await;
    /// assert_eq!(r, Ok(2));
    /// # });
    /// ```
    fn compensate_async<F, Fut>(self, f: F) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(E) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Cancellation,
    {
        async move {
            match self.await {
                Err(error) if !error.is_cancellation() => f(error).await,
                other => other,
            }
        }
    }

    /// Compensate only failures whose error matches `predicate`.
    ///
    /// A cancellation failure is passed through without consulting
    /// `predicate`.
    fn compensate_if<P, F>(self, predicate: P, f: F) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&E) -> bool,
        F: FnOnce(E) -> Result<T, E>,
        E: Cancellation,
    {
        async move {
            self.await
                .compensate_if(|error| !error.is_cancellation() && predicate(error), f)
        }
    }

    /// Hand the whole result to `f` and resolve to its output.
    fn finally<R, F>(self, f: F) -> impl Future<Output = R>
    where
        F: FnOnce(Result<T, E>) -> R,
    {
        async move { f(self.await) }
    }

    /// Hand the whole result to an async `f` and resolve to its output.
    fn finally_async<R, F, Fut>(self, f: F) -> impl Future<Output = R>
    where
        F: FnOnce(Result<T, E>) -> Fut,
        Fut: Future<Output = R>,
    {
        async move { f(self.await).await }
    }

    /// Collapse both tracks, calling exactly one of the two functions.
    fn fold<R, FO, FE>(self, on_ok: FO, on_err: FE) -> impl Future<Output = R>
    where
        FO: FnOnce(T) -> R,
        FE: FnOnce(E) -> R,
    {
        async move { self.await.fold(on_ok, on_err) }
    }

    /// Collapse both tracks with async functions, awaiting exactly one.
    fn fold_async<R, FO, FE, FutO, FutE>(
        self,
        on_ok: FO,
        on_err: FE,
    ) -> impl Future<Output = R>
    where
        FO: FnOnce(T) -> FutO,
        FE: FnOnce(E) -> FutE,
        FutO: Future<Output = R>,
        FutE: Future<Output = R>,
    {
        async move {
            match self.await {
                Ok(value) => on_ok(value).await,
                Err(error) => on_err(error).await,
            }
        }
    }

    /// Run a step that replaces the value, but only when `predicate` holds.
    fn when<P, F>(self, predicate: P, f: F) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Result<T, E>,
    {
        async move { self.await.when(predicate, f) }
    }

    /// Run a step that replaces the value, unless `predicate` holds.
    fn unless<P, F>(self, predicate: P, f: F) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Result<T, E>,
    {
        async move { self.await.unless(predicate, f) }
    }

    /// Run an async step that replaces the value, but only when `predicate` holds.
    fn when_async<P, F, Fut>(self, predicate: P, f: F) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        async move {
            match self.await {
                Ok(value) if predicate(&value) => f(value).await,
                other => other,
            }
        }
    }

    /// Run an async step that replaces the value, unless `predicate` holds.
    fn unless_async<P, F, Fut>(self, predicate: P, f: F) -> impl Future<Output = Result<T, E>>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.when_async(|value| !predicate(value), f)
    }

    /// Bind with a step while keeping the original value.
    fn bind_zip<U, F>(self, f: F) -> impl Future<Output = Result<(T, U), E>>
    where
        F: FnOnce(&T) -> Result<U, E>,
    {
        async move { self.await.bind_zip(f) }
    }

    /// Bind with a step, then project the original and new values together.
    fn select_many<U, V, F, P>(self, f: F, project: P) -> impl Future<Output = Result<V, E>>
    where
        F: FnOnce(&T) -> Result<U, E>,
        P: FnOnce(T, U) -> V,
    {
        async move { self.await.select_many(f, project) }
    }

    /// Bind with an async step while keeping the original value.
    fn bind_zip_async<U, F, Fut>(self, f: F) -> impl Future<Output = Result<(T, U), E>>
    where
        F: FnOnce(&T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        async move {
            let value = self.await?;
            let other = f(&value).await?;
            Ok((value, other))
        }
    }

    /// Bind with an async step, then project the original and new values
    /// together.
    fn select_many_async<U, V, F, Fut, P>(
        self,
        f: F,
        project: P,
    ) -> impl Future<Output = Result<V, E>>
    where
        F: FnOnce(&T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
        P: FnOnce(T, U) -> V,
    {
        self.bind_zip_async(f)
            .map(|(value, other)| project(value, other))
    }

    /// Abort this pipeline when `token` is cancelled.
    ///
    /// Cancelled before the pipeline is first polled: the pipeline never
    /// runs. Cancelled while it is pending: it is dropped at its current
    /// suspension point.
    ///
    /// ```
    /// use railway::{AsyncResultExt, CancellationToken, Error, ResultExt};
    ///
    /// # tokio_test::block_on(async {
    /// let token = CancellationToken::new();
    /// token.cancel();
    ///
    /// let r = Ok::<_, Error>(1)
    ///     .into_async()
    ///     .bind_async(|_| async { panic!("cancelled pipelines never continue") as Result<i32, Error> })
    ///     .with_cancellation(&token)
    ///     .await;
    /// assert!(r.unwrap_err().is_cancellation());
    /// # });
    /// ```
    fn with_cancellation(self, token: &CancellationToken) -> impl Future<Output = Result<T, E>>
    where
        E: From<Cancelled>,
    {
        let token = token.clone();
        async move { guard(&token, self).await }
    }

    /// Cancellable [`AsyncResultExt::bind_async`]; the step receives the token.
    fn bind_cancellable<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = Result<U, E>>,
        E: From<Cancelled>,
    {
        let token = token.clone();
        async move {
            let value = guard(&token, self).await?;
            token.check()?;
            guard(&token, f(value, token.clone())).await
        }
    }

    /// Cancellable [`AsyncResultExt::map_async`]; the step receives the token.
    fn map_cancellable<U, F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T, CancellationToken) -> Fut,
        Fut: Future<Output = U>,
        E: From<Cancelled>,
    {
        let token = token.clone();
        async move {
            let value = guard(&token, self).await?;
            token.check()?;
            let mapped = f(value, token.clone());
            guard(&token, async move { Ok(mapped.await) }).await
        }
    }

    /// Cancellable [`AsyncResultExt::tap_async`]; the action receives the token.
    fn tap_cancellable<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(&T, CancellationToken) -> Fut,
        Fut: Future<Output = ()>,
        E: From<Cancelled>,
    {
        let token = token.clone();
        async move {
            let value = guard(&token, self).await?;
            token.check()?;
            let action = f(&value, token.clone());
            guard(&token, async move {
                action.await;
                Ok(())
            })
            .await?;
            Ok(value)
        }
    }

    /// Cancellable [`AsyncResultExt::compensate_async`].
    ///
    /// A cancellation failure is never compensated.
    fn compensate_cancellable<F, Fut>(
        self,
        token: &CancellationToken,
        f: F,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: FnOnce(E, CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Cancelled> + Cancellation,
    {
        let token = token.clone();
        async move {
            match guard(&token, self).await {
                Ok(value) => Ok(value),
                Err(error) if error.is_cancellation() => Err(error),
                Err(error) => {
                    token.check()?;
                    guard(&token, f(error, token.clone())).await
                }
            }
        }
    }
}

impl<Fut, T, E> AsyncResultExt<T, E> for Fut where Fut: Future<Output = Result<T, E>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn failed() -> Result<i32, Error> {
        Err(Error::not_found("missing"))
    }

    async fn delayed<T>(value: Result<T, Error>, ms: u64) -> Result<T, Error> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        value
    }

    #[tokio::test]
    async fn test_bind_matches_sync_on_all_axes() {
        let step = |x: i32| if x > 0 { Ok(x * 2) } else { Err(Error::validation("neg")) };

        for input in [Ok(3), Ok(-1), failed()] {
            let sync = input.clone().bind(step);
            let async_input = input.clone().into_async().bind(step).await;
            let async_step = input
                .clone()
                .into_async()
                .bind_async(|x| async move { step(x) })
                .await;
            let both = delayed(input.clone(), 1)
                .bind_async(|x| async move { step(x) })
                .await;

            assert_eq!(async_input, sync);
            assert_eq!(async_step, sync);
            assert_eq!(both, sync);
        }
    }

    #[tokio::test]
    async fn test_map_matches_sync_on_all_axes() {
        for input in [Ok(4), failed()] {
            let sync = input.clone().map(|x| x + 1);
            assert_eq!(input.clone().into_async().map(|x| x + 1).await, sync);
            assert_eq!(
                input
                    .clone()
                    .into_async()
                    .map_async(|x| async move { x + 1 })
                    .await,
                sync
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .map_async(|x| async move { x + 1 })
                    .await,
                sync
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_variants_match_sync() {
        for input in [Ok(10), Ok(1), failed()] {
            let err = Error::validation("small");
            let sync = input.clone().ensure(|x| *x > 5, err.clone());
            assert_eq!(
                delayed(input.clone(), 1)
                    .ensure(|x| *x > 5, err.clone())
                    .await,
                sync
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .ensure_async(
                        |x| {
                            let x = *x;
                            async move { x > 5 }
                        },
                        err.clone()
                    )
                    .await,
                sync
            );
            assert_eq!(
                input
                    .clone()
                    .into_async()
                    .ensure_with(|x| *x > 5, |_| err.clone())
                    .await,
                sync
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .ensure_with_async(
                        |x| {
                            let x = *x;
                            async move { x > 5 }
                        },
                        |_| err.clone()
                    )
                    .await,
                sync
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .ensure_not(|x| *x <= 5, err.clone())
                    .await,
                input.clone().ensure_not(|x| *x <= 5, err.clone())
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .ensure_result(|x| if *x > 5 { Ok(()) } else { Err(err.clone()) })
                    .await,
                sync
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_that_matches_sync() {
        for input in [Ok(1), failed()] {
            for open in [true, false] {
                let err = Error::service_unavailable("closed");
                let sync = input.clone().ensure_that(|| open, err.clone());
                assert_eq!(
                    delayed(input.clone(), 1).ensure_that(|| open, err).await,
                    sync
                );
            }
        }
    }

    #[tokio::test]
    async fn test_when_and_unless_match_sync() {
        let step = |x: i32| if x < 50 { Ok(x * 10) } else { Err(Error::conflict("big")) };

        for input in [Ok(10), Ok(1), Ok(90), failed()] {
            let big = |x: &i32| *x > 5;

            let sync_when = input.clone().when(big, step);
            assert_eq!(delayed(input.clone(), 1).when(big, step).await, sync_when);
            assert_eq!(
                delayed(input.clone(), 1)
                    .when_async(big, |x| async move { step(x) })
                    .await,
                sync_when
            );

            let sync_unless = input.clone().unless(big, step);
            assert_eq!(delayed(input.clone(), 1).unless(big, step).await, sync_unless);
            assert_eq!(
                delayed(input.clone(), 1)
                    .unless_async(big, |x| async move { step(x) })
                    .await,
                sync_unless
            );
        }
    }

    #[tokio::test]
    async fn test_bind_zip_and_select_many_match_sync() {
        let lookup = |x: &i32| {
            if *x > 0 {
                Ok(format!("#{}", x))
            } else {
                Err(Error::not_found("label"))
            }
        };
        let project = |x: i32, label: String| format!("{}={}", label, x);

        for input in [Ok(3), Ok(0), failed()] {
            let sync_zip = input.clone().bind_zip(lookup);
            assert_eq!(delayed(input.clone(), 1).bind_zip(lookup).await, sync_zip);
            assert_eq!(
                delayed(input.clone(), 1)
                    .bind_zip_async(|x| {
                        let label = lookup(x);
                        async move { label }
                    })
                    .await,
                sync_zip
            );

            let sync_select = input.clone().select_many(lookup, project);
            assert_eq!(
                delayed(input.clone(), 1).select_many(lookup, project).await,
                sync_select
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .select_many_async(
                        |x| {
                            let label = lookup(x);
                            async move { label }
                        },
                        project
                    )
                    .await,
                sync_select
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_result_async_keeps_original_value() {
        let r = delayed(Ok(7), 1)
            .ensure_result_async(|_| async { Ok::<_, Error>("discarded") })
            .await;
        assert_eq!(r, Ok(7));

        let r = delayed(Ok(7), 1)
            .ensure_result_async(|_| async { Err::<(), _>(Error::conflict("dup")) })
            .await;
        assert_eq!(r, Err(Error::conflict("dup")));
    }

    #[tokio::test]
    async fn test_short_circuit_async() {
        let r = delayed(failed(), 1)
            .bind(|_| -> Result<i32, Error> { panic!("bind") })
            .bind_async(|_| async { panic!("bind_async") as Result<i32, Error> })
            .map(|_| -> i32 { panic!("map") })
            .map_async(|_| async { panic!("map_async") as i32 })
            .ensure(|_| panic!("ensure"), Error::domain("x"))
            .tap(|_| panic!("tap"))
            .tap_async(|_| async { panic!("tap_async") })
            .await;
        assert_eq!(r, failed());
    }

    #[tokio::test]
    async fn test_tap_variants() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s1 = seen.clone();
        let s2 = seen.clone();
        let r = delayed(Ok(1), 1)
            .tap(move |v| s1.lock().unwrap().push(format!("tap {}", v)))
            .tap_async(move |v| {
                let v = *v;
                async move { s2.lock().unwrap().push(format!("tap_async {}", v)) }
            })
            .tap_err(|_| panic!("tap_err on success"))
            .await;
        assert_eq!(r, Ok(1));

        let s3 = seen.clone();
        let r = delayed(failed(), 1)
            .tap_err_async(move |e| {
                let code = e.code().to_string();
                async move { s3.lock().unwrap().push(format!("tap_err {}", code)) }
            })
            .await;
        assert_eq!(r, failed());

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["tap 1", "tap_async 1", "tap_err not.found"]
        );
    }

    #[tokio::test]
    async fn test_compensate_variants() {
        assert_eq!(delayed(failed(), 1).compensate(|| Ok(9)).await, Ok(9));
        assert_eq!(
            delayed(Ok(1), 1)
                .compensate(|| panic!("not on success"))
                .await,
            Ok(1)
        );
        assert_eq!(
            delayed(failed(), 1)
                .compensate_with(|e| Ok(e.status_code() as i32))
                .await,
            Ok(404)
        );
        assert_eq!(
            delayed(failed(), 1)
                .compensate_async(|_| async { Ok(2) })
                .await,
            Ok(2)
        );
        assert_eq!(
            delayed(failed(), 1)
                .compensate_if(Error::is_retryable, |_| Ok(3))
                .await,
            failed()
        );
    }

    #[tokio::test]
    async fn test_finally_and_fold() {
        let text = delayed(Ok(2), 1)
            .finally(|r| format!("{:?}", r.map(|v| v * 2)))
            .await;
        assert_eq!(text, "Ok(4)");

        let code = delayed(failed(), 1)
            .finally_async(|r| async move { r.map_or_else(|e| e.status_code(), |_| 200) })
            .await;
        assert_eq!(code, 404);

        let folded = delayed(Ok(5), 1).fold(|v| v + 1, |_| 0).await;
        assert_eq!(folded, 6);
    }

    #[tokio::test]
    async fn test_map_err_matches_sync() {
        for input in [Ok(1), failed()] {
            let sync = input.clone().map_err(|e| e.code().to_string());
            assert_eq!(
                delayed(input.clone(), 1)
                    .map_err(|e| e.code().to_string())
                    .await,
                sync
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .map_err_async(|e| async move { e.code().to_string() })
                    .await,
                sync
            );
        }
    }

    #[tokio::test]
    async fn test_fold_matches_sync() {
        for input in [Ok(5), failed()] {
            let sync = input.clone().fold(|v| v + 1, |e| e.status_code() as i32);
            assert_eq!(
                delayed(input.clone(), 1)
                    .fold(|v| v + 1, |e| e.status_code() as i32)
                    .await,
                sync
            );
            assert_eq!(
                delayed(input.clone(), 1)
                    .fold_async(
                        |v| async move { v + 1 },
                        |e| async move { e.status_code() as i32 }
                    )
                    .await,
                sync
            );
        }
    }

    #[tokio::test]
    async fn test_trait_qualified_calls_with_futures_ext_in_scope() {
        use futures::FutureExt as _;
        use futures::TryFutureExt as _;

        let doubled = AsyncResultExt::map(delayed(Ok(2), 1), |x| x * 2).await;
        assert_eq!(doubled, Ok(4));

        let code = AsyncResultExt::map_err(delayed(failed(), 1), |e| e.status_code()).await;
        assert_eq!(code, Err(404));
    }

    #[tokio::test]
    async fn test_when_async_and_bind_zip_async() {
        let r = delayed(Ok(10), 1)
            .when_async(|x| *x > 5, |x| async move { Ok(x * 10) })
            .await;
        assert_eq!(r, Ok(100));

        let r = delayed(Ok(1), 1)
            .when_async(|x| *x > 5, |_| async { panic!("predicate false") as Result<i32, Error> })
            .await;
        assert_eq!(r, Ok(1));

        let r = delayed(Ok(2), 1)
            .bind_zip_async(|x| {
                let x = *x;
                async move { Ok(x + 1) }
            })
            .await;
        assert_eq!(r, Ok((2, 3)));
    }

    #[tokio::test]
    async fn test_steps_run_strictly_in_sequence() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let l1 = log.clone();
        let l2 = log.clone();
        let l3 = log.clone();
        let r = async {
            l1.lock().unwrap().push("start 1");
            tokio::time::sleep(Duration::from_millis(20)).await;
            l1.lock().unwrap().push("end 1");
            Ok::<_, Error>(1)
        }
        .bind_async(move |x| async move {
            l2.lock().unwrap().push("start 2");
            tokio::time::sleep(Duration::from_millis(10)).await;
            l2.lock().unwrap().push("end 2");
            Ok(x + 1)
        })
        .tap_async(move |_| async move {
            l3.lock().unwrap().push("tap");
        })
        .await;

        assert_eq!(r, Ok(2));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start 1", "end 1", "start 2", "end 2", "tap"]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_continuation_never_invokes_it() {
        let token = CancellationToken::new();
        token.cancel();

        let r = delayed(Ok(1), 1)
            .bind_cancellable(&token, |_, _| async {
                panic!("continuation must not run") as Result<i32, Error>
            })
            .await;
        assert!(r.unwrap_err().is_cancellation());
    }

    #[tokio::test]
    async fn test_cancelled_during_continuation_aborts() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        let reached = Arc::new(Mutex::new(false));
        let flag = reached.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let r = delayed(Ok(1), 1)
            .bind_cancellable(&token, |x, _| async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(x)
            })
            .map(move |x| {
                *flag.lock().unwrap() = true;
                x
            })
            .await;

        assert!(r.unwrap_err().is_cancellation());
        assert!(!*reached.lock().unwrap());
    }

    #[tokio::test]
    async fn test_continuation_receives_token() {
        let token = CancellationToken::new();
        let r = delayed(Ok(1), 1)
            .map_cancellable(&token, |x, t| async move { (x, t.is_cancelled()) })
            .await;
        assert_eq!(r, Ok((1, false)));
    }

    #[tokio::test]
    async fn test_tap_cancellable_keeps_value() {
        let token = CancellationToken::new();
        let r = delayed(Ok(5), 1)
            .tap_cancellable(&token, |_, _| async {})
            .await;
        assert_eq!(r, Ok(5));

        token.cancel();
        let r = delayed(Ok(5), 1)
            .tap_cancellable(&token, |_, _| async { panic!("cancelled") })
            .await;
        assert!(r.unwrap_err().is_cancellation());
    }

    #[tokio::test]
    async fn test_cancellation_is_never_compensated() {
        let token = CancellationToken::new();
        token.cancel();
        let r = delayed(Ok(5), 1)
            .with_cancellation(&token)
            .compensate_cancellable(&token, |_, _| async { Ok(0) })
            .await;
        assert!(r.unwrap_err().is_cancellation());
    }

    #[tokio::test]
    async fn test_compensate_leaves_cancellation_alone() {
        let token = CancellationToken::new();
        token.cancel();

        let r = async { Ok::<_, Error>(1) }
            .with_cancellation(&token)
            .compensate_async(|_| async { Ok(0) })
            .bind(|x| Ok(x + 100))
            .await;
        assert!(r.unwrap_err().is_cancellation());

        let cancelled = || delayed(Ok(1), 1).with_cancellation(&token);
        assert!(cancelled().compensate(|| Ok(0)).await.unwrap_err().is_cancellation());
        assert!(cancelled()
            .compensate_with(|_| Ok(0))
            .await
            .unwrap_err()
            .is_cancellation());
        assert!(cancelled()
            .compensate_if(|_| true, |_| Ok(0))
            .await
            .unwrap_err()
            .is_cancellation());
    }

    #[tokio::test]
    async fn test_cancellation_survives_later_failure_steps() {
        let token = CancellationToken::new();
        token.cancel();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let seen = observed.clone();

        let r = delayed(Ok(1), 1)
            .with_cancellation(&token)
            .tap_err(move |e| seen.lock().unwrap().push(e.code().to_string()))
            .compensate(|| Ok(2))
            .compensate_async(|_| async { Ok(3) })
            .compensate_if(|_| true, |_| Ok(4))
            .bind(|x| Ok(x + 100))
            .await;

        let error = r.unwrap_err();
        assert!(error.is_cancellation());
        assert_eq!(error.kind(), crate::ErrorKind::Unexpected);
        assert_eq!(*observed.lock().unwrap(), vec![crate::cancel::CANCELLED_CODE]);
    }

    #[tokio::test]
    async fn test_compensate_still_recovers_lookalike_error() {
        let lookalike = Error::domain("stopped").with_code(crate::cancel::CANCELLED_CODE);
        let r = delayed(Err::<i32, _>(lookalike), 1)
            .compensate_async(|_| async { Ok(7) })
            .await;
        assert_eq!(r, Ok(7));
    }

    #[tokio::test]
    async fn test_compensate_with_caller_error_type() {
        #[derive(Debug, PartialEq)]
        enum Refused {
            Busy,
            Stopped,
        }

        impl Cancellation for Refused {
            fn is_cancellation(&self) -> bool {
                matches!(self, Refused::Stopped)
            }
        }

        let r = async { Err::<i32, _>(Refused::Busy) }
            .compensate(|| Ok(1))
            .await;
        assert_eq!(r, Ok(1));

        let r = async { Err::<i32, _>(Refused::Stopped) }
            .compensate(|| Ok(1))
            .await;
        assert_eq!(r, Err(Refused::Stopped));

        let r = async { Err::<i32, String>("busy".into()) }
            .compensate_with(|_| Ok(2))
            .await;
        assert_eq!(r, Ok(2));
    }

    #[tokio::test]
    async fn test_compensate_cancellable_recovers_domain_failure() {
        let token = CancellationToken::new();
        let r = delayed(failed(), 1)
            .compensate_cancellable(&token, |_, _| async { Ok(0) })
            .await;
        assert_eq!(r, Ok(0));
    }

    #[tokio::test]
    async fn test_with_cancellation_passes_through_when_not_cancelled() {
        let token = CancellationToken::new();
        let r = delayed(Ok(3), 1).with_cancellation(&token).await;
        assert_eq!(r, Ok(3));
    }
}

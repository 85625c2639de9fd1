//! Parallel fan-out over independent async steps
//!
//! This module provides functions for awaiting several fallible futures at once:
//! - [`WhenAll::when_all`] / [`when_all`] - await a tuple of futures concurrently
//! - [`Parallel::parallel`] / [`parallel()`] - invoke a tuple of operations, then await them all
//! - [`par_all`] - await a homogeneous collection of futures concurrently
//! - [`par_all_limit`] - like `par_all`, with at most `limit` futures in flight
//!
//! Every branch runs to completion; a failing branch never cancels its
//! siblings. The outcomes are then folded like [`Combined`](crate::Combined):
//! a tuple (or vector) of values when every branch succeeded, otherwise the
//! failed branches' errors combined in slot order.
//!
//! Concurrency comes only from polling the futures together. Nothing here
//! spawns a task, so `!Send` futures work and no runtime is required.
//!
//! # Example
//!
//! ```
//! use railway::{parallel, AsyncResultExt, Error};
//!
//! async fn price(sku: &str) -> Result<u32, Error> {
//!     Ok(sku.len() as u32 * 100)
//! }
//!
//! async fn stock(sku: &str) -> Result<u32, Error> {
//!     if sku == "gone" { Err(Error::not_found("sku")) } else { Ok(5) }
//! }
//!
//! # tokio_test::block_on(async {
//! let total = parallel((|| price("abc"), || stock("abc")))
//!     .map(|(price, stock)| price * stock)
//!     .await;
//! assert_eq!(total, Ok(1500));
//! # });
//! ```

use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::combine::slot;
use crate::semigroup::{combine_all, Semigroup};
use crate::traverse::sequence;

/// Await a tuple of fallible futures concurrently and fold their outcomes.
///
/// Implemented for tuples of 2 to 9 futures sharing one error type.
pub trait WhenAll<E> {
    /// Tuple of success values, in slot order
    type Output;

    /// Await every future, then fold.
    fn when_all(self) -> impl Future<Output = Result<Self::Output, E>>;
}

/// Invoke a tuple of async operations, then await them all.
///
/// Implemented for tuples of 2 to 9 `FnOnce() -> Future` operations. Every
/// operation is invoked when `parallel` is called, before any of the
/// resulting futures is awaited.
pub trait Parallel<E> {
    /// Tuple of success values, in slot order
    type Output;

    /// Fire every operation, then await all of them.
    fn parallel(self) -> impl Future<Output = Result<Self::Output, E>>;
}

/// Free-function form of [`WhenAll::when_all`].
///
/// ```
/// use railway::{when_all, Error};
///
/// # tokio_test::block_on(async {
/// let r = when_all((
///     async { Ok::<_, Error>(1) },
///     async { Err::<&str, _>(Error::conflict("taken")) },
///     async { Err::<bool, _>(Error::validation("bad")) },
/// ))
/// .await;
/// assert_eq!(r.unwrap_err().errors().len(), 2);
/// # });
/// ```
pub fn when_all<W, E>(futures: W) -> impl Future<Output = Result<W::Output, E>>
where
    W: WhenAll<E>,
{
    futures.when_all()
}

/// Free-function form of [`Parallel::parallel`].
pub fn parallel<P, E>(operations: P) -> impl Future<Output = Result<P::Output, E>>
where
    P: Parallel<E>,
{
    operations.parallel()
}

macro_rules! impl_when_all {
    ($($Fut:ident $T:ident $f:ident),+) => {
        impl<$($Fut, $T,)+ E> WhenAll<E> for ($($Fut,)+)
        where
            $($Fut: Future<Output = Result<$T, E>>,)+
            E: Semigroup,
        {
            type Output = ($($T,)+);

            fn when_all(self) -> impl Future<Output = Result<Self::Output, E>> {
                let ($($f,)+) = self;
                async move {
                    let ($($f,)+) = futures::join!($($f),+);
                    let mut errors = Vec::new();
                    let ($($f,)+) = ($(slot($f, &mut errors),)+);
                    match (combine_all(errors), ($($f,)+)) {
                        (Some(error), _) => Err(error),
                        (None, ($(Some($f),)+)) => Ok(($($f,)+)),
                        (None, _) => unreachable!("an empty slot always records its error"),
                    }
                }
            }
        }
    };
}

macro_rules! impl_parallel {
    ($($Op:ident $Fut:ident $T:ident $o:ident),+) => {
        impl<$($Op, $Fut, $T,)+ E> Parallel<E> for ($($Op,)+)
        where
            $($Op: FnOnce() -> $Fut, $Fut: Future<Output = Result<$T, E>>,)+
            E: Semigroup,
        {
            type Output = ($($T,)+);

            fn parallel(self) -> impl Future<Output = Result<Self::Output, E>> {
                let ($($o,)+) = self;
                ($($o(),)+).when_all()
            }
        }
    };
}

impl_when_all!(F1 T1 f1, F2 T2 f2);
impl_when_all!(F1 T1 f1, F2 T2 f2, F3 T3 f3);
impl_when_all!(F1 T1 f1, F2 T2 f2, F3 T3 f3, F4 T4 f4);
impl_when_all!(F1 T1 f1, F2 T2 f2, F3 T3 f3, F4 T4 f4, F5 T5 f5);
impl_when_all!(F1 T1 f1, F2 T2 f2, F3 T3 f3, F4 T4 f4, F5 T5 f5, F6 T6 f6);
impl_when_all!(F1 T1 f1, F2 T2 f2, F3 T3 f3, F4 T4 f4, F5 T5 f5, F6 T6 f6, F7 T7 f7);
impl_when_all!(F1 T1 f1, F2 T2 f2, F3 T3 f3, F4 T4 f4, F5 T5 f5, F6 T6 f6, F7 T7 f7, F8 T8 f8);
impl_when_all!(
    F1 T1 f1, F2 T2 f2, F3 T3 f3, F4 T4 f4, F5 T5 f5, F6 T6 f6, F7 T7 f7, F8 T8 f8, F9 T9 f9
);

impl_parallel!(O1 F1 T1 o1, O2 F2 T2 o2);
impl_parallel!(O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3);
impl_parallel!(O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3, O4 F4 T4 o4);
impl_parallel!(O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3, O4 F4 T4 o4, O5 F5 T5 o5);
impl_parallel!(O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3, O4 F4 T4 o4, O5 F5 T5 o5, O6 F6 T6 o6);
impl_parallel!(
    O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3, O4 F4 T4 o4, O5 F5 T5 o5, O6 F6 T6 o6, O7 F7 T7 o7
);
impl_parallel!(
    O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3, O4 F4 T4 o4, O5 F5 T5 o5, O6 F6 T6 o6, O7 F7 T7 o7,
    O8 F8 T8 o8
);
impl_parallel!(
    O1 F1 T1 o1, O2 F2 T2 o2, O3 F3 T3 o3, O4 F4 T4 o4, O5 F5 T5 o5, O6 F6 T6 o6, O7 F7 T7 o7,
    O8 F8 T8 o8, O9 F9 T9 o9
);

/// Await a collection of futures concurrently, collecting all values or all errors.
///
/// Returns `Ok(values)` in input order if every future succeeds, otherwise
/// the errors combined in input order. All futures run to completion
/// regardless of individual failures.
///
/// ```
/// use railway::{parallel::par_all, Error};
///
/// # tokio_test::block_on(async {
/// let lookups = (1..=3).map(|id| async move { Ok::<_, Error>(id * 10) });
/// assert_eq!(par_all(lookups).await, Ok(vec![10, 20, 30]));
/// # });
/// ```
pub async fn par_all<T, E, I, Fut>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
    E: Semigroup,
{
    let results: Vec<Result<T, E>> = futures::future::join_all(futures).await;
    sequence(results)
}

/// [`par_all`] with at most `limit` futures polled at a time.
///
/// Results keep input order. A `limit` of zero is treated as one.
pub async fn par_all_limit<T, E, I, Fut>(futures: I, limit: usize) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
    E: Semigroup,
{
    let results: Vec<Result<T, E>> = stream::iter(futures)
        .buffered(limit.max(1))
        .collect()
        .await;
    sequence(results)
}

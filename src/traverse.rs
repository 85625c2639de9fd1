//! Traverse and sequence utilities for collections of results
//!
//! # Core Concepts
//!
//! - **`sequence`**: Convert a collection of results into a result of a collection
//!   - `Vec<Result<T, E>>` → `Result<Vec<T>, E>`, accumulating every error
//!
//! - **`traverse`**: Map a fallible function over a collection and sequence the results
//!
//! - **`traverse_async`**: Run an async fallible function over a collection,
//!   one element at a time, stopping at the first failure
//!
//! Unlike `Iterator::collect::<Result<Vec<_>, _>>()`, which stops at the first
//! error, `traverse` and `sequence` visit every element and fold all errors
//! with [`Semigroup::combine`] in element order.
//!
//! # Examples
//!
//! ```
//! use railway::{traverse::traverse, Error};
//!
//! fn parse_port(s: &str) -> Result<u16, Error> {
//!     s.parse()
//!         .map_err(|_| Error::validation_field("port", format!("invalid port: {}", s)))
//! }
//!
//! assert_eq!(traverse(vec!["80", "443"], parse_port), Ok(vec![80, 443]));
//!
//! let error = traverse(vec!["80", "http", "ssh"], parse_port).unwrap_err();
//! assert_eq!(error.errors().len(), 2);
//! ```

use std::future::Future;

use crate::semigroup::{combine_all, Semigroup};

/// Traverse a collection with a fallible function.
///
/// Applies `f` to each element, accumulating all errors if any fail.
/// If every call succeeds, returns a success with a vector of all results.
///
/// # Type Parameters
///
/// * `T` - Input element type
/// * `U` - Output element type
/// * `E` - Error type (must implement `Semigroup` for error accumulation)
/// * `F` - Function type that transforms `T` into `Result<U, E>`
/// * `I` - Input iterator type
pub fn traverse<T, U, E, F, I>(iter: I, f: F) -> Result<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Result<U, E>,
    E: Semigroup,
{
    sequence(iter.into_iter().map(f))
}

/// Sequence a collection of results.
///
/// If all results succeed, returns success with all values in order.
/// If any fail, accumulates all errors using `Semigroup`.
///
/// ```
/// use railway::traverse::sequence;
///
/// let all: Vec<Result<i32, Vec<&str>>> = vec![Ok(1), Ok(2), Ok(3)];
/// assert_eq!(sequence(all), Ok(vec![1, 2, 3]));
///
/// let some: Vec<Result<i32, Vec<&str>>> = vec![Err(vec!["first"]), Ok(2), Err(vec!["third"])];
/// assert_eq!(sequence(some), Err(vec!["first", "third"]));
/// ```
pub fn sequence<T, E, I>(iter: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
    E: Semigroup,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();

    for result in iter {
        match result {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error),
        }
    }

    match combine_all(errors) {
        Some(error) => Err(error),
        None => Ok(values),
    }
}

/// Traverse a collection with an async fallible function.
///
/// Elements are processed sequentially; the first failure stops the
/// traversal and later elements are never visited. Use
/// [`par_all`](crate::parallel::par_all) to run every element concurrently
/// and accumulate all errors.
///
/// ```
/// use railway::{traverse::traverse_async, Error};
///
/// # tokio_test::block_on(async {
/// let doubled = traverse_async(vec![1, 2, 3], |x| async move { Ok::<_, Error>(x * 2) }).await;
/// assert_eq!(doubled, Ok(vec![2, 4, 6]));
/// # });
/// ```
pub async fn traverse_async<T, U, E, F, Fut, I>(iter: I, mut f: F) -> Result<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<U, E>>,
{
    let iter = iter.into_iter();
    let mut values = Vec::with_capacity(iter.size_hint().0);
    for item in iter {
        values.push(f(item).await?);
    }
    Ok(values)
}

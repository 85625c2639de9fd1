//! Semigroup trait for accumulating errors
//!
//! Every operation that keeps going after a failure (`combine`, `when_all`,
//! `parallel`, `traverse`, `par_all`) folds the errors it collected with
//! [`Semigroup::combine`], in the order the failing slots were declared.
//!
//! # Mathematical Properties
//!
//! The `combine` operation must be associative:
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use railway::{Error, Semigroup};
//!
//! // Plain collections concatenate
//! assert_eq!(vec![1, 2].combine(vec![3]), vec![1, 2, 3]);
//!
//! // Errors build a flat aggregate
//! let err = Error::not_found("a").combine(Error::conflict("b"));
//! assert_eq!(err.errors(), &[Error::not_found("a"), Error::conflict("b")]);
//! ```
//!
//! # Custom Implementations
//!
//! Pipelines are generic over their error type; any `Semigroup` can be
//! accumulated:
//!
//! ```
//! use railway::Semigroup;
//!
//! #[derive(Debug, PartialEq)]
//! struct Problems(Vec<String>);
//!
//! impl Semigroup for Problems {
//!     fn combine(mut self, other: Self) -> Self {
//!         self.0.extend(other.0);
//!         self
//!     }
//! }
//! ```

use crate::error::{AggregateError, Error};

/// A type that supports an associative binary operation
///
/// # Laws
///
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

impl Semigroup for String {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

/// Errors combine into a flat [`Error::Aggregate`], left side first.
impl Semigroup for Error {
    fn combine(self, other: Self) -> Self {
        let mut errors = self.into_errors();
        errors.extend(other.into_errors());
        Error::Aggregate {
            errors: AggregateError::from_parts(errors),
        }
    }
}

/// Fold every value in order, or `None` when there is nothing to fold.
///
/// ```
/// use railway::semigroup::combine_all;
///
/// assert_eq!(combine_all(vec![vec![1], vec![2], vec![3]]), Some(vec![1, 2, 3]));
/// assert_eq!(combine_all(Vec::<Vec<i32>>::new()), None);
/// ```
pub fn combine_all<S, I>(values: I) -> Option<S>
where
    S: Semigroup,
    I: IntoIterator<Item = S>,
{
    values.into_iter().reduce(Semigroup::combine)
}

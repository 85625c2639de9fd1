//! Combining independent results while collecting every error
//!
//! `bind` stops at the first failure. When several results do not depend on
//! each other, [`CombineExt::combine`] keeps going instead: it builds a
//! [`Combined`] accumulator (up to nine slots) that remembers each slot's
//! value and, separately, every error seen so far in slot order.
//!
//! Finishing the accumulator yields `Ok` with the tuple of values when every
//! slot succeeded, and otherwise the failed slots' errors folded with
//! [`Semigroup::combine`]. A single failed slot yields its error as is; two
//! or more build an aggregate.
//!
//! # Examples
//!
//! ```
//! use railway::{CombineExt, Error};
//!
//! let name: Result<&str, Error> = Ok("Ada");
//! let email: Result<&str, Error> = Err(Error::validation_field("email", "missing @"));
//! let age: Result<u8, Error> = Err(Error::validation_field("age", "too young"));
//!
//! let user = name.combine(email).combine(age).into_result();
//!
//! let error = user.unwrap_err();
//! assert_eq!(error.errors().len(), 2);
//! assert_eq!(error.errors()[0].field(), Some("email"));
//! assert_eq!(error.errors()[1].field(), Some("age"));
//! ```

use crate::semigroup::{combine_all, Semigroup};

/// Accumulator produced by chained [`CombineExt::combine`] calls.
///
/// `S` is a tuple of `Option`s, one per slot: `Some(value)` for a success,
/// `None` for a failure whose error was appended to the error list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a combined result does nothing until it is finished"]
pub struct Combined<S, E> {
    slots: S,
    errors: Vec<E>,
}

impl<S, E> Combined<S, E> {
    /// Errors collected so far, in slot order
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// True when no slot has failed yet
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// The per-slot values
    pub fn slots(&self) -> &S {
        &self.slots
    }
}

/// Start a [`Combined`] accumulator from a result.
pub trait CombineExt<T, E> {
    /// Pair this result with another independent one.
    fn combine<U>(self, other: Result<U, E>) -> Combined<(Option<T>, Option<U>), E>;
}

impl<T, E> CombineExt<T, E> for Result<T, E> {
    fn combine<U>(self, other: Result<U, E>) -> Combined<(Option<T>, Option<U>), E> {
        let mut errors = Vec::new();
        let first = slot(self, &mut errors);
        let second = slot(other, &mut errors);
        Combined {
            slots: (first, second),
            errors,
        }
    }
}

pub(crate) fn slot<T, E>(result: Result<T, E>, errors: &mut Vec<E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

// Adds one more slot to an accumulator of the given arity
macro_rules! impl_combine_next {
    ($($T:ident $v:ident),+ => $N:ident) => {
        impl<$($T,)+ E> Combined<($(Option<$T>,)+), E> {
            /// Add another independent result as the next slot.
            pub fn combine<$N>(
                self,
                next: Result<$N, E>,
            ) -> Combined<($(Option<$T>,)+ Option<$N>), E> {
                let mut errors = self.errors;
                let ($($v,)+) = self.slots;
                let added = slot(next, &mut errors);
                Combined {
                    slots: ($($v,)+ added),
                    errors,
                }
            }
        }
    };
}

// Finishing operations for an accumulator of the given arity
macro_rules! impl_combined_finish {
    ($($T:ident $v:ident),+) => {
        impl<$($T,)+ E: Semigroup> Combined<($(Option<$T>,)+), E> {
            /// Collapse into a result of the full tuple or the accumulated error.
            pub fn into_result(self) -> Result<($($T,)+), E> {
                match (combine_all(self.errors), self.slots) {
                    (Some(error), _) => Err(error),
                    (None, ($(Some($v),)+)) => Ok(($($v,)+)),
                    (None, _) => unreachable!("an empty slot always records its error"),
                }
            }

            /// Continue with the full tuple when every slot succeeded.
            pub fn bind<U, F>(self, f: F) -> Result<U, E>
            where
                F: FnOnce(($($T,)+)) -> Result<U, E>,
            {
                self.into_result().and_then(f)
            }

            /// Transform the full tuple when every slot succeeded.
            pub fn map<U, F>(self, f: F) -> Result<U, E>
            where
                F: FnOnce(($($T,)+)) -> U,
            {
                self.into_result().map(f)
            }
        }
    };
}

impl_combine_next!(T1 v1, T2 v2 => T3);
impl_combine_next!(T1 v1, T2 v2, T3 v3 => T4);
impl_combine_next!(T1 v1, T2 v2, T3 v3, T4 v4 => T5);
impl_combine_next!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5 => T6);
impl_combine_next!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6 => T7);
impl_combine_next!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6, T7 v7 => T8);
impl_combine_next!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6, T7 v7, T8 v8 => T9);

impl_combined_finish!(T1 v1, T2 v2);
impl_combined_finish!(T1 v1, T2 v2, T3 v3);
impl_combined_finish!(T1 v1, T2 v2, T3 v3, T4 v4);
impl_combined_finish!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5);
impl_combined_finish!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6);
impl_combined_finish!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6, T7 v7);
impl_combined_finish!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6, T7 v7, T8 v8);
impl_combined_finish!(T1 v1, T2 v2, T3 v3, T4 v4, T5 v5, T6 v6, T7 v7, T8 v8, T9 v9);

//! Constructing and inspecting results
//!
//! The railway runs on `std::result::Result`: `Ok` is the success track and
//! `Err` the failure track. This module adds the constructors and the
//! fail-fast accessors used at the ends of a pipeline.
//!
//! # Examples
//!
//! ```
//! use railway::{success, failure, success_if, Access, Error};
//!
//! let ok = success::<_, Error>(7);
//! assert!(ok.is_success());
//! assert_eq!(*ok.value(), 7);
//!
//! let err = failure::<i32, _>(Error::not_found("gone"));
//! assert!(err.is_failure());
//! assert_eq!(err.error().detail(), "gone");
//!
//! let adult = success_if(21 >= 18, 21, Error::validation("too young"));
//! assert_eq!(adult, Ok(21));
//! ```

use crate::error::Error;

/// A railway result; the error defaults to the crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Misuse of a fail-fast accessor.
///
/// Reading the value of a failure (or the error of a success) is a
/// programming error rather than a domain condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAccess {
    /// `value` was read from a failure
    #[error("accessed value on a failure")]
    ValueOnFailure,
    /// `error` was read from a success
    #[error("accessed error on a success")]
    ErrorOnSuccess,
}

/// Put a value on the success track.
#[inline]
pub fn success<T, E>(value: T) -> Result<T, E> {
    Ok(value)
}

/// Put an error on the failure track.
#[inline]
pub fn failure<T, E>(error: E) -> Result<T, E> {
    Err(error)
}

/// `Ok(value)` when `condition` holds, `Err(error)` otherwise.
///
/// ```
/// use railway::{success_if, Error};
///
/// let r = success_if(false, "stock", Error::conflict("sold out"));
/// assert_eq!(r, Err(Error::conflict("sold out")));
/// ```
#[inline]
pub fn success_if<T, E>(condition: bool, value: T, error: E) -> Result<T, E> {
    if condition {
        Ok(value)
    } else {
        Err(error)
    }
}

/// Lazy form of [`success_if`]: only the selected side is built.
pub fn success_if_with<T, E, V, F>(condition: bool, value: V, error: F) -> Result<T, E>
where
    V: FnOnce() -> T,
    F: FnOnce() -> E,
{
    if condition {
        Ok(value())
    } else {
        Err(error())
    }
}

/// Variant tests and fail-fast accessors for results.
pub trait Access<T, E> {
    /// True on the success track
    fn is_success(&self) -> bool;

    /// True on the failure track
    fn is_failure(&self) -> bool;

    /// The success value.
    ///
    /// # Panics
    ///
    /// Panics with [`InvalidAccess::ValueOnFailure`] on a failure.
    fn value(&self) -> &T;

    /// The failure error.
    ///
    /// # Panics
    ///
    /// Panics with [`InvalidAccess::ErrorOnSuccess`] on a success.
    fn error(&self) -> &E;

    /// Non-panicking form of [`Access::value`]
    fn try_value(&self) -> std::result::Result<&T, InvalidAccess>;

    /// Non-panicking form of [`Access::error`]
    fn try_error(&self) -> std::result::Result<&E, InvalidAccess>;
}

impl<T, E> Access<T, E> for std::result::Result<T, E> {
    #[inline]
    fn is_success(&self) -> bool {
        self.is_ok()
    }

    #[inline]
    fn is_failure(&self) -> bool {
        self.is_err()
    }

    #[track_caller]
    fn value(&self) -> &T {
        match self {
            Ok(value) => value,
            Err(_) => panic!("{}", InvalidAccess::ValueOnFailure),
        }
    }

    #[track_caller]
    fn error(&self) -> &E {
        match self {
            Err(error) => error,
            Ok(_) => panic!("{}", InvalidAccess::ErrorOnSuccess),
        }
    }

    fn try_value(&self) -> std::result::Result<&T, InvalidAccess> {
        self.as_ref().map_err(|_| InvalidAccess::ValueOnFailure)
    }

    fn try_error(&self) -> std::result::Result<&E, InvalidAccess> {
        match self {
            Err(error) => Ok(error),
            Ok(_) => Err(InvalidAccess::ErrorOnSuccess),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(success::<_, Error>(1), Ok(1));
        assert_eq!(
            failure::<i32, _>(Error::domain("x")),
            Err(Error::domain("x"))
        );
    }

    #[test]
    fn test_success_if() {
        assert_eq!(success_if(true, 1, Error::domain("no")), Ok(1));
        assert_eq!(
            success_if(false, 1, Error::domain("no")),
            Err(Error::domain("no"))
        );
    }

    #[test]
    fn test_success_if_with_builds_only_selected_side() {
        let r: Result<i32> =
            success_if_with(true, || 5, || panic!("error must not be built"));
        assert_eq!(r, Ok(5));

        let r: Result<i32> =
            success_if_with(false, || panic!("value must not be built"), || Error::domain("no"));
        assert_eq!(r, Err(Error::domain("no")));
    }

    #[test]
    fn test_variant_tests() {
        let ok: Result<i32> = Ok(1);
        let err: Result<i32> = Err(Error::domain("x"));
        assert!(ok.is_success() && !ok.is_failure());
        assert!(err.is_failure() && !err.is_success());
    }

    #[test]
    fn test_accessors() {
        let ok: Result<i32> = Ok(1);
        let err: Result<i32> = Err(Error::domain("x"));
        assert_eq!(*ok.value(), 1);
        assert_eq!(err.error(), &Error::domain("x"));
    }

    #[test]
    #[should_panic(expected = "accessed value on a failure")]
    fn test_value_on_failure_panics() {
        let err: Result<i32> = Err(Error::domain("x"));
        let _ = err.value();
    }

    #[test]
    #[should_panic(expected = "accessed error on a success")]
    fn test_error_on_success_panics() {
        let ok: Result<i32> = Ok(1);
        let _ = ok.error();
    }

    #[test]
    fn test_try_accessors() {
        let ok: Result<i32> = Ok(1);
        let err: Result<i32> = Err(Error::domain("x"));
        assert_eq!(ok.try_value(), Ok(&1));
        assert_eq!(ok.try_error(), Err(InvalidAccess::ErrorOnSuccess));
        assert_eq!(err.try_value(), Err(InvalidAccess::ValueOnFailure));
        assert_eq!(err.try_error(), Ok(&Error::domain("x")));
    }

    #[test]
    fn test_structural_equality() {
        let a: Result<i32> = Ok(1);
        let b: Result<i32> = Ok(1);
        let c: Result<i32> = Err(Error::domain("1"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

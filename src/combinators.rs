//! Synchronous railway combinators
//!
//! [`ResultExt`] extends every `Result` with the two-track operations. All of
//! them follow the same rule: a failure entering a combinator leaves it
//! unchanged and the supplied function is never called. The only exceptions
//! are the failure-side operations (`tap_err`, `compensate*`) and the
//! terminal ones (`finally`, `fold`), which are the point of looking at the
//! failure track.
//!
//! `map` and `map_err` are `Result`'s own methods and already behave as the
//! railway `Map` and `MapOnFailure`. `and_then` is spelled `bind` here.
//!
//! # Examples
//!
//! ```
//! use railway::{Error, ResultExt};
//!
//! #[derive(Debug, PartialEq)]
//! struct Order { id: u32, total: u32 }
//!
//! fn find(id: u32) -> Result<Order, Error> {
//!     if id == 1 {
//!         Ok(Order { id, total: 250 })
//!     } else {
//!         Err(Error::not_found(format!("order {}", id)))
//!     }
//! }
//!
//! let mut audited = Vec::new();
//! let total = Ok::<_, Error>(1)
//!     .bind(find)
//!     .ensure(|o| o.total > 0, Error::domain("empty order"))
//!     .tap(|o| audited.push(o.id))
//!     .map(|o| o.total);
//!
//! assert_eq!(total, Ok(250));
//! assert_eq!(audited, vec![1]);
//! ```

/// Two-track combinators for `Result`.
pub trait ResultExt<T, E>: Sized {
    /// Continue with a fallible step on success.
    ///
    /// The step's result is returned directly, so results never nest.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let half = |x: i32| if x % 2 == 0 { Ok(x / 2) } else { Err(Error::validation("odd")) };
    /// assert_eq!(Ok(8).bind(half).bind(half), Ok(2));
    /// assert_eq!(Ok(6).bind(half).bind(half), Err(Error::validation("odd")));
    /// ```
    fn bind<U, F>(self, f: F) -> Result<U, E>
    where
        F: FnOnce(T) -> Result<U, E>;

    /// Fail with `error` unless `predicate` holds for the value.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let adult = Ok::<_, Error>(25).ensure(|age| *age >= 18, Error::validation("too young"));
    /// assert_eq!(adult, Ok(25));
    ///
    /// let minor = Ok::<_, Error>(15).ensure(|age| *age >= 18, Error::validation("too young"));
    /// assert_eq!(minor, Err(Error::validation("too young")));
    /// ```
    fn ensure<P, Er>(self, predicate: P, error: Er) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        Er: Into<E>;

    /// Like [`ResultExt::ensure`], building the error from the value.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let r = Ok(3).ensure_with(|n| *n > 5, |n| Error::validation(format!("{} is too small", n)));
    /// assert_eq!(r, Err(Error::validation("3 is too small")));
    /// ```
    fn ensure_with<P, F>(self, predicate: P, error: F) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(&T) -> E;

    /// Like [`ResultExt::ensure`] with a predicate that ignores the value.
    fn ensure_that<P, Er>(self, predicate: P, error: Er) -> Result<T, E>
    where
        P: FnOnce() -> bool,
        Er: Into<E>;

    /// Validate with a fallible check.
    ///
    /// A failing check replaces the value with its error; a passing check's
    /// own value is discarded and the original value continues.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let unique = |name: &&str| -> Result<usize, Error> {
    ///     if *name == "taken" { Err(Error::conflict("name taken")) } else { Ok(0) }
    /// };
    ///
    /// assert_eq!(Ok("fresh").ensure_result(unique), Ok("fresh"));
    /// assert_eq!(Ok("taken").ensure_result(unique), Err(Error::conflict("name taken")));
    /// ```
    fn ensure_result<U, F>(self, check: F) -> Result<T, E>
    where
        F: FnOnce(&T) -> Result<U, E>;

    /// Fail with `error` when `predicate` holds (inverse of `ensure`).
    fn ensure_not<P, Er>(self, predicate: P, error: Er) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        Er: Into<E>;

    /// Run a side effect on success and return the result unchanged.
    fn tap<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&T);

    /// Run a side effect on failure and return the result unchanged.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let mut logged = None;
    /// let r: Result<i32, Error> = Err(Error::transient("busy"))
    ///     .tap_err(|e| logged = Some(e.code().to_string()));
    ///
    /// assert_eq!(r, Err(Error::transient("busy")));
    /// assert_eq!(logged.as_deref(), Some("transient"));
    /// ```
    fn tap_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&E);

    /// Replace a failure with the outcome of a fallback.
    ///
    /// The fallback is never called on success.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let cached = Err(Error::service_unavailable("db down")).compensate(|| Ok("cached"));
    /// assert_eq!(cached, Ok("cached"));
    ///
    /// let fresh: Result<&str, Error> = Ok("fresh").compensate(|| panic!("not called"));
    /// assert_eq!(fresh, Ok("fresh"));
    /// ```
    fn compensate<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>;

    /// Replace a failure with a fallback that receives the error.
    fn compensate_with<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(E) -> Result<T, E>;

    /// Compensate only failures whose error matches `predicate`.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let retried = Err(Error::transient("timeout"))
    ///     .compensate_if(Error::is_retryable, |_| Ok(1));
    /// assert_eq!(retried, Ok(1));
    ///
    /// let kept: Result<i32, Error> = Err(Error::conflict("stale"))
    ///     .compensate_if(Error::is_retryable, |_| Ok(1));
    /// assert_eq!(kept, Err(Error::conflict("stale")));
    /// ```
    fn compensate_if<P, F>(self, predicate: P, f: F) -> Result<T, E>
    where
        P: FnOnce(&E) -> bool,
        F: FnOnce(E) -> Result<T, E>;

    /// Hand the whole result to `f` and return its output.
    fn finally<R, F>(self, f: F) -> R
    where
        F: FnOnce(Result<T, E>) -> R;

    /// Collapse both tracks, calling exactly one of the two functions.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let status = Err::<u32, _>(Error::not_found("x")).fold(|_| 200, |e| e.status_code());
    /// assert_eq!(status, 404);
    /// ```
    fn fold<R, FO, FE>(self, on_ok: FO, on_err: FE) -> R
    where
        FO: FnOnce(T) -> R,
        FE: FnOnce(E) -> R;

    /// Run a step that replaces the value, but only when `predicate` holds.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let apply_discount = |p: u32| Ok::<_, Error>(p * 9 / 10);
    /// assert_eq!(Ok(200).when(|p| *p >= 100, apply_discount), Ok(180));
    /// assert_eq!(Ok(50).when(|p| *p >= 100, apply_discount), Ok(50));
    /// ```
    fn when<P, F>(self, predicate: P, f: F) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Result<T, E>;

    /// Run a step that replaces the value, but only when `predicate` does not hold.
    fn unless<P, F>(self, predicate: P, f: F) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Result<T, E>;

    /// Bind while keeping the original value alongside the new one.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let r = Ok::<_, Error>("alice").bind_zip(|name| Ok(name.len()));
    /// assert_eq!(r, Ok(("alice", 5)));
    /// ```
    fn bind_zip<U, F>(self, f: F) -> Result<(T, U), E>
    where
        F: FnOnce(&T) -> Result<U, E>;

    /// Query-style bind: bind from the value, then project both into the output.
    ///
    /// `select` is `map` and `where` is `ensure`; this is the remaining
    /// query operator.
    ///
    /// ```
    /// use railway::{Error, ResultExt};
    ///
    /// let r = Ok::<_, Error>(3).select_many(|x| Ok(x * 10), |x, y| format!("{}-{}", x, y));
    /// assert_eq!(r, Ok("3-30".to_string()));
    /// ```
    fn select_many<U, V, F, P>(self, f: F, project: P) -> Result<V, E>
    where
        F: FnOnce(&T) -> Result<U, E>,
        P: FnOnce(T, U) -> V;

    /// Lift into an already-completed future to continue with async steps.
    ///
    /// ```
    /// use railway::{AsyncResultExt, Error, ResultExt};
    ///
    /// # tokio_test::block_on(async {
    /// let r = Ok::<_, Error>(2)
    ///     .into_async()
    ///     .bind_async(|x| async move { Ok(x + 1) })
    ///     .await;
    /// assert_eq!(r, Ok(3));
    /// # });
    /// ```
    fn into_async(self) -> futures::future::Ready<Result<T, E>>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    #[inline]
    fn bind<U, F>(self, f: F) -> Result<U, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        match self {
            Ok(value) => f(value),
            Err(error) => Err(error),
        }
    }

    #[inline]
    fn ensure<P, Er>(self, predicate: P, error: Er) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        Er: Into<E>,
    {
        self.ensure_with(predicate, |_| error.into())
    }

    fn ensure_with<P, F>(self, predicate: P, error: F) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(&T) -> E,
    {
        match self {
            Ok(value) if predicate(&value) => Ok(value),
            Ok(value) => Err(error(&value)),
            Err(e) => Err(e),
        }
    }

    #[inline]
    fn ensure_that<P, Er>(self, predicate: P, error: Er) -> Result<T, E>
    where
        P: FnOnce() -> bool,
        Er: Into<E>,
    {
        self.ensure(|_| predicate(), error)
    }

    fn ensure_result<U, F>(self, check: F) -> Result<T, E>
    where
        F: FnOnce(&T) -> Result<U, E>,
    {
        let value = self?;
        check(&value)?;
        Ok(value)
    }

    #[inline]
    fn ensure_not<P, Er>(self, predicate: P, error: Er) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        Er: Into<E>,
    {
        self.ensure(|value| !predicate(value), error)
    }

    #[inline]
    fn tap<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&T),
    {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }

    #[inline]
    fn tap_err<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(&E),
    {
        if let Err(error) = &self {
            f(error);
        }
        self
    }

    #[inline]
    fn compensate<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.compensate_with(|_| f())
    }

    #[inline]
    fn compensate_with<F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce(E) -> Result<T, E>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => f(error),
        }
    }

    fn compensate_if<P, F>(self, predicate: P, f: F) -> Result<T, E>
    where
        P: FnOnce(&E) -> bool,
        F: FnOnce(E) -> Result<T, E>,
    {
        match self {
            Err(error) if predicate(&error) => f(error),
            other => other,
        }
    }

    #[inline]
    fn finally<R, F>(self, f: F) -> R
    where
        F: FnOnce(Result<T, E>) -> R,
    {
        f(self)
    }

    #[inline]
    fn fold<R, FO, FE>(self, on_ok: FO, on_err: FE) -> R
    where
        FO: FnOnce(T) -> R,
        FE: FnOnce(E) -> R,
    {
        match self {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        }
    }

    fn when<P, F>(self, predicate: P, f: F) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Result<T, E>,
    {
        match self {
            Ok(value) if predicate(&value) => f(value),
            other => other,
        }
    }

    #[inline]
    fn unless<P, F>(self, predicate: P, f: F) -> Result<T, E>
    where
        P: FnOnce(&T) -> bool,
        F: FnOnce(T) -> Result<T, E>,
    {
        self.when(|value| !predicate(value), f)
    }

    fn bind_zip<U, F>(self, f: F) -> Result<(T, U), E>
    where
        F: FnOnce(&T) -> Result<U, E>,
    {
        let value = self?;
        let other = f(&value)?;
        Ok((value, other))
    }

    #[inline]
    fn select_many<U, V, F, P>(self, f: F, project: P) -> Result<V, E>
    where
        F: FnOnce(&T) -> Result<U, E>,
        P: FnOnce(T, U) -> V,
    {
        self.bind_zip(f).map(|(value, other)| project(value, other))
    }

    #[inline]
    fn into_async(self) -> futures::future::Ready<Result<T, E>> {
        futures::future::ready(self)
    }
}

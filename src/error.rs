//! The closed error taxonomy carried on the failure track
//!
//! Every failure in a pipeline is an [`Error`]: one of a fixed set of kinds
//! (validation, not-found, conflict, ...) plus the [`Error::Aggregate`] variant
//! that collects several errors produced by `combine`, `when_all` or
//! `traverse`.
//!
//! # Examples
//!
//! ```
//! use railway::{Error, ErrorKind, Semigroup};
//!
//! let missing = Error::not_found("user 42 does not exist").with_instance("req-7");
//! assert_eq!(missing.kind(), ErrorKind::NotFound);
//! assert_eq!(missing.code(), "not.found");
//! assert_eq!(missing.instance(), Some("req-7"));
//!
//! // Accumulating errors flattens into a single aggregate
//! let all = missing
//!     .combine(Error::validation_field("email", "must contain @"))
//!     .combine(Error::conflict("email already registered"));
//! assert_eq!(all.kind(), ErrorKind::Aggregate);
//! assert_eq!(all.errors().len(), 3);
//! ```

pub mod status;

use std::fmt;

/// Code reported by every aggregate error.
pub const AGGREGATE_CODE: &str = "aggregate";

/// Detail reported by every aggregate error.
pub const AGGREGATE_DETAIL: &str = "multiple errors occurred";

/// The fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Input failed a validation rule
    Validation,
    /// The requested resource does not exist
    NotFound,
    /// The operation conflicts with current state
    Conflict,
    /// The caller is not allowed to perform the operation
    Unauthorized,
    /// The request itself is malformed
    BadRequest,
    /// Something went wrong that the caller cannot act on
    Unexpected,
    /// A temporary failure; retrying may help
    Transient,
    /// A dependency is unavailable; retrying later may help
    ServiceUnavailable,
    /// A business rule was violated
    Domain,
    /// Several errors collected together
    Aggregate,
}

impl ErrorKind {
    /// The code used by errors of this kind unless overridden.
    pub fn default_code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not.found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::BadRequest => "bad.request",
            ErrorKind::Unexpected => "unexpected",
            ErrorKind::Transient => "transient",
            ErrorKind::ServiceUnavailable => "service.unavailable",
            ErrorKind::Domain => "domain",
            ErrorKind::Aggregate => AGGREGATE_CODE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_code())
    }
}

/// The payload shared by every non-aggregate error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorDetails {
    code: String,
    detail: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    instance: Option<String>,
}

impl ErrorDetails {
    fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        ErrorDetails {
            code: kind.default_code().to_string(),
            detail: detail.into(),
            instance: None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable description
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Optional correlation identifier
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)?;
        if let Some(instance) = &self.instance {
            write!(f, " (instance {})", instance)?;
        }
        Ok(())
    }
}

/// A failure on the railway.
///
/// The set of variants is closed. Match on it (or on [`Error::kind`]) to
/// decide how to react to a failure.
///
/// # Examples
///
/// ```
/// use railway::Error;
///
/// fn describe(error: &Error) -> &'static str {
///     match error {
///         Error::NotFound(_) => "404",
///         Error::Transient(_) | Error::ServiceUnavailable(_) => "try again",
///         Error::Aggregate { .. } => "several problems",
///         _ => "failed",
///     }
/// }
///
/// assert_eq!(describe(&Error::transient("timeout")), "try again");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Error {
    /// Input failed a validation rule, optionally naming the offending field
    #[error("{details}")]
    Validation {
        /// Code, detail and instance
        #[cfg_attr(feature = "serde", serde(flatten))]
        details: ErrorDetails,
        /// The field that failed validation
        #[cfg_attr(
            feature = "serde",
            serde(default, skip_serializing_if = "Option::is_none")
        )]
        field: Option<String>,
    },
    /// The requested resource does not exist
    #[error("{0}")]
    NotFound(ErrorDetails),
    /// The operation conflicts with current state
    #[error("{0}")]
    Conflict(ErrorDetails),
    /// The caller is not allowed to perform the operation
    #[error("{0}")]
    Unauthorized(ErrorDetails),
    /// The request itself is malformed
    #[error("{0}")]
    BadRequest(ErrorDetails),
    /// Something went wrong that the caller cannot act on
    #[error("{0}")]
    Unexpected(ErrorDetails),
    /// A temporary failure
    #[error("{0}")]
    Transient(ErrorDetails),
    /// A dependency is unavailable
    #[error("{0}")]
    ServiceUnavailable(ErrorDetails),
    /// A business rule was violated
    #[error("{0}")]
    Domain(ErrorDetails),
    /// Several errors, in the order they were collected
    #[error("{errors}")]
    Aggregate {
        /// The constituent errors
        #[source]
        errors: AggregateError,
    },
}

impl Error {
    /// Create a validation error
    pub fn validation(detail: impl Into<String>) -> Self {
        Error::Validation {
            details: ErrorDetails::new(ErrorKind::Validation, detail),
            field: None,
        }
    }

    /// Create a validation error for a named field
    ///
    /// ```
    /// use railway::Error;
    ///
    /// let err = Error::validation_field("age", "must be 18 or older");
    /// assert_eq!(err.field(), Some("age"));
    /// ```
    pub fn validation_field(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Validation {
            details: ErrorDetails::new(ErrorKind::Validation, detail),
            field: Some(field.into()),
        }
    }

    /// Create a not-found error
    pub fn not_found(detail: impl Into<String>) -> Self {
        Error::NotFound(ErrorDetails::new(ErrorKind::NotFound, detail))
    }

    /// Create a conflict error
    pub fn conflict(detail: impl Into<String>) -> Self {
        Error::Conflict(ErrorDetails::new(ErrorKind::Conflict, detail))
    }

    /// Create an unauthorized error
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Error::Unauthorized(ErrorDetails::new(ErrorKind::Unauthorized, detail))
    }

    /// Create a bad-request error
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Error::BadRequest(ErrorDetails::new(ErrorKind::BadRequest, detail))
    }

    /// Create an unexpected error
    pub fn unexpected(detail: impl Into<String>) -> Self {
        Error::Unexpected(ErrorDetails::new(ErrorKind::Unexpected, detail))
    }

    /// Create a transient error
    pub fn transient(detail: impl Into<String>) -> Self {
        Error::Transient(ErrorDetails::new(ErrorKind::Transient, detail))
    }

    /// Create a service-unavailable error
    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Error::ServiceUnavailable(ErrorDetails::new(ErrorKind::ServiceUnavailable, detail))
    }

    /// Create a domain error
    pub fn domain(detail: impl Into<String>) -> Self {
        Error::Domain(ErrorDetails::new(ErrorKind::Domain, detail))
    }

    /// Collect errors into one, flattening nested aggregates.
    ///
    /// Returns `None` for an empty input and the error itself when only one
    /// error is given. An aggregate always holds at least two errors.
    ///
    /// ```
    /// use railway::Error;
    ///
    /// assert_eq!(Error::aggregate(Vec::new()), None);
    ///
    /// let single = Error::aggregate(vec![Error::conflict("taken")]);
    /// assert_eq!(single, Some(Error::conflict("taken")));
    ///
    /// let nested = Error::aggregate(vec![Error::not_found("a"), Error::not_found("b")]);
    /// let flat = Error::aggregate(nested.into_iter().chain([Error::domain("c")]));
    /// assert_eq!(flat.map(|e| e.errors().len()), Some(3));
    /// ```
    pub fn aggregate<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = Error>,
    {
        let mut flat: Vec<Error> = errors.into_iter().flat_map(Error::into_errors).collect();
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Error::Aggregate {
                errors: AggregateError { errors: flat },
            }),
        }
    }

    /// Replace the machine-readable code. Aggregates keep their fixed code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        if let Some(details) = self.details_mut() {
            details.code = code.into();
        }
        self
    }

    /// Attach a correlation identifier. Aggregates carry none of their own.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        if let Some(details) = self.details_mut() {
            details.instance = Some(instance.into());
        }
        self
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::Unexpected(_) => ErrorKind::Unexpected,
            Error::Transient(_) => ErrorKind::Transient,
            Error::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Error::Domain(_) => ErrorKind::Domain,
            Error::Aggregate { .. } => ErrorKind::Aggregate,
        }
    }

    /// The shared payload, absent for aggregates
    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            Error::Validation { details, .. }
            | Error::NotFound(details)
            | Error::Conflict(details)
            | Error::Unauthorized(details)
            | Error::BadRequest(details)
            | Error::Unexpected(details)
            | Error::Transient(details)
            | Error::ServiceUnavailable(details)
            | Error::Domain(details) => Some(details),
            Error::Aggregate { .. } => None,
        }
    }

    fn details_mut(&mut self) -> Option<&mut ErrorDetails> {
        match self {
            Error::Validation { details, .. }
            | Error::NotFound(details)
            | Error::Conflict(details)
            | Error::Unauthorized(details)
            | Error::BadRequest(details)
            | Error::Unexpected(details)
            | Error::Transient(details)
            | Error::ServiceUnavailable(details)
            | Error::Domain(details) => Some(details),
            Error::Aggregate { .. } => None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &str {
        self.details().map_or(AGGREGATE_CODE, ErrorDetails::code)
    }

    /// Human-readable description
    pub fn detail(&self) -> &str {
        self.details().map_or(AGGREGATE_DETAIL, ErrorDetails::detail)
    }

    /// Correlation identifier, if one was attached
    pub fn instance(&self) -> Option<&str> {
        self.details().and_then(ErrorDetails::instance)
    }

    /// The offending field of a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// The constituent errors: all of them for an aggregate, `self` otherwise.
    pub fn errors(&self) -> &[Error] {
        match self {
            Error::Aggregate { errors } => &errors.errors,
            other => std::slice::from_ref(other),
        }
    }

    /// Consume into the constituent errors
    pub fn into_errors(self) -> Vec<Error> {
        match self {
            Error::Aggregate { errors } => errors.errors,
            other => vec![other],
        }
    }

    /// Whether retrying the failed operation may succeed.
    ///
    /// An aggregate is retryable only when every constituent is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transient(_) | Error::ServiceUnavailable(_) => true,
            Error::Aggregate { errors } => errors.iter().all(Error::is_retryable),
            _ => false,
        }
    }
}

/// An ordered, flat collection of at least two errors.
///
/// Only obtainable through [`Error::aggregate`], by accumulating errors
/// with [`Semigroup::combine`](crate::Semigroup::combine), or through the
/// checked `TryFrom<Vec<Error>>` conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} errors: {}", .errors.len(), join(.errors))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Error>", into = "Vec<Error>")
)]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    /// Number of constituent errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether there are no constituent errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the constituent errors in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Consume into the constituent errors
    pub fn into_inner(self) -> Vec<Error> {
        self.errors
    }

    pub(crate) fn from_parts(errors: Vec<Error>) -> Self {
        AggregateError { errors }
    }
}

/// Rejected attempt to build an aggregate from fewer than two errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("an aggregate needs at least two errors, got {0}")]
pub struct TooFewErrors(pub usize);

impl TryFrom<Vec<Error>> for AggregateError {
    type Error = TooFewErrors;

    /// Flattens nested aggregates, then requires at least two errors.
    fn try_from(errors: Vec<Error>) -> Result<Self, Self::Error> {
        let errors: Vec<Error> = errors.into_iter().flat_map(Error::into_errors).collect();
        if errors.len() < 2 {
            return Err(TooFewErrors(errors.len()));
        }
        Ok(AggregateError { errors })
    }
}

impl From<AggregateError> for Vec<Error> {
    fn from(aggregate: AggregateError) -> Self {
        aggregate.errors
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for AggregateError {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

fn join(errors: &[Error]) -> String {
    errors
        .iter()
        .map(Error::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

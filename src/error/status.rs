//! Mapping between transport status codes and the error taxonomy.
//!
//! Transport adapters (HTTP clients, gRPC gateways, ...) own their parsing;
//! this module only decides which failure a status code stands for.

use super::{Error, ErrorKind};

impl Error {
    /// Map an HTTP-style status code to a failure.
    ///
    /// Returns `None` for informational, success and redirect statuses.
    ///
    /// ```
    /// use railway::{Error, ErrorKind};
    ///
    /// assert_eq!(Error::from_status(200, "ok"), None);
    /// assert_eq!(
    ///     Error::from_status(404, "no such order").map(|e| e.kind()),
    ///     Some(ErrorKind::NotFound)
    /// );
    /// assert_eq!(
    ///     Error::from_status(503, "maintenance").map(|e| e.kind()),
    ///     Some(ErrorKind::ServiceUnavailable)
    /// );
    /// ```
    pub fn from_status(status: u16, detail: impl Into<String>) -> Option<Error> {
        let error = match status {
            0..=399 => return None,
            401 | 403 => Error::unauthorized(detail),
            404 => Error::not_found(detail),
            409 => Error::conflict(detail),
            422 => Error::validation(detail),
            408 | 429 => Error::transient(detail),
            400..=499 => Error::bad_request(detail),
            502 | 504 => Error::transient(detail),
            503 => Error::service_unavailable(detail),
            _ => Error::unexpected(detail),
        };
        Some(error)
    }

    /// The status code a transport adapter should report for this error.
    ///
    /// Aggregates report the status of their first constituent.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 422,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Unauthorized => 401,
            ErrorKind::BadRequest => 400,
            ErrorKind::Unexpected => 500,
            ErrorKind::Transient => 429,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::Domain => 400,
            ErrorKind::Aggregate => self
                .errors()
                .first()
                .map_or(500, Error::status_code),
        }
    }
}

/// Succeed with `()` for a non-error status, fail with the mapped error otherwise.
///
/// Adapters chain the payload parsing after it:
///
/// ```
/// use railway::error::status::check_status;
/// use railway::ResultExt;
///
/// let body = r#"42"#;
/// let parsed = check_status(200, "fetching answer")
///     .bind(|()| body.parse::<i32>().map_err(|e| railway::Error::unexpected(e.to_string())));
/// assert_eq!(parsed, Ok(42));
///
/// let missing = check_status(404, "fetching answer")
///     .bind(|()| -> Result<i32, railway::Error> { panic!("never parsed") });
/// assert!(missing.is_err());
/// ```
pub fn check_status(status: u16, detail: impl Into<String>) -> Result<(), Error> {
    match Error::from_status(status, detail) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

/// The result a transport adapter returns for `status`: `value` on a
/// non-error status, the mapped failure otherwise.
pub fn status_to_result<T>(status: u16, value: T, detail: impl Into<String>) -> Result<T, Error> {
    check_status(status, detail).map(|()| value)
}

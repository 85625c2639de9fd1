//! # Railway
//!
//! Railway-oriented result combinators for Rust.
//!
//! A fallible step either stays on the success track (`Ok`) or switches to the
//! failure track (`Err`). This crate adds the combinators that let a pipeline
//! of such steps compose without manual branching:
//!
//! - **Sequencing** with [`ResultExt`]: `bind`, `ensure`, `tap`, `compensate`,
//!   `finally`, ... A failure short-circuits every later success-side step.
//! - **Accumulation** with [`CombineExt`]: independent results are combined and
//!   every failure is kept, folded through [`Semigroup`].
//! - **Async** with [`AsyncResultExt`]: the same vocabulary on futures of
//!   results, plus [`CancellationToken`]-aware steps.
//! - **Fan-out** with [`parallel()`] and [`when_all()`]: await independent async
//!   steps concurrently, then fold their outcomes.
//! - **Boundaries** with [`attempt()`]: turn panics and foreign errors into
//!   failures of the closed [`Error`] taxonomy.
//!
//! ## Quick Example
//!
//! ```rust
//! use railway::{CombineExt, Error, ResultExt};
//!
//! fn validate_email(email: &str) -> Result<String, Error> {
//!     if email.contains('@') {
//!         Ok(email.to_string())
//!     } else {
//!         Err(Error::validation_field("email", "must contain @"))
//!     }
//! }
//!
//! fn validate_age(age: i32) -> Result<i32, Error> {
//!     Ok(age).ensure(|age| *age >= 18, Error::validation_field("age", "must be 18 or older"))
//! }
//!
//! // Collect all errors at once
//! let result = validate_email("user@example.com")
//!     .combine(validate_age(25))
//!     .bind(|(email, age)| Ok(format!("{} is {} years old", email, age)));
//! assert_eq!(result, Ok("user@example.com is 25 years old".to_string()));
//!
//! let result = validate_email("nope").combine(validate_age(12)).into_result();
//! assert_eq!(result.unwrap_err().errors().len(), 2);
//! ```
//!
//! ## Features
//!
//! - `tracing`: step spans and failure events through [`telemetry`]
//! - `serde`: `Serialize`/`Deserialize` for the error model

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod attempt;
pub mod cancel;
pub mod combinators;
pub mod combine;
pub mod error;
pub mod future;
pub mod parallel;
pub mod result;
pub mod semigroup;
#[cfg(feature = "tracing")]
pub mod telemetry;
pub mod traverse;

// Re-exports
pub use attempt::{attempt, attempt_async, from_fallible, Fault};
pub use cancel::{Cancellation, CancellationToken, Cancelled};
pub use combinators::ResultExt;
pub use combine::{CombineExt, Combined};
pub use error::status::{check_status, status_to_result};
pub use error::{AggregateError, Error, ErrorDetails, ErrorKind, TooFewErrors};
pub use future::AsyncResultExt;
pub use parallel::{par_all, parallel, when_all, Parallel, WhenAll};
pub use result::{failure, success, success_if, success_if_with, Access, InvalidAccess, Result};
pub use semigroup::Semigroup;
#[cfg(feature = "tracing")]
pub use telemetry::{AsyncTraceExt, Telemetry, TraceExt};
pub use traverse::{sequence, traverse};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::attempt::{attempt, attempt_async};
    pub use crate::cancel::{Cancellation, CancellationToken, Cancelled};
    pub use crate::combinators::ResultExt;
    pub use crate::combine::CombineExt;
    pub use crate::error::{Error, ErrorKind};
    pub use crate::future::AsyncResultExt;
    pub use crate::parallel::{parallel, when_all, Parallel, WhenAll};
    pub use crate::result::{failure, success, success_if, Access};
    pub use crate::semigroup::Semigroup;
    #[cfg(feature = "tracing")]
    pub use crate::telemetry::{AsyncTraceExt, Telemetry, TraceExt};
}

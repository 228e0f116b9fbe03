//! Foundation utilities shared across Ledgerline client crates.
//!
//! This crate carries the pieces of the client that have no transport
//! dependency of their own:
//!
//! - [`error`]: the uniform error shape every failure is normalized into,
//!   plus the reporter that fans errors out to the bounded log, listeners,
//!   the user notification channel and telemetry.
//! - [`retry`]: exponential-backoff retry for operations that fail with a
//!   [`error::NormalizedError`].
//! - [`transform`]: bidirectional structural conversion between the wire
//!   representation (snake_case, formatted dates) and the application
//!   representation (camelCase, canonical timestamps).
//! - [`time`]: a clock abstraction so expiry logic is deterministic under
//!   test.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod error;
pub mod retry;
pub mod time;
pub mod transform;

// Re-export commonly used types for convenience
pub use error::{
    ErrorCode, ErrorContext, ErrorReporter, ErrorShape, NormalizedError, Notifier, TelemetrySink,
    ERROR_LOG_CAPACITY,
};
pub use retry::with_retry;
pub use time::{Clock, MockClock, SystemClock};
pub use transform::{from_wire, to_wire, DateFormat, Resource, TransformProfile};

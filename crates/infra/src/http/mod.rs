//! Authenticated HTTP transport.
//!
//! [`ApiClient`] wraps the underlying HTTP client with the authentication
//! lifecycle: bearer injection, response interception, single-flight token
//! refresh, and the forced-logout side effect. Navigation on forced logout
//! goes through the injected [`Navigator`] so tests can observe it.

mod client;

use ledgerline_common::error::NormalizedError;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_TOKEN_LIFETIME_SECS};

/// Client-side navigation boundary.
///
/// Forced logout performs a hard navigation to the login route; the
/// client only depends on this capability, not on any UI shell.
pub trait Navigator: Send + Sync {
    /// Navigate the user to the login route.
    fn redirect_to_login(&self);
}

/// Navigator that goes nowhere (headless and test usage).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}

/// Map a transport failure onto the normalized taxonomy.
///
/// Failures before the request exists are setup errors; everything else
/// (connect failures, timeouts, aborted transfers) means the request was
/// sent and no response came back.
pub(crate) fn normalize_transport(err: reqwest::Error) -> NormalizedError {
    if err.is_builder() {
        NormalizedError::request_setup(err.to_string())
    } else {
        NormalizedError::network(err.to_string())
    }
}

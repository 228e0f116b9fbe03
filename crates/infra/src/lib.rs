//! Transport and credential infrastructure for the Ledgerline client.
//!
//! This crate owns everything that touches the outside world:
//!
//! - [`auth`]: credential storage (platform credential store or in-memory)
//!   and the token store with its expiry buffer.
//! - [`http`]: the authenticated HTTP client — bearer injection,
//!   single-flight token refresh, forced logout, and the
//!   login/logout/register primitives.
//! - [`config`]: environment-driven client configuration.
//! - [`testing`]: recording test doubles for the injected boundaries.
//!
//! Nothing in here is a global: the composition root builds an
//! [`http::ApiClient`] from explicitly constructed parts so tests can
//! substitute any boundary.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod config;
pub mod http;
pub mod testing;

pub use auth::{CredentialVault, Credentials, KeyringVault, MemoryVault, TokenStore};
pub use config::{ApiConfig, ConfigError};
pub use http::{ApiClient, ApiClientBuilder, Navigator, NoopNavigator};

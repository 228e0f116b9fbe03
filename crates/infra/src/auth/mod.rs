//! Credential lifecycle: storage, caching and expiry.
//!
//! Three pieces cooperate here:
//!
//! - [`Credentials`]: the access/refresh token pair with its absolute
//!   expiry instant.
//! - [`CredentialVault`]: durable key-value storage behind the tokens —
//!   the platform credential store in production ([`KeyringVault`]),
//!   process memory in tests and ephemeral sessions ([`MemoryVault`]).
//! - [`TokenStore`]: the in-memory authoritative view. It hydrates lazily
//!   from the vault, replaces all three fields atomically, applies the
//!   expiry safety buffer, and treats persistence as best-effort.

mod credentials;
mod store;
mod vault;

pub use credentials::Credentials;
pub use store::{TokenStore, EXPIRY_BUFFER_MS};
pub use vault::{
    CredentialVault, KeyringVault, MemoryVault, VaultError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
    TOKEN_EXPIRY_KEY,
};

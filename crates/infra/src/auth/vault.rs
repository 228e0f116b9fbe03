//! Durable credential storage.
//!
//! Tokens survive process restarts through a key-value vault with three
//! fixed keys. Production uses the platform credential store (macOS
//! Keychain, Windows Credential Manager, Linux Secret Service) via the
//! `keyring` crate; tests and ephemeral sessions use [`MemoryVault`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Vault key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "auth.access";
/// Vault key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "auth.refresh";
/// Vault key for the absolute expiry (string-encoded epoch milliseconds).
pub const TOKEN_EXPIRY_KEY: &str = "auth.expiry";

/// Vault operation failure.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The storage backend rejected the operation.
    #[error("credential vault error: {0}")]
    Backend(String),
}

/// Durable key-value storage for credentials.
///
/// Implementations must treat missing keys as `Ok(None)` on read and as a
/// no-op on delete; the token store relies on both for idempotent clears.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    /// Read a stored secret, `None` when absent.
    async fn get_secret(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Store a secret, replacing any previous value.
    async fn set_secret(&self, key: &str, value: &str) -> Result<(), VaultError>;

    /// Remove a secret. Removing an absent key is not an error.
    async fn delete_secret(&self, key: &str) -> Result<(), VaultError>;
}

/// Platform credential store vault.
///
/// Each secret is one keyring entry under the configured service name, so
/// tokens are protected by the operating system's credential storage.
#[derive(Debug, Clone)]
pub struct KeyringVault {
    service: String,
}

impl KeyringVault {
    /// Vault scoped to the given keyring service name.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, VaultError> {
        keyring::Entry::new(&self.service, key)
            .map_err(|err| VaultError::Backend(err.to_string()))
    }
}

#[async_trait]
impl CredentialVault for KeyringVault {
    async fn get_secret(&self, key: &str) -> Result<Option<String>, VaultError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(VaultError::Backend(err.to_string())),
        }
    }

    async fn set_secret(&self, key: &str, value: &str) -> Result<(), VaultError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| VaultError::Backend(err.to_string()))
    }

    async fn delete_secret(&self, key: &str) -> Result<(), VaultError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(VaultError::Backend(err.to_string())),
        }
    }
}

/// In-memory vault for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryVault {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    /// Empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialVault for MemoryVault {
    async fn get_secret(&self, key: &str) -> Result<Option<String>, VaultError> {
        let secrets = self
            .secrets
            .lock()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        Ok(secrets.get(key).cloned())
    }

    async fn set_secret(&self, key: &str, value: &str) -> Result<(), VaultError> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        let _ = secrets.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_secret(&self, key: &str) -> Result<(), VaultError> {
        let mut secrets = self
            .secrets
            .lock()
            .map_err(|_| VaultError::Backend("vault lock poisoned".into()))?;
        let _ = secrets.remove(key);
        Ok(())
    }
}

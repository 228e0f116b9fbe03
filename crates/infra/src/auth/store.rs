//! In-memory token store over a durable vault.

use std::sync::Arc;

use ledgerline_common::time::Clock;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::credentials::Credentials;
use super::vault::{CredentialVault, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRY_KEY};

/// Safety buffer applied ahead of the real expiry: a token is treated as
/// expired one minute early so requests already in flight when it lapses
/// do not race the backend.
pub const EXPIRY_BUFFER_MS: i64 = 60_000;

enum CacheState {
    /// The vault has not been consulted yet this process.
    Unloaded,
    /// Authoritative in-memory view; `None` means logged out.
    Loaded(Option<Credentials>),
}

/// Authoritative credential cache.
///
/// The in-memory copy wins once loaded; the vault is only read on first
/// access per process. All three fields (access, refresh, expiry) are
/// replaced together under one write lock, so readers never observe a
/// half-updated credential set. Vault writes are best-effort: a failing
/// backend degrades durability, never the session.
pub struct TokenStore {
    vault: Arc<dyn CredentialVault>,
    clock: Arc<dyn Clock>,
    cache: RwLock<CacheState>,
}

impl TokenStore {
    /// Store over the given vault and clock.
    #[must_use]
    pub fn new(vault: Arc<dyn CredentialVault>, clock: Arc<dyn Clock>) -> Self {
        Self { vault, clock, cache: RwLock::new(CacheState::Unloaded) }
    }

    /// Replace the credential set.
    ///
    /// The absolute expiry is computed from `expires_in_secs`; the
    /// replacement is atomic from any reader's point of view.
    pub async fn set_tokens(&self, access: &str, refresh: &str, expires_in_secs: i64) {
        let expires_at_ms = self.clock.now_ms() + expires_in_secs * 1000;
        let credentials = Credentials::new(access, refresh, expires_at_ms);

        *self.cache.write().await = CacheState::Loaded(Some(credentials));
        debug!(expires_at_ms, "credentials replaced");

        self.persist(access, refresh, expires_at_ms).await;
    }

    /// Current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.credentials().await.map(|c| c.access_token)
    }

    /// Current refresh token, if any.
    pub async fn refresh_token(&self) -> Option<String> {
        self.credentials().await.map(|c| c.refresh_token)
    }

    /// Snapshot of the current credential set, hydrating from the vault on
    /// first access.
    pub async fn credentials(&self) -> Option<Credentials> {
        {
            let cache = self.cache.read().await;
            if let CacheState::Loaded(credentials) = &*cache {
                return credentials.clone();
            }
        }
        self.hydrate().await
    }

    /// Whether the access token should be treated as expired.
    ///
    /// True when no credentials or no expiry are recorded, or when "now"
    /// is inside the one-minute buffer ahead of the real expiry.
    pub async fn is_expired(&self) -> bool {
        match self.credentials().await {
            None => true,
            Some(credentials) if credentials.expires_at_ms == 0 => true,
            Some(credentials) => {
                self.clock.now_ms() >= credentials.expires_at_ms - EXPIRY_BUFFER_MS
            }
        }
    }

    /// Seconds until the recorded expiry, negative once past it.
    pub async fn seconds_until_expiry(&self) -> Option<i64> {
        let credentials = self.credentials().await?;
        if credentials.expires_at_ms == 0 {
            return None;
        }
        Some((credentials.expires_at_ms - self.clock.now_ms()) / 1000)
    }

    /// Drop the credential set everywhere. Idempotent.
    pub async fn clear(&self) {
        *self.cache.write().await = CacheState::Loaded(None);

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRY_KEY] {
            if let Err(err) = self.vault.delete_secret(key).await {
                warn!(key, error = %err, "failed to remove credential from vault");
            }
        }
        debug!("credentials cleared");
    }

    async fn hydrate(&self) -> Option<Credentials> {
        let mut cache = self.cache.write().await;
        // Another task may have hydrated while we waited for the lock.
        if let CacheState::Loaded(credentials) = &*cache {
            return credentials.clone();
        }

        let loaded = self.load_from_vault().await;
        *cache = CacheState::Loaded(loaded.clone());
        loaded
    }

    async fn load_from_vault(&self) -> Option<Credentials> {
        let access = match self.vault.get_secret(ACCESS_TOKEN_KEY).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "credential vault read failed");
                None
            }
        }?;
        let refresh = self
            .vault
            .get_secret(REFRESH_TOKEN_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        let expires_at_ms = self
            .vault
            .get_secret(TOKEN_EXPIRY_KEY)
            .await
            .ok()
            .flatten()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);

        debug!("credentials hydrated from vault");
        Some(Credentials::new(access, refresh, expires_at_ms))
    }

    async fn persist(&self, access: &str, refresh: &str, expires_at_ms: i64) {
        let writes = [
            (ACCESS_TOKEN_KEY, access.to_string()),
            (REFRESH_TOKEN_KEY, refresh.to_string()),
            (TOKEN_EXPIRY_KEY, expires_at_ms.to_string()),
        ];
        for (key, value) in writes {
            if let Err(err) = self.vault.set_secret(key, &value).await {
                warn!(key, error = %err, "failed to persist credential to vault");
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ledgerline_common::time::MockClock;

    use super::*;
    use crate::auth::MemoryVault;

    fn store_at(now_ms: i64) -> (TokenStore, Arc<MockClock>, Arc<MemoryVault>) {
        let clock = Arc::new(MockClock::new(now_ms));
        let vault = Arc::new(MemoryVault::new());
        let store = TokenStore::new(vault.clone(), clock.clone());
        (store, clock, vault)
    }

    #[tokio::test]
    async fn replacement_is_atomic_and_immediately_visible() {
        let (store, _clock, _vault) = store_at(1_000_000);

        store.set_tokens("acc-1", "ref-1", 3600).await;

        assert_eq!(store.access_token().await.as_deref(), Some("acc-1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("ref-1"));
        assert!(!store.is_expired().await);
    }

    #[tokio::test]
    async fn expiry_buffer_fires_one_minute_early() {
        let (store, clock, _vault) = store_at(0);
        store.set_tokens("acc", "ref", 3600).await;
        let expiry_ms = 3600 * 1000;

        // Two minutes ahead of expiry: still valid.
        clock.set(expiry_ms - 120_000);
        assert!(!store.is_expired().await);

        // Thirty seconds ahead of expiry: inside the buffer, expired.
        clock.set(expiry_ms - 30_000);
        assert!(store.is_expired().await);
    }

    #[tokio::test]
    async fn missing_credentials_count_as_expired() {
        let (store, _clock, _vault) = store_at(0);
        assert!(store.is_expired().await);
    }

    #[tokio::test]
    async fn tokens_hydrate_lazily_from_the_vault() {
        let clock = Arc::new(MockClock::new(0));
        let vault = Arc::new(MemoryVault::new());
        vault.set_secret(ACCESS_TOKEN_KEY, "stored-acc").await.unwrap();
        vault.set_secret(REFRESH_TOKEN_KEY, "stored-ref").await.unwrap();
        vault.set_secret(TOKEN_EXPIRY_KEY, "7200000").await.unwrap();

        let store = TokenStore::new(vault, clock);

        assert_eq!(store.access_token().await.as_deref(), Some("stored-acc"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("stored-ref"));
        assert!(!store.is_expired().await);
        assert_eq!(store.seconds_until_expiry().await, Some(7200));
    }

    #[tokio::test]
    async fn clear_is_idempotent_and_durable() {
        let (store, _clock, vault) = store_at(0);
        store.set_tokens("acc", "ref", 3600).await;

        store.clear().await;
        store.clear().await;

        assert_eq!(store.access_token().await, None);
        assert_eq!(vault.get_secret(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(vault.get_secret(TOKEN_EXPIRY_KEY).await.unwrap(), None);
        assert!(store.is_expired().await);
    }

    #[tokio::test]
    async fn set_tokens_persists_all_three_keys() {
        let (store, _clock, vault) = store_at(500);
        store.set_tokens("acc", "ref", 10).await;

        assert_eq!(vault.get_secret(ACCESS_TOKEN_KEY).await.unwrap().as_deref(), Some("acc"));
        assert_eq!(vault.get_secret(REFRESH_TOKEN_KEY).await.unwrap().as_deref(), Some("ref"));
        assert_eq!(
            vault.get_secret(TOKEN_EXPIRY_KEY).await.unwrap().as_deref(),
            Some("10500")
        );
    }
}

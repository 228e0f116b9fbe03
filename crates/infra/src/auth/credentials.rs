//! The access/refresh token pair.

use serde::{Deserialize, Serialize};

/// Bearer credentials for API authentication.
///
/// Created on successful login or refresh, replaced atomically by the
/// token store, destroyed on logout or unrecoverable auth failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived access token sent as the bearer credential.
    pub access_token: String,
    /// Longer-lived token exchanged for new access tokens.
    pub refresh_token: String,
    /// Absolute expiry of the access token, epoch milliseconds. Zero means
    /// no expiry was recorded.
    pub expires_at_ms: i64,
}

impl Credentials {
    /// Assemble a credential set.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at_ms: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at_ms,
        }
    }

    /// `Authorization` header value for this credential set.
    #[must_use]
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_header_uses_the_bearer_scheme() {
        let credentials = Credentials::new("tok-123", "ref-456", 0);
        assert_eq!(credentials.auth_header(), "Bearer tok-123");
    }
}

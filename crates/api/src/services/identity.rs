//! Authentication and user profile endpoints.

use std::sync::Arc;

use ledgerline_common::error::{ErrorReporter, NormalizedError};
use ledgerline_common::transform::{from_wire, to_wire, Resource};
use ledgerline_infra::ApiClient;
use serde_json::Value;

use super::{get_shaped, tag};

/// Login, registration and profile access.
#[derive(Debug)]
pub struct IdentityService {
    client: Arc<ApiClient>,
    reporter: Arc<ErrorReporter>,
}

impl IdentityService {
    const NAME: &'static str = "identity";

    pub(crate) fn new(client: Arc<ApiClient>, reporter: Arc<ErrorReporter>) -> Self {
        Self { client, reporter }
    }

    /// Authenticate and persist the session tokens.
    ///
    /// # Errors
    /// Normalized failure when the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, NormalizedError> {
        match self.client.login(email, password).await {
            Ok(user) => Ok(from_wire(user, Resource::User.profile())),
            Err(error) => Err(tag(&self.reporter, Self::NAME, "POST", "auth/login", error)),
        }
    }

    /// Create an account from an application-shaped profile.
    ///
    /// # Errors
    /// Normalized failure when registration is rejected.
    pub async fn register(&self, profile: Value) -> Result<Value, NormalizedError> {
        let body = to_wire(profile, Resource::User.profile());
        match self.client.register(&body).await {
            Ok(response) => Ok(from_wire(response, Resource::User.profile())),
            Err(error) => Err(tag(&self.reporter, Self::NAME, "POST", "auth/register", error)),
        }
    }

    /// End the session (best-effort server call, unconditional clear).
    pub async fn logout(&self) {
        self.client.logout().await;
    }

    /// Whether a usable session exists.
    pub async fn is_authenticated(&self) -> bool {
        self.client.is_authenticated().await
    }

    /// The authenticated user's profile.
    ///
    /// # Errors
    /// Normalized transport or backend failure.
    pub async fn current_user(&self) -> Result<Value, NormalizedError> {
        get_shaped(
            &self.client,
            &self.reporter,
            Self::NAME,
            "auth/me",
            Some(Resource::User.profile()),
        )
        .await
    }
}

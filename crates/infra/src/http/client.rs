//! The API client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ledgerline_common::error::NormalizedError;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{normalize_transport, Navigator, NoopNavigator};
use crate::auth::TokenStore;
use crate::config::{ApiConfig, ConfigError};

const AUTH_LOGIN_PATH: &str = "auth/login";
const AUTH_REFRESH_PATH: &str = "auth/refresh";
const AUTH_LOGOUT_PATH: &str = "auth/logout";
const AUTH_REGISTER_PATH: &str = "auth/register";

/// Assumed access-token lifetime when the backend omits `expires_in`.
/// This is a guessed fallback, not a backend contract; its use is logged.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Single-flight guard for token refresh.
///
/// Callers record the generation before taking the lock; a changed
/// generation afterwards means another caller already completed a refresh
/// and its outcome should be reused instead of issuing a second network
/// call. The generation only advances on success.
#[derive(Debug, Default)]
struct RefreshGate {
    lock: Mutex<()>,
    generation: AtomicU64,
}

/// Outcome of intercepting a response, before any retry decision.
enum Disposition {
    /// Success; hand the response to the caller.
    Success(Response),
    /// 401; eligible for one refresh-and-replay cycle.
    Unauthorized,
    /// 403; the session is over, no retry.
    Denied(NormalizedError),
    /// Any other error status; normalized and propagated.
    Failed(NormalizedError),
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access: String,
    refresh: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    access: String,
    refresh: String,
    #[serde(default)]
    user: Value,
    expires_in: Option<i64>,
}

/// Authenticated HTTP client for the Ledgerline backend.
///
/// All verb methods resolve paths against the configured endpoint root,
/// attach the bearer token when a non-expired one exists, and run the
/// response through the auth interception state machine. Successful
/// payloads are returned wire-shaped; transformation belongs to the
/// service layer.
pub struct ApiClient {
    http: reqwest::Client,
    endpoint_root: Url,
    tokens: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    refresh_gate: RefreshGate,
}

impl ApiClient {
    /// Start building a client.
    #[must_use]
    pub fn builder(config: ApiConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// The token store this client authenticates with.
    #[must_use]
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// GET a resource.
    ///
    /// # Errors
    /// Normalized transport, auth or backend failure.
    #[instrument(skip(self))]
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, NormalizedError> {
        self.execute(Method::GET, path, None).await
    }

    /// POST a payload.
    ///
    /// # Errors
    /// Normalized transport, auth or backend failure.
    #[instrument(skip(self, body))]
    pub async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<R, NormalizedError> {
        self.execute(Method::POST, path, Some(body.clone())).await
    }

    /// PUT a payload.
    ///
    /// # Errors
    /// Normalized transport, auth or backend failure.
    #[instrument(skip(self, body))]
    pub async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<R, NormalizedError> {
        self.execute(Method::PUT, path, Some(body.clone())).await
    }

    /// PATCH a payload.
    ///
    /// # Errors
    /// Normalized transport, auth or backend failure.
    #[instrument(skip(self, body))]
    pub async fn patch<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<R, NormalizedError> {
        self.execute(Method::PATCH, path, Some(body.clone())).await
    }

    /// DELETE a resource.
    ///
    /// # Errors
    /// Normalized transport, auth or backend failure.
    #[instrument(skip(self))]
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, NormalizedError> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Authenticate with email and password.
    ///
    /// On success the returned tokens are persisted and the backend's
    /// `user` payload is returned to the caller.
    ///
    /// # Errors
    /// Normalized failure when the backend rejects the credentials or the
    /// call does not complete.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, NormalizedError> {
        let url = self.endpoint_url(AUTH_LOGIN_PATH)?;
        let body = json!({ "email": email, "password": password });
        let response = self.send(Method::POST, &url, Some(&body), None).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let session: SessionPayload = decode(response).await?;
        let expires_in = session.expires_in.unwrap_or_else(|| {
            warn!("login response omitted expires_in; assuming a one-hour token lifetime");
            DEFAULT_TOKEN_LIFETIME_SECS
        });
        self.tokens.set_tokens(&session.access, &session.refresh, expires_in).await;
        info!("login succeeded");
        Ok(session.user)
    }

    /// Create an account.
    ///
    /// Deployments that log the new user straight in return tokens from
    /// this endpoint; when present they are persisted like a login.
    ///
    /// # Errors
    /// Normalized failure when registration is rejected.
    #[instrument(skip(self, profile))]
    pub async fn register(&self, profile: &Value) -> Result<Value, NormalizedError> {
        let url = self.endpoint_url(AUTH_REGISTER_PATH)?;
        let response = self.send(Method::POST, &url, Some(profile), None).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: Value = decode(response).await?;
        let tokens = (
            body.get("access").and_then(Value::as_str),
            body.get("refresh").and_then(Value::as_str),
        );
        if let (Some(access), Some(refresh)) = tokens {
            let expires_in = body.get("expires_in").and_then(Value::as_i64).unwrap_or_else(|| {
                warn!("register response omitted expires_in; assuming a one-hour token lifetime");
                DEFAULT_TOKEN_LIFETIME_SECS
            });
            self.tokens.set_tokens(access, refresh, expires_in).await;
        }
        Ok(body)
    }

    /// End the session.
    ///
    /// The logout endpoint is called best-effort; tokens are cleared
    /// unconditionally even when the call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Ok(url) = self.endpoint_url(AUTH_LOGOUT_PATH) {
            let bearer = self.tokens.access_token().await;
            match self.send(Method::POST, &url, None, bearer.as_deref()).await {
                Ok(response) if !response.status().is_success() => {
                    debug!(status = %response.status(), "logout endpoint rejected the call");
                }
                Err(error) => {
                    debug!(error = %error, "logout endpoint unreachable");
                }
                Ok(_) => {}
            }
        }
        self.tokens.clear().await;
        info!("session cleared");
    }

    /// Whether a non-expired access token is available.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.access_token().await.is_some() && !self.tokens.is_expired().await
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<R, NormalizedError> {
        let url = self.endpoint_url(path)?;
        let bearer = self.current_bearer().await;
        let response = self.send(method.clone(), &url, body.as_ref(), bearer.as_deref()).await?;

        match self.intercept(response).await {
            Disposition::Success(response) => decode(response).await,
            Disposition::Unauthorized => {
                debug!(%url, "unauthorized; refreshing access token");
                let token = self.refresh_access_token().await?;
                let replay = self.send(method, &url, body.as_ref(), Some(&token)).await?;
                if replay.status().is_success() {
                    decode(replay).await
                } else {
                    // One refresh cycle per request; a second 401 propagates.
                    Err(error_from_response(replay).await)
                }
            }
            Disposition::Denied(error) => {
                warn!(%url, "access denied; ending session");
                self.force_logout().await;
                Err(error)
            }
            Disposition::Failed(error) => Err(error),
        }
    }

    async fn intercept(&self, response: Response) -> Disposition {
        let status = response.status();
        if status.is_success() {
            return Disposition::Success(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Disposition::Unauthorized;
        }
        let error = error_from_response(response).await;
        if status == StatusCode::FORBIDDEN {
            Disposition::Denied(error)
        } else {
            Disposition::Failed(error)
        }
    }

    /// Exchange the refresh token for new credentials, single-flight.
    ///
    /// Concurrent callers serialize on the gate; whoever waited behind a
    /// successful refresh reuses its token instead of issuing another
    /// network call.
    async fn refresh_access_token(&self) -> Result<String, NormalizedError> {
        let seen = self.refresh_gate.generation.load(Ordering::Acquire);
        let _guard = self.refresh_gate.lock.lock().await;
        if self.refresh_gate.generation.load(Ordering::Acquire) != seen {
            if let Some(token) = self.tokens.access_token().await {
                debug!("reusing token from a concurrent refresh");
                return Ok(token);
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token().await else {
            warn!("no refresh token available; ending session");
            self.force_logout().await;
            return Err(NormalizedError::from_response(401, None, None));
        };

        match self.request_new_tokens(&refresh_token).await {
            Ok(payload) => {
                let expires_in = payload.expires_in.unwrap_or_else(|| {
                    warn!("token endpoint omitted expires_in; assuming a one-hour lifetime");
                    DEFAULT_TOKEN_LIFETIME_SECS
                });
                self.tokens.set_tokens(&payload.access, &payload.refresh, expires_in).await;
                self.refresh_gate.generation.fetch_add(1, Ordering::AcqRel);
                info!("access token refreshed");
                Ok(payload.access)
            }
            Err(error) => {
                warn!(status = error.status, "token refresh failed; ending session");
                self.force_logout().await;
                Err(error)
            }
        }
    }

    async fn request_new_tokens(
        &self,
        refresh_token: &str,
    ) -> Result<TokenPayload, NormalizedError> {
        let url = self.endpoint_url(AUTH_REFRESH_PATH)?;
        let body = json!({ "refresh": refresh_token });
        let response = self.send(Method::POST, &url, Some(&body), None).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        decode(response).await
    }

    async fn force_logout(&self) {
        self.tokens.clear().await;
        self.navigator.redirect_to_login();
    }

    async fn current_bearer(&self) -> Option<String> {
        if self.tokens.is_expired().await {
            None
        } else {
            self.tokens.access_token().await
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Response, NormalizedError> {
        let mut request = self.http.request(method, url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(normalize_transport)
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, NormalizedError> {
        self.endpoint_root
            .join(path.trim_start_matches('/'))
            .map_err(|err| NormalizedError::request_setup(err.to_string()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint_root", &self.endpoint_root.as_str())
            .finish_non_exhaustive()
    }
}

async fn error_from_response(response: Response) -> NormalizedError {
    let status = response.status().as_u16();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response.json::<Value>().await.ok();
    NormalizedError::from_response(status, body.as_ref(), request_id)
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, NormalizedError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
        // These statuses carry no body; only types deserializable from
        // null fit.
        return serde_json::from_value(Value::Null).map_err(|_| {
            NormalizedError::internal_message(format!(
                "no-content response ({status}) cannot populate the requested type"
            ))
        });
    }
    response
        .json::<R>()
        .await
        .map_err(|err| NormalizedError::internal_message(format!("failed to parse response body: {err}")))
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ApiConfig,
    tokens: Option<Arc<TokenStore>>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClientBuilder {
    /// Builder seeded with the given configuration.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self { config, tokens: None, navigator: Arc::new(NoopNavigator) }
    }

    /// Token store the client authenticates with. Required.
    #[must_use]
    pub fn token_store(mut self, tokens: Arc<TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Navigation boundary used on forced logout.
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when the endpoint root cannot be derived,
    /// the HTTP client cannot be constructed, or no token store was set.
    pub fn build(self) -> Result<ApiClient, ConfigError> {
        let endpoint_root = self.config.endpoint_root()?;
        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|err| ConfigError::Invalid {
                field: "http",
                message: err.to_string(),
            })?;
        let tokens = self.tokens.ok_or(ConfigError::Invalid {
            field: "token_store",
            message: "a token store is required".to_string(),
        })?;

        Ok(ApiClient {
            http,
            endpoint_root,
            tokens,
            navigator: self.navigator,
            refresh_gate: RefreshGate::default(),
        })
    }
}

impl std::fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! Client configuration.
//!
//! The backend location is resolved from the environment at process start:
//!
//! - `LEDGERLINE_API_URL`: base URL of the backend (default
//!   `https://api.ledgerline.io`)
//! - `LEDGERLINE_API_VERSION`: version segment of the endpoint prefix
//!   (default `v1`)
//! - `LEDGERLINE_HTTP_TIMEOUT_SECS`: per-request timeout (default `10`)
//!
//! A `.env` file is honored when present.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.ledgerline.io";
/// Default API version segment.
pub const DEFAULT_API_VERSION: &str = "v1";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed or validated.
    #[error("invalid configuration for {field}: {message}")]
    Invalid {
        /// Offending setting.
        field: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { field, message: message.into() }
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend base URL (scheme + host, no API prefix).
    pub base_url: Url,
    /// Version segment of the endpoint prefix.
    pub api_version: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration pointing at the given base URL with defaults for
    /// everything else.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ConfigError::invalid("base_url", err.to_string()))?;
        Ok(Self {
            base_url,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Resolve configuration from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a variable is present but
    /// malformed. Absent variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url =
            std::env::var("LEDGERLINE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(version) = std::env::var("LEDGERLINE_API_VERSION") {
            if version.is_empty() || version.contains('/') {
                return Err(ConfigError::invalid(
                    "api_version",
                    format!("not a valid path segment: {version:?}"),
                ));
            }
            config.api_version = version;
        }

        if let Ok(timeout) = std::env::var("LEDGERLINE_HTTP_TIMEOUT_SECS") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|err| ConfigError::invalid("timeout", format!("{err}")))?;
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(config)
    }

    /// Root URL every endpoint path is joined against
    /// (`{base_url}/api/{version}/`).
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the base URL cannot carry a
    /// path (e.g. `mailto:` style URLs).
    pub fn endpoint_root(&self) -> Result<Url, ConfigError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/{}/", self.api_version))
            .map_err(|err| ConfigError::invalid("base_url", err.to_string()))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            // The default constant is known-good; parsing cannot fail.
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!()),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

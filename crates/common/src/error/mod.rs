//! Error normalization for the Ledgerline API client.
//!
//! Failures reach the client in many shapes: HTTP error responses with or
//! without a JSON body, connection failures where nothing came back at all,
//! requests that could not even be built, serialization errors, and stray
//! values produced by integration glue. All of them are converted into the
//! single [`NormalizedError`] shape before application code sees them, so
//! callers match on one structure instead of a zoo of error types.
//!
//! Two invariants hold for every normalized error:
//!
//! - `status` is always present; `0` is the sentinel for "no transport
//!   response" (network failure, request never sent).
//! - `code` is always a non-empty machine-readable token from the
//!   [`ErrorCode`] taxonomy.
//!
//! Construction here is side-effect free. The observable side effects of
//! normalization (bounded log, listener fan-out, user notification,
//! telemetry) live in [`reporter::ErrorReporter`].

pub mod reporter;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use reporter::{ErrorContext, ErrorReporter, Notifier, TelemetrySink, ERROR_LOG_CAPACITY};

/// Machine-readable error codes.
///
/// The closed set mirrors the backend's status taxonomy; `Other` carries
/// backend-supplied codes that are not part of the fixed set so they are
/// never silently rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// 400 responses.
    BadRequest,
    /// 401 responses.
    Unauthorized,
    /// 403 responses.
    Forbidden,
    /// 404 responses.
    NotFound,
    /// 409 responses.
    Conflict,
    /// 422 responses.
    ValidationError,
    /// 429 responses.
    RateLimited,
    /// 500 responses.
    InternalServerError,
    /// 502 responses.
    BadGateway,
    /// 503 responses.
    ServiceUnavailable,
    /// 504 responses.
    GatewayTimeout,
    /// The request was sent but no response came back.
    NetworkError,
    /// The request could not be built or sent at all.
    RequestError,
    /// A client-side exception was raised while handling the call.
    InternalError,
    /// Catch-all for string failures and unrecognized statuses.
    UnknownError,
    /// Catch-all for values that are not errors at all.
    UnexpectedError,
    /// Backend-supplied code outside the fixed set.
    Other(String),
}

impl ErrorCode {
    /// The wire token for this code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::BadGateway => "BAD_GATEWAY",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
            Self::NetworkError => "NETWORK_ERROR",
            Self::RequestError => "REQUEST_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::Other(code) => code.as_str(),
        }
    }

    /// Default code for an HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::ValidationError,
            429 => Self::RateLimited,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => Self::UnknownError,
        }
    }

    /// Parse a backend-supplied code token, preserving unknown tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "BAD_REQUEST" => Self::BadRequest,
            "UNAUTHORIZED" => Self::Unauthorized,
            "FORBIDDEN" => Self::Forbidden,
            "NOT_FOUND" => Self::NotFound,
            "CONFLICT" => Self::Conflict,
            "VALIDATION_ERROR" => Self::ValidationError,
            "RATE_LIMITED" => Self::RateLimited,
            "INTERNAL_SERVER_ERROR" => Self::InternalServerError,
            "BAD_GATEWAY" => Self::BadGateway,
            "SERVICE_UNAVAILABLE" => Self::ServiceUnavailable,
            "GATEWAY_TIMEOUT" => Self::GatewayTimeout,
            "NETWORK_ERROR" => Self::NetworkError,
            "REQUEST_ERROR" => Self::RequestError,
            "INTERNAL_ERROR" => Self::InternalError,
            "UNKNOWN_ERROR" => Self::UnknownError,
            "UNEXPECTED_ERROR" => Self::UnexpectedError,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Default human-readable message for an HTTP status.
#[must_use]
pub fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request. Please verify the submitted data.",
        401 => "Authentication required. Please log in again.",
        403 => "Access denied. You do not have permission to perform this action.",
        404 => "Resource not found.",
        409 => "Conflict detected. The resource was modified by someone else.",
        422 => "Validation failed. Please check your input.",
        429 => "Too many requests. Please slow down and try again.",
        500 => "Internal server error. Please try again later.",
        502 => "Bad gateway. The server is temporarily unreachable.",
        503 => "Service unavailable. Please try again shortly.",
        504 => "Gateway timeout. The server took too long to respond.",
        _ => "An unexpected error occurred. Please try again.",
    }
}

const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";
const REQUEST_ERROR_MESSAGE: &str = "The request could not be sent. Please try again.";

/// Per-field validation messages attached to 400/422 responses.
pub type ValidationMap = BTreeMap<String, Vec<String>>;

/// The uniform error shape all failures are converted into.
///
/// Immutable once constructed; cloning is cheap enough for the bounded log
/// and listener fan-out.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct NormalizedError {
    /// Human-readable message, suitable for direct display.
    pub message: String,
    /// HTTP status, or `0` when no transport response was received.
    pub status: u16,
    /// Machine-readable code token.
    pub code: ErrorCode,
    /// Backend-supplied detail payload or preserved raw failure value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// When the error was normalized.
    pub timestamp: DateTime<Utc>,
    /// Correlation id extracted from the response, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Single offending field, when the backend names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Field-level validation messages, when the backend supplies them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationMap>,
}

impl NormalizedError {
    fn base(status: u16, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            code,
            details: None,
            timestamp: Utc::now(),
            request_id: None,
            field: None,
            validation: None,
        }
    }

    /// Normalize an HTTP error response.
    ///
    /// Message, code, detail payload, offending field and validation map are
    /// taken from the body when present; otherwise the fixed status table
    /// supplies the defaults. A 400 carrying a `validation` map has its
    /// message overridden so field errors are surfaced as such.
    #[must_use]
    pub fn from_response(status: u16, body: Option<&Value>, request_id: Option<String>) -> Self {
        let mut error = Self::base(status, ErrorCode::from_status(status), default_message(status));
        error.request_id = request_id;

        let Some(Value::Object(map)) = body else {
            return error;
        };

        if let Some(message) = map
            .get("message")
            .or_else(|| map.get("detail"))
            .and_then(Value::as_str)
        {
            error.message = message.to_string();
        }
        if let Some(code) = map.get("code").and_then(Value::as_str) {
            error.code = ErrorCode::from_token(code);
        }
        if let Some(field) = map.get("field").and_then(Value::as_str) {
            error.field = Some(field.to_string());
        }
        if let Some(validation) = map.get("validation") {
            if let Ok(parsed) = serde_json::from_value::<ValidationMap>(validation.clone()) {
                if status == 400 {
                    error.message = "Validation failed".to_string();
                }
                error.validation = Some(parsed);
            }
        }
        error.details = map
            .get("details")
            .cloned()
            .or_else(|| Some(Value::Object(map.clone())));

        error
    }

    /// The request was sent but no response came back.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        let mut error = Self::base(0, ErrorCode::NetworkError, NETWORK_ERROR_MESSAGE);
        error.details = Some(Value::String(detail.into()));
        error
    }

    /// The request could not be built or sent at all.
    #[must_use]
    pub fn request_setup(detail: impl Into<String>) -> Self {
        let mut error = Self::base(0, ErrorCode::RequestError, REQUEST_ERROR_MESSAGE);
        error.details = Some(Value::String(detail.into()));
        error
    }

    /// A client-side exception surfaced while handling the call.
    #[must_use]
    pub fn internal(source: &(dyn std::error::Error + 'static)) -> Self {
        let mut error = Self::base(500, ErrorCode::InternalError, source.to_string());
        error.details = Some(serde_json::json!({ "trace": format!("{source:?}") }));
        error
    }

    /// Same as [`internal`](Self::internal) for failures that only exist as
    /// a message.
    #[must_use]
    pub fn internal_message(message: impl Into<String>) -> Self {
        Self::base(500, ErrorCode::InternalError, message)
    }

    /// A bare string was raised as an error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::base(500, ErrorCode::UnknownError, message)
    }

    /// Best-effort normalization of an ad-hoc payload.
    ///
    /// Objects have `message`/`status`/`code` extracted when present; any
    /// other value is preserved verbatim in `details`.
    #[must_use]
    pub fn from_payload(payload: Value) -> Self {
        let Value::Object(map) = &payload else {
            let mut error = Self::base(
                500,
                ErrorCode::UnexpectedError,
                "An unexpected error occurred. Please try again.",
            );
            error.details = Some(payload);
            return error;
        };

        let message = map.get("message").and_then(Value::as_str);
        let status = map
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|status| u16::try_from(status).ok());
        let code = map.get("code").and_then(Value::as_str);

        if message.is_none() && status.is_none() && code.is_none() {
            let mut error = Self::base(
                500,
                ErrorCode::UnknownError,
                "An unexpected error occurred. Please try again.",
            );
            error.details = Some(payload);
            return error;
        }

        let status = status.unwrap_or(500);
        let code = code.map_or(ErrorCode::UnknownError, ErrorCode::from_token);
        let message = message.map_or_else(|| default_message(status).to_string(), str::to_string);
        Self::base(status, code, message)
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Client errors other than rate limiting are permanent; everything
    /// else (no response, rate limiting, server errors) is worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !(400..=499).contains(&self.status) || self.status == 429
    }
}

/// The heterogeneous failure inputs normalization dispatches over.
#[derive(Debug)]
pub enum ErrorShape {
    /// A transport response with an error status.
    Response {
        /// HTTP status of the response.
        status: u16,
        /// Parsed JSON body, when one was present.
        body: Option<Value>,
        /// Correlation id from the response headers.
        request_id: Option<String>,
    },
    /// The request went out but nothing came back.
    NoResponse {
        /// Underlying transport detail, preserved for diagnostics.
        detail: String,
    },
    /// The request could not be constructed or dispatched.
    NotSent {
        /// Underlying setup failure detail.
        detail: String,
    },
    /// An error that was already normalized; passes through unchanged.
    Normalized(NormalizedError),
    /// A native error raised by client-side code.
    Exception(Box<dyn std::error::Error + Send + Sync>),
    /// A bare string raised as an error.
    Message(String),
    /// Anything else: ad-hoc objects, numbers, null.
    Payload(Value),
}

impl ErrorShape {
    /// Convert this failure into the uniform error shape.
    #[must_use]
    pub fn normalize(self) -> NormalizedError {
        match self {
            Self::Response { status, body, request_id } => {
                NormalizedError::from_response(status, body.as_ref(), request_id)
            }
            Self::NoResponse { detail } => NormalizedError::network(detail),
            Self::NotSent { detail } => NormalizedError::request_setup(detail),
            Self::Normalized(error) => error,
            Self::Exception(source) => NormalizedError::internal(source.as_ref()),
            Self::Message(message) => NormalizedError::unknown(message),
            Self::Payload(payload) => NormalizedError::from_payload(payload),
        }
    }
}

impl From<NormalizedError> for ErrorShape {
    fn from(error: NormalizedError) -> Self {
        Self::Normalized(error)
    }
}

impl From<String> for ErrorShape {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for ErrorShape {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<Value> for ErrorShape {
    fn from(payload: Value) -> Self {
        Self::Payload(payload)
    }
}

impl From<serde_json::Error> for ErrorShape {
    fn from(source: serde_json::Error) -> Self {
        Self::Exception(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_table_covers_the_taxonomy() {
        assert_eq!(ErrorCode::from_status(400), ErrorCode::BadRequest);
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_status(403), ErrorCode::Forbidden);
        assert_eq!(ErrorCode::from_status(404), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_status(409), ErrorCode::Conflict);
        assert_eq!(ErrorCode::from_status(422), ErrorCode::ValidationError);
        assert_eq!(ErrorCode::from_status(429), ErrorCode::RateLimited);
        assert_eq!(ErrorCode::from_status(500), ErrorCode::InternalServerError);
        assert_eq!(ErrorCode::from_status(502), ErrorCode::BadGateway);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::ServiceUnavailable);
        assert_eq!(ErrorCode::from_status(504), ErrorCode::GatewayTimeout);
        assert_eq!(ErrorCode::from_status(418), ErrorCode::UnknownError);
    }

    #[test]
    fn bodyless_422_uses_the_fixed_table_entry() {
        let error = NormalizedError::from_response(422, None, None);
        assert_eq!(error.message, "Validation failed. Please check your input.");
        assert_eq!(error.code, ErrorCode::ValidationError);
        assert_eq!(error.status, 422);
    }

    #[test]
    fn body_fields_override_defaults() {
        let body = json!({
            "message": "Invoice 42 is locked",
            "code": "INVOICE_LOCKED",
            "field": "invoiceId",
        });
        let error = NormalizedError::from_response(409, Some(&body), Some("req-9".into()));

        assert_eq!(error.message, "Invoice 42 is locked");
        assert_eq!(error.code, ErrorCode::Other("INVOICE_LOCKED".into()));
        assert_eq!(error.field.as_deref(), Some("invoiceId"));
        assert_eq!(error.request_id.as_deref(), Some("req-9"));
    }

    #[test]
    fn validation_map_on_400_overrides_message() {
        let body = json!({
            "validation": {
                "email": ["must be a valid address"],
                "vatNumber": ["required", "must match country format"],
            }
        });
        let error = NormalizedError::from_response(400, Some(&body), None);

        assert_eq!(error.message, "Validation failed");
        let validation = error.validation.unwrap();
        assert_eq!(validation["vatNumber"].len(), 2);
    }

    #[test]
    fn network_failures_use_the_zero_status_sentinel() {
        let error = NormalizedError::network("connection refused");
        assert_eq!(error.status, 0);
        assert_eq!(error.code, ErrorCode::NetworkError);

        let error = NormalizedError::request_setup("invalid header value");
        assert_eq!(error.status, 0);
        assert_eq!(error.code, ErrorCode::RequestError);
    }

    #[test]
    fn normalized_errors_pass_through_unchanged() {
        let original = NormalizedError::from_response(404, None, Some("req-1".into()));
        let shape = ErrorShape::from(original.clone());
        let roundtripped = shape.normalize();

        assert_eq!(roundtripped.message, original.message);
        assert_eq!(roundtripped.status, original.status);
        assert_eq!(roundtripped.code, original.code);
        assert_eq!(roundtripped.request_id, original.request_id);
        assert_eq!(roundtripped.timestamp, original.timestamp);
    }

    #[test]
    fn string_failures_become_unknown_errors() {
        let error = ErrorShape::from("ledger sync desynced").normalize();
        assert_eq!(error.message, "ledger sync desynced");
        assert_eq!(error.status, 500);
        assert_eq!(error.code, ErrorCode::UnknownError);
    }

    #[test]
    fn exceptions_become_internal_errors_with_trace() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let error = ErrorShape::from(source).normalize();

        assert_eq!(error.status, 500);
        assert_eq!(error.code, ErrorCode::InternalError);
        assert!(error.details.is_some());
    }

    #[test]
    fn adhoc_objects_are_extracted_best_effort() {
        let error = NormalizedError::from_payload(json!({
            "message": "quota exhausted",
            "status": 429,
            "code": "RATE_LIMITED",
        }));
        assert_eq!(error.message, "quota exhausted");
        assert_eq!(error.status, 429);
        assert_eq!(error.code, ErrorCode::RateLimited);

        let opaque = NormalizedError::from_payload(json!({ "weird": true }));
        assert_eq!(opaque.status, 500);
        assert_eq!(opaque.code, ErrorCode::UnknownError);
        assert_eq!(opaque.details, Some(json!({ "weird": true })));
    }

    #[test]
    fn non_object_payloads_are_preserved_in_details() {
        let error = NormalizedError::from_payload(json!(17));
        assert_eq!(error.status, 500);
        assert_eq!(error.code, ErrorCode::UnexpectedError);
        assert_eq!(error.details, Some(json!(17)));

        let error = NormalizedError::from_payload(Value::Null);
        assert_eq!(error.code, ErrorCode::UnexpectedError);
    }

    #[test]
    fn retry_eligibility_follows_the_status_class() {
        assert!(NormalizedError::network("timeout").is_retryable());
        assert!(NormalizedError::from_response(429, None, None).is_retryable());
        assert!(NormalizedError::from_response(500, None, None).is_retryable());
        assert!(NormalizedError::from_response(503, None, None).is_retryable());

        assert!(!NormalizedError::from_response(404, None, None).is_retryable());
        assert!(!NormalizedError::from_response(400, None, None).is_retryable());
        assert!(!NormalizedError::from_response(403, None, None).is_retryable());
    }

    #[test]
    fn serializes_with_string_code_and_timestamp() {
        let error = NormalizedError::from_response(404, None, None);
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["status"], 404);
        assert!(json["timestamp"].is_string());
    }
}

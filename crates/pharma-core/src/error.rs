//! Error taxonomy shared by the session manager and the backend client.

use serde_json::Value;

/// Typed failure of a session or backend operation.
///
/// Every variant renders a non-empty, human-readable message suitable for
/// direct display.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Bad credentials or an identity provider error.
    #[error("{0}")]
    AuthenticationFailed(String),
    /// The backend answered 401. The session has already been cleared.
    #[error("Session expired - Please login again")]
    SessionExpired,
    /// The backend answered 403. The session is still valid.
    #[error("Forbidden - You don't have permission to access this resource")]
    Forbidden,
    /// Any other non-success status.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },
    /// No response was obtained.
    #[error("Network error: {0}")]
    NetworkFailure(String),
    /// A success response whose body does not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The request body could not be serialized.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The persisted session could not be written.
    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Builds a `RequestFailed` from a status and the raw error body.
    ///
    /// Uses the `message` field of a JSON body when present, otherwise
    /// falls back to `API Error: <status>`.
    pub fn request_failed(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|msg| !msg.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("API Error: {status}"));
        Self::RequestFailed { status, message }
    }

    /// Stable snake_case label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::AuthenticationFailed(_) => "authentication_failed",
            ApiError::SessionExpired => "session_expired",
            ApiError::Forbidden => "forbidden",
            ApiError::RequestFailed { .. } => "request_failed",
            ApiError::NetworkFailure(_) => "network_failure",
            ApiError::InvalidResponse(_) => "invalid_response",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Storage(_) => "storage",
        }
    }

    /// HTTP status associated with this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Converts a transport-level reqwest failure into `NetworkFailure`.
pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::NetworkFailure(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::NetworkFailure(format!("Connection failed: {e}"))
    } else if e.is_request() {
        ApiError::NetworkFailure(format!("Request error: {e}"))
    } else {
        ApiError::NetworkFailure(format!("{e}"))
    }
}

/// Result type for session and backend operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

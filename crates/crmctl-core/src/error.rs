// ── Core error types ──
//
// User-facing errors from crmctl-core. Transport details (reqwest errors,
// raw bodies) are flattened into strings here so the type is `Clone`:
// a single failed fetch is handed to every caller awaiting it.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Unknown resource: {name}")]
    UnknownResource { name: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// Form-layer rule failures. Raised before any request is sent.
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationErrors),

    /// Server-side validation rejected the payload.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// The action is hidden or disabled for this record.
    #[error("Operation not allowed: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session storage error: {message}")]
    Session { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The `{status, message}` pair surfaced to whoever triggered a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub status: Option<u16>,
    pub message: String,
}

impl CoreError {
    /// HTTP status behind this error, when it came from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::ValidationFailed { .. } => Some(422),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// The structured failure for notifications.
    pub fn failure(&self) -> Failure {
        let message = match self {
            Self::AuthenticationFailed { message }
            | Self::NotFound { message }
            | Self::ValidationFailed { message }
            | Self::Rejected { message }
            | Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Failure {
            status: self.status(),
            message,
        }
    }

    /// Whether this error invalidates the current session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    pub(crate) fn decode(err: &serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<crmctl_api::Error> for CoreError {
    fn from(err: crmctl_api::Error) -> Self {
        match err {
            crmctl_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            crmctl_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            crmctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            crmctl_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Base URL cannot carry API paths: {url}"),
            },
            crmctl_api::Error::ClientBuild(reason) => CoreError::Config {
                message: format!("HTTP client setup failed: {reason}"),
            },
            crmctl_api::Error::NotFound { message } => CoreError::NotFound { message },
            crmctl_api::Error::Validation { message } => CoreError::ValidationFailed { message },
            crmctl_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            crmctl_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}

// ── Core error types ──
//
// User-facing errors from plexly-core. Consumers never see reqwest errors
// or XML parser failures directly. The `From<plexly_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants, and
// that translated value is what `Node::load()` forwards.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Tree model errors ────────────────────────────────────────────
    /// No variant registered for an element's type name.
    #[error("No handler for node type: {type_name}")]
    UnregisteredNodeType { type_name: String },

    /// `key()` was called on a node that has no `key` attribute.
    #[error("{type_name} node has no key and cannot be addressed")]
    MissingKey { type_name: String },

    #[error("Index {index} out of range for collection of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Section not found: {name}")]
    SectionNotFound { name: String },

    #[error("Server not found: {name}")]
    ServerNotFound { name: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Not signed in -- call sign_in() or provide a token first")]
    NotSignedIn,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for errors that originate in the fetch layer rather
    /// than in the shape of the tree itself.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::NotSignedIn
                | Self::AuthenticationFailed { .. }
                | Self::ConnectionFailed { .. }
                | Self::Timeout { .. }
                | Self::Api { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<plexly_api::Error> for CoreError {
    fn from(err: plexly_api::Error) -> Self {
        match err {
            plexly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            plexly_api::Error::NotSignedIn => CoreError::NotSignedIn,
            plexly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
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
            plexly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            plexly_api::Error::InvalidHeader { name, reason } => CoreError::Config {
                message: format!("Invalid header {name}: {reason}"),
            },
            plexly_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            plexly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            plexly_api::Error::Proxy(msg) => CoreError::Config {
                message: format!("Proxy error: {msg}"),
            },
            err @ plexly_api::Error::Api { status, .. } => CoreError::Api {
                message: err.to_string(),
                status: Some(status),
            },
            plexly_api::Error::Xml { message, .. } => CoreError::Api {
                message: format!("Malformed response: {message}"),
                status: None,
            },
        }
    }
}

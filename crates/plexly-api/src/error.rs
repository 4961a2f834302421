use thiserror::Error;

/// Top-level error type for the `plexly-api` crate.
///
/// Covers every failure mode of talking to plex.tv or a media server:
/// authentication, transport, HTTP status, and XML payload problems.
/// `plexly-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in rejected or token refused (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An account-scoped call was made before signing in.
    #[error("No authentication token -- sign in to plex.tv first")]
    NotSignedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value could not be encoded.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Proxy URL rejected by the HTTP client.
    #[error("Proxy error: {0}")]
    Proxy(String),

    // ── Server responses ────────────────────────────────────────────
    /// Non-success HTTP status other than 401.
    #[error("Error code {status} received from server{}", format_detail(.message.as_deref()))]
    Api { status: u16, message: Option<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not well-formed XML, with the raw body for debugging.
    #[error("XML parse error: {message}")]
    Xml { message: String, body: String },
}

fn format_detail(message: Option<&str>) -> String {
    message
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotSignedIn)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}

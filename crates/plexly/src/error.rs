//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use plexly_config::ConfigError;
use plexly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(plexly::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             Servers reached by LAN address may need --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(plexly::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("plex.tv sign-in failed: {message}")]
    #[diagnostic(
        code(plexly::auth_failed),
        help(
            "Verify your username and password, or refresh the stored token.\n\
             Run: plexly config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(plexly::no_credentials),
        help(
            "Store a password with: plexly config set-password --username <name>\n\
             Or set PLEXLY_USERNAME and PLEXLY_PASSWORD, or PLEXLY_TOKEN."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(plexly::not_found),
        help("Run: plexly {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No server selected")]
    #[diagnostic(
        code(plexly::no_server),
        help(
            "Pass --server <name> or set one with: plexly config set-server <name>\n\
             Available servers: {available}"
        )
    )]
    NoServerSelected { available: String },

    #[error("Response contains unsupported element <{type_name}>")]
    #[diagnostic(
        code(plexly::unsupported_element),
        help("Browse the parent path with --output json to see the raw element.")
    )]
    UnsupportedElement { type_name: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Server error: {message}")]
    #[diagnostic(code(plexly::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(plexly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(plexly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: plexly config set-password --profile {name} --username <name>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(plexly::config))]
    Config { message: String },

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(plexly::keyring),
        help("Set PLEXLY_PASSWORD or PLEXLY_TOKEN instead when no keyring is available.")
    )]
    Keyring(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(plexly::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(plexly::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(plexly::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::Keyring(_)
            | Self::ApiError {
                status: Some(401 | 403),
                ..
            } => exit_code::AUTH,
            Self::NotFound { .. }
            | Self::ProfileNotFound { .. }
            | Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoServerSelected { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the active profile in authentication help text.
    #[must_use]
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.to_owned(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },

            CoreError::NotSignedIn => CliError::AuthFailed {
                message: "not signed in".into(),
                profile: "default".into(),
            },

            CoreError::ServerNotFound { name } => CliError::NotFound {
                resource_type: "server".into(),
                identifier: name,
                list_command: "servers".into(),
            },

            CoreError::SectionNotFound { name } => CliError::NotFound {
                resource_type: "section".into(),
                identifier: name,
                list_command: "sections".into(),
            },

            CoreError::UnregisteredNodeType { type_name } => {
                CliError::UnsupportedElement { type_name }
            }

            CoreError::MissingKey { type_name } => CliError::Validation {
                field: "path".into(),
                reason: format!("<{type_name}> has no key to load"),
            },

            CoreError::IndexOutOfRange { index, len } => {
                CliError::Internal(format!("index {index} out of range for {len} items"))
            }

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Keyring(e) => CliError::Keyring(e.to_string()),
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ServerNotFound {
                    name: "attic".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::AuthenticationFailed {
                    message: "Invalid token.".into(),
                },
                exit_code::AUTH,
            ),
            (CoreError::Timeout { timeout_secs: 5 }, exit_code::TIMEOUT),
            (
                CoreError::Api {
                    message: "HTTP 404".into(),
                    status: Some(404),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Api {
                    message: "HTTP 500".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
            (
                CoreError::UnregisteredNodeType {
                    type_name: "Weirdtype".into(),
                },
                exit_code::GENERAL,
            ),
        ];

        for (core, code) in cases {
            let cli = CliError::from(core);
            assert_eq!(cli.exit_code(), code, "{cli}");
        }
    }

    #[test]
    fn missing_credentials_are_an_auth_failure() {
        let cli = CliError::from(ConfigError::NoCredentials {
            profile: "home".into(),
        });
        assert_eq!(cli.exit_code(), exit_code::AUTH);
        assert_eq!(cli.to_string(), "No credentials configured for profile 'home'");
    }
}

// ── Runtime connection configuration ──
//
// These types describe *how* to reach plex.tv and media servers.
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `ClientConfig` and hands it in.

use std::time::Duration;

use plexly_api::{PlexHeaders, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// How to authenticate with plex.tv.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Sign in with username (or email) and password.
    Password {
        username: String,
        password: SecretString,
    },
    /// Reuse an authentication token from an earlier sign-in.
    Token(SecretString),
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Servers reached by LAN address rarely match
    /// their `*.plex.direct` certificate.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one plex.tv session and the servers it discovers.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sign-in endpoint. `None` uses plex.tv.
    pub sign_in_url: Option<Url>,
    /// Server listing endpoint. `None` uses plex.tv.
    pub servers_url: Option<Url>,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Proxy for every request, credentials embedded in the URL.
    pub proxy: Option<Url>,
    /// `X-Plex-*` identification headers.
    pub headers: PlexHeaders,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            sign_in_url: None,
            servers_url: None,
            credentials,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            proxy: None,
            headers: PlexHeaders::default(),
        }
    }

    /// Transport settings shared by every HTTP client in the session.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            proxy: self.proxy.clone(),
            headers: self.headers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_mirrors_config() {
        let mut config = ClientConfig::new(Credentials::Token(SecretString::from("t".to_owned())));
        config.tls = TlsVerification::DangerAcceptInvalid;
        config.timeout = Duration::from_secs(5);

        let transport = config.transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout_secs(), 5);
        assert!(transport.proxy.is_none());
        assert_eq!(
            transport.headers.client_identifier(),
            config.headers.client_identifier()
        );
    }
}

// ── Server domain type ──

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

pub const DEFAULT_PORT: u16 = 32400;
pub const DEFAULT_SCHEME: &str = "http";

/// A media server registered to an account, from one `<Server>` element.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Token that authorizes requests to this server.
    #[serde(skip)]
    pub access_token: Option<SecretString>,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub version: Option<String>,
    pub scheme: String,
    pub host: Option<String>,
    pub local_addresses: Vec<String>,
    pub machine_identifier: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub owned: bool,
    pub synced: bool,
}

impl ServerInfo {
    /// Minimal server description, for connecting without plex.tv.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            access_token: None,
            name: name.into(),
            address: address.into(),
            port: DEFAULT_PORT,
            version: None,
            scheme: DEFAULT_SCHEME.to_owned(),
            host: None,
            local_addresses: Vec::new(),
            machine_identifier: None,
            created_at: None,
            updated_at: None,
            owned: false,
            synced: false,
        }
    }

    /// `scheme://address:port`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_defaults() {
        let info = ServerInfo::new("den", "10.0.0.5");
        assert_eq!(info.url(), "http://10.0.0.5:32400");
    }

    #[test]
    fn url_honours_scheme_and_port() {
        let info = ServerInfo {
            scheme: "https".into(),
            port: 443,
            ..ServerInfo::new("remote", "plex.example.com")
        };
        assert_eq!(info.url(), "https://plex.example.com:443");
    }
}

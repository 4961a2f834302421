// plex.tv account client
//
// Sign-in with username/password over HTTP basic auth, and server
// discovery with the resulting authentication token.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::headers::TOKEN;
use crate::response::{read_tree, send_error};
use crate::transport::TransportConfig;
use crate::tree::RawTree;

pub const DEFAULT_SIGN_IN_URL: &str = "https://plex.tv/users/sign_in.xml";
pub const DEFAULT_SERVERS_URL: &str = "https://plex.tv/pms/servers.xml";

/// HTTP client for the plex.tv account endpoints.
pub struct MyPlexClient {
    http: reqwest::Client,
    sign_in_url: Url,
    servers_url: Url,
    timeout_secs: u64,
}

impl MyPlexClient {
    /// Create a client against the public plex.tv endpoints.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_urls(
            Url::parse(DEFAULT_SIGN_IN_URL)?,
            Url::parse(DEFAULT_SERVERS_URL)?,
            transport,
        )
    }

    /// Create a client against custom endpoints (self-hosted mirrors, tests).
    pub fn with_urls(
        sign_in_url: Url,
        servers_url: Url,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            sign_in_url,
            servers_url,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Wrap a pre-built `reqwest::Client` (caller manages headers).
    pub fn with_client(http: reqwest::Client, sign_in_url: Url, servers_url: Url) -> Self {
        Self {
            http,
            sign_in_url,
            servers_url,
            timeout_secs: 0,
        }
    }

    pub fn sign_in_url(&self) -> &Url {
        &self.sign_in_url
    }

    pub fn servers_url(&self) -> &Url {
        &self.servers_url
    }

    /// Authenticate and return the `<user>` element describing the account.
    ///
    /// `POST {sign_in_url}` with HTTP basic auth.
    pub async fn sign_in(&self, username: &str, password: &SecretString) -> Result<RawTree, Error> {
        debug!(url = %self.sign_in_url, username, "signing in");

        let resp = self
            .http
            .post(self.sign_in_url.clone())
            .basic_auth(username, Some(password.expose_secret()))
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        let tree = read_tree(resp).await?;
        debug!("sign-in successful");
        Ok(tree)
    }

    /// List the media servers associated with the account.
    ///
    /// `GET {servers_url}` with `X-Plex-Token`. Returns the
    /// `MediaContainer` whose children are `<Server>` elements.
    pub async fn servers(&self, token: &SecretString) -> Result<RawTree, Error> {
        if token.expose_secret().is_empty() {
            return Err(Error::NotSignedIn);
        }
        debug!(url = %self.servers_url, "listing servers");

        let resp = self
            .http
            .get(self.servers_url.clone())
            .header(TOKEN, token.expose_secret())
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        read_tree(resp).await
    }
}

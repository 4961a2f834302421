// Media server client
//
// Fetches XML sub-trees from one Plex Media Server by path, authenticating
// with the server's access token.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::headers::TOKEN;
use crate::response::{read_tree, send_error};
use crate::transport::TransportConfig;
use crate::tree::RawTree;

/// HTTP client bound to a single media server.
pub struct ServerClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    timeout_secs: u64,
}

impl ServerClient {
    /// Create a client for the server at `base_url` (e.g. `http://10.0.0.5:32400`).
    pub fn new(
        base_url: Url,
        token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            token,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            http,
            base_url,
            token,
            timeout_secs: 0,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path against the server root.
    ///
    /// Absolute `http(s)://` URLs are used as-is; anything else is appended
    /// to the base URL so `/library/sections` keeps any base path prefix.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// `GET {base}{path}` and parse the response tree.
    pub async fn get_tree(&self, path: &str) -> Result<RawTree, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let mut request = self.http.get(url).header("Accept", "application/xml");
        if let Some(ref token) = self.token {
            request = request.header(TOKEN, token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;
        read_tree(resp).await
    }
}

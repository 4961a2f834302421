// ── plex.tv session ──
//
// Signs in to plex.tv, remembers the account and its token, and hands out
// `PlexServer` handles for the servers registered to the account.

use std::sync::Arc;

use plexly_api::{MyPlexClient, TransportConfig};
use plexly_api::myplex::{DEFAULT_SERVERS_URL, DEFAULT_SIGN_IN_URL};
use secrecy::SecretString;
use tracing::{debug, info};
use url::Url;

use crate::config::{ClientConfig, Credentials};
use crate::convert::servers_from_tree;
use crate::error::CoreError;
use crate::model::{Account, ServerInfo};
use crate::registry::NodeFactory;
use crate::server::PlexServer;

/// An account session against plex.tv.
pub struct MyPlex {
    config: ClientConfig,
    transport: TransportConfig,
    client: MyPlexClient,
    factory: Arc<NodeFactory>,
    account: Option<Account>,
}

impl MyPlex {
    /// Build the HTTP client. Nothing is sent until [`sign_in`](Self::sign_in).
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let sign_in_url = endpoint(config.sign_in_url.as_ref(), DEFAULT_SIGN_IN_URL)?;
        let servers_url = endpoint(config.servers_url.as_ref(), DEFAULT_SERVERS_URL)?;
        let client = MyPlexClient::with_urls(sign_in_url, servers_url, &transport)?;

        Ok(Self {
            config,
            transport,
            client,
            factory: Arc::new(NodeFactory::new()),
            account: None,
        })
    }

    /// Use a custom node registry for every server handed out.
    pub fn with_factory(mut self, factory: Arc<NodeFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn factory(&self) -> &Arc<NodeFactory> {
        &self.factory
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.account
            .as_ref()
            .and_then(|a| a.authentication_token.as_ref())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    // ── Authentication ───────────────────────────────────────────

    /// Authenticate with the configured credentials.
    ///
    /// Password credentials are exchanged for an account and token. A
    /// token is adopted as-is, and the account then carries only the token.
    pub async fn sign_in(&mut self) -> Result<&Account, CoreError> {
        let account = match &self.config.credentials {
            Credentials::Password { username, password } => {
                let tree = self.client.sign_in(username, password).await?;
                let account = Account::from(&tree);
                if !account.has_token() {
                    return Err(CoreError::AuthenticationFailed {
                        message: "sign-in response carried no authentication token".into(),
                    });
                }
                info!(user = %account.display_name(), "signed in to plex.tv");
                account
            }
            Credentials::Token(token) => {
                debug!("using stored authentication token");
                Account {
                    authentication_token: Some(token.clone()),
                    ..Account::default()
                }
            }
        };

        Ok(self.account.insert(account))
    }

    // ── Servers ──────────────────────────────────────────────────

    /// Servers registered to the signed-in account.
    pub async fn servers(&self) -> Result<Vec<ServerInfo>, CoreError> {
        let token = self.token().ok_or(CoreError::NotSignedIn)?;
        let tree = self.client.servers(token).await?;
        let servers = servers_from_tree(&tree);
        debug!(count = servers.len(), "servers listed");
        Ok(servers)
    }

    /// Connect to the server with the given name (case-insensitive).
    pub async fn server(&self, name: &str) -> Result<PlexServer, CoreError> {
        let wanted = name.to_lowercase();
        let info = self
            .servers()
            .await?
            .into_iter()
            .find(|s| s.name.to_lowercase() == wanted)
            .ok_or_else(|| CoreError::ServerNotFound {
                name: name.to_owned(),
            })?;
        self.connect(info)
    }

    /// Connect to a server described by hand or by an earlier listing.
    pub fn connect(&self, info: ServerInfo) -> Result<PlexServer, CoreError> {
        PlexServer::connect(info, &self.transport, Arc::clone(&self.factory))
    }
}

fn endpoint(configured: Option<&Url>, default: &str) -> Result<Url, CoreError> {
    match configured {
        Some(url) => Ok(url.clone()),
        None => Url::parse(default).map_err(|e| CoreError::Internal(format!("{default}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_config() -> ClientConfig {
        ClientConfig::new(Credentials::Token(SecretString::from("tok".to_owned())))
    }

    #[test]
    fn new_does_not_sign_in() {
        let plex = MyPlex::new(token_config()).expect("client builds");
        assert!(!plex.is_signed_in());
        assert!(plex.account().is_none());
    }

    #[tokio::test]
    async fn servers_requires_sign_in() {
        let plex = MyPlex::new(token_config()).expect("client builds");
        assert!(matches!(plex.servers().await, Err(CoreError::NotSignedIn)));
    }

    #[tokio::test]
    async fn token_credentials_sign_in_offline() {
        let mut plex = MyPlex::new(token_config()).expect("client builds");
        let account = plex.sign_in().await.expect("token adopted");
        assert!(account.has_token());
        assert!(plex.is_signed_in());
    }

    #[test]
    fn custom_factory_is_shared_with_servers() {
        let mut factory = NodeFactory::new();
        factory.register("Weirdtype", Arc::new(crate::registry::Folder));
        let plex = MyPlex::new(token_config())
            .expect("client builds")
            .with_factory(Arc::new(factory));

        let server = plex
            .connect(ServerInfo::new("den", "10.0.0.5"))
            .expect("server client builds");
        assert!(server.factory().is_registered("Weirdtype"));
    }
}

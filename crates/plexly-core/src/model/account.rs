// ── Account domain type ──

use secrecy::SecretString;
use serde::Serialize;

/// A signed-in plex.tv account, from the `<user>` sign-in response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Account {
    pub id: Option<String>,
    pub uuid: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub title: Option<String>,
    pub thumb: Option<String>,
    pub locale: Option<String>,
    pub cloud_sync_device: Option<String>,
    #[serde(skip)]
    pub authentication_token: Option<SecretString>,
    /// Managed (restricted) home user.
    pub restricted: bool,
    pub home: bool,
    pub queue_email: Option<String>,
    pub queue_uid: Option<String>,
    pub max_home_size: Option<u64>,
    pub subscription: Subscription,
    /// Role ids, e.g. `plexpass`.
    pub roles: Vec<String>,
    pub entitlements: Vec<String>,
    /// Set when `<entitlements all="1">`: every entitlement is granted.
    pub all_entitlements: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Subscription {
    pub active: bool,
    pub status: Option<String>,
    pub plan: Option<String>,
    /// Feature ids enabled by the subscription.
    pub features: Vec<String>,
}

impl Account {
    pub fn has_token(&self) -> bool {
        self.authentication_token.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("<unknown>")
    }
}

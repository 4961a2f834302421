//! Shared configuration for the plexly CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `plexly_core::ClientConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use plexly_core::{ClientConfig, Credentials, PlexHeaders, TlsVerification};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "plexly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no proxy host configured")]
    NoProxy,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named plex.tv account profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// plex.tv username or email.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or `PLEXLY_PASSWORD`).
    pub password: Option<String>,

    /// Authentication token from an earlier sign-in (plaintext -- prefer keyring).
    pub token: Option<String>,

    /// Server to use when a command does not name one.
    pub server: Option<String>,

    /// Override the plex.tv sign-in endpoint.
    pub myplex_url: Option<String>,

    /// Override the plex.tv server listing endpoint.
    pub servers_url: Option<String>,

    pub proxy: Option<ProxySettings>,

    /// Fixed `X-Plex-Client-Identifier`. Generated per run when unset.
    pub client_identifier: Option<String>,

    /// `X-Plex-Device` name reported to servers.
    pub device: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Profile {
    /// Whether the profile carries enough to authenticate, without
    /// consulting env vars or the keyring.
    pub fn has_plaintext_credentials(&self) -> bool {
        (self.username.is_some() && self.password.is_some()) || self.token.is_some()
    }
}

/// HTTP proxy for every request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxySettings {
    #[serde(default = "default_proxy_scheme")]
    pub scheme: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            scheme: default_proxy_scheme(),
            host: None,
            port: None,
            username: None,
            password: None,
        }
    }
}

fn default_proxy_scheme() -> String {
    "http".into()
}

impl ProxySettings {
    /// `scheme://[user[:pass]@]host[:port]`.
    pub fn address(&self) -> Result<String, ConfigError> {
        let host = self
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::NoProxy)?;

        let mut address = format!("{}://", self.scheme);
        if let Some(ref user) = self.username {
            address.push_str(user);
            if let Some(ref pass) = self.password {
                address.push(':');
                address.push_str(pass);
            }
            address.push('@');
        }
        address.push_str(host);
        if let Some(port) = self.port {
            address.push(':');
            address.push_str(&port.to_string());
        }
        Ok(address)
    }

    pub fn url(&self) -> Result<Url, ConfigError> {
        let address = self.address()?;
        Url::parse(&address).map_err(|e| ConfigError::Validation {
            field: "proxy".into(),
            reason: format!("{e}"),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tv", "plexly", "plexly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("plexly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, then `PLEXLY_` env vars.
///
/// Nested keys use a double underscore: `PLEXLY_DEFAULTS__TIMEOUT=10`.
/// Credential variables are read by the resolvers, not merged here.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("PLEXLY_")
                .ignore(&["USERNAME", "PASSWORD", "TOKEN", "PROFILE", "OUTPUT"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str, kind: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))
}

fn keyring_secret(profile_name: &str, kind: &str) -> Option<SecretString> {
    let entry = keyring_entry(profile_name, kind).ok()?;
    match entry.get_password() {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(e) => {
            debug!(profile = profile_name, kind, error = %e, "no keyring secret");
            None
        }
    }
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "password")?.set_password(password.expose_secret())?;
    Ok(())
}

/// Store a profile's authentication token in the system keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "token")?.set_password(token.expose_secret())?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve username + password without CLI flags.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("PLEXLY_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("PLEXLY_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Ok((username, pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve an authentication token without CLI flags.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(token) = std::env::var("PLEXLY_TOKEN") {
        return Ok(SecretString::from(token));
    }

    // 2. Keyring
    if let Some(token) = keyring_secret(profile_name, "token") {
        return Ok(token);
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Password credentials when available, a token otherwise.
///
/// A password sign-in returns full account details; a token alone does not.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    match resolve_password(profile, profile_name) {
        Ok((username, password)) => Ok(Credentials::Password { username, password }),
        Err(ConfigError::NoCredentials { .. }) => {
            resolve_token(profile, profile_name).map(Credentials::Token)
        }
        Err(e) => Err(e),
    }
}

// ── ClientConfig construction ───────────────────────────────────────

fn parse_endpoint(field: &str, raw: Option<&String>) -> Result<Option<Url>, ConfigError> {
    raw.map(|s| {
        Url::parse(s).map_err(|_| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL: {s}"),
        })
    })
    .transpose()
}

/// TLS strategy for a profile. plex.tv certificates are public, so
/// verification stays on unless the profile opts out.
pub fn profile_tls(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Identification headers for a profile.
pub fn profile_headers(profile: &Profile) -> PlexHeaders {
    let mut headers = PlexHeaders::default();
    if let Some(ref id) = profile.client_identifier {
        headers.set("clientIdentifier", id.clone());
    }
    if let Some(ref device) = profile.device {
        headers.set("device", device.clone());
    }
    headers
}

/// Build a `ClientConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ClientConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    client_config_with_credentials(profile, credentials)
}

/// Build a `ClientConfig` from a profile with credentials resolved elsewhere.
pub fn client_config_with_credentials(
    profile: &Profile,
    credentials: Credentials,
) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::new(credentials);
    config.sign_in_url = parse_endpoint("myplex_url", profile.myplex_url.as_ref())?;
    config.servers_url = parse_endpoint("servers_url", profile.servers_url.as_ref())?;
    config.proxy = match profile.proxy {
        Some(ref proxy) => Some(proxy.url()?),
        None => None,
    };
    config.tls = profile_tls(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    config.headers = profile_headers(profile);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn proxy_address_forms() {
        let mut proxy = ProxySettings {
            host: Some("proxy.local".into()),
            ..ProxySettings::default()
        };
        assert_eq!(proxy.address().unwrap(), "http://proxy.local");

        proxy.port = Some(3128);
        proxy.username = Some("jo".into());
        assert_eq!(proxy.address().unwrap(), "http://jo@proxy.local:3128");

        proxy.password = Some("pw".into());
        proxy.scheme = "socks5".into();
        assert_eq!(proxy.address().unwrap(), "socks5://jo:pw@proxy.local:3128");
    }

    #[test]
    fn proxy_without_host_is_an_error() {
        let proxy = ProxySettings::default();
        assert!(matches!(proxy.address(), Err(ConfigError::NoProxy)));

        let empty = ProxySettings {
            host: Some(String::new()),
            ..ProxySettings::default()
        };
        assert!(matches!(empty.url(), Err(ConfigError::NoProxy)));
    }

    #[test]
    fn plaintext_credential_validity() {
        let mut profile = Profile::default();
        assert!(!profile.has_plaintext_credentials());

        profile.username = Some("jo".into());
        assert!(!profile.has_plaintext_credentials());

        profile.password = Some("pw".into());
        assert!(profile.has_plaintext_credentials());

        let token_only = Profile {
            token: Some("tok".into()),
            ..Profile::default()
        };
        assert!(token_only.has_plaintext_credentials());
    }

    #[test]
    fn tls_selection() {
        let mut profile = Profile::default();
        assert_eq!(profile_tls(&profile), TlsVerification::SystemDefaults);

        profile.ca_cert = Some(PathBuf::from("/etc/plex-ca.pem"));
        assert_eq!(
            profile_tls(&profile),
            TlsVerification::CustomCa(PathBuf::from("/etc/plex-ca.pem"))
        );

        profile.insecure = Some(true);
        assert_eq!(profile_tls(&profile), TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn headers_from_profile() {
        let profile = Profile {
            client_identifier: Some("plexly-fixed".into()),
            device: Some("Den TV".into()),
            ..Profile::default()
        };
        let headers = profile_headers(&profile);
        assert_eq!(headers.client_identifier(), Some("plexly-fixed"));
        assert_eq!(headers.get("device"), Some("Den TV"));
    }

    #[test]
    fn client_config_applies_profile_settings() {
        let profile = Profile {
            myplex_url: Some("http://127.0.0.1:9/users/sign_in.xml".into()),
            timeout: Some(5),
            insecure: Some(true),
            ..Profile::default()
        };
        let token = Credentials::Token(SecretString::from("tok".to_owned()));
        let config = client_config_with_credentials(&profile, token).unwrap();

        assert_eq!(
            config.sign_in_url.unwrap().as_str(),
            "http://127.0.0.1:9/users/sign_in.xml"
        );
        assert!(config.servers_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn client_config_rejects_bad_endpoint() {
        let profile = Profile {
            servers_url: Some("not a url".into()),
            ..Profile::default()
        };
        let token = Credentials::Token(SecretString::from("tok".to_owned()));
        let err = client_config_with_credentials(&profile, token).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "servers_url"));
    }

    #[test]
    fn load_from_file_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
username = "jo"
server = "Den"

[profiles.home.proxy]
host = "proxy.local"
port = 8080
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.output, "table");

        let home = &config.profiles["home"];
        assert_eq!(home.server.as_deref(), Some("Den"));
        let proxy = home.proxy.as_ref().unwrap();
        assert_eq!(proxy.scheme, "http");
        assert_eq!(proxy.address().unwrap(), "http://proxy.local:8080");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                username: Some("jo".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].username.as_deref(), Some("jo"));
        assert_eq!(loaded.profiles["default"].timeout, Some(5));
    }
}

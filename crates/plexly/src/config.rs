//! CLI configuration — thin wrapper around `plexly_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--username, --token, etc.).

use std::io::IsTerminal;
use std::path::PathBuf;

use secrecy::SecretString;

use plexly_config::ConfigError;
use plexly_core::{ClientConfig, Credentials};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use plexly_config::{Config, Profile};

// ── Loading ─────────────────────────────────────────────────────────

/// Config file in effect: `--config`, else the platform location.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(plexly_config::config_path)
}

/// Load the config file, falling back to defaults when it is missing or unreadable.
pub fn load_config_or_default(global: &GlobalOpts) -> Config {
    plexly_config::load_config_from(&config_path(global)).unwrap_or_default()
}

pub fn save_config(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    plexly_config::save_config_to(cfg, &config_path(global))?;
    Ok(())
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with CLI flag overrides applied.
///
/// A profile named with `--profile` must exist. The implicit default
/// profile may be absent, in which case flags and env vars carry
/// everything.
pub fn active_profile(
    global: &GlobalOpts,
    config: &Config,
    profile_name: &str,
) -> Result<Profile, CliError> {
    let mut profile = match config.profiles.get(profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name.into(),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    profile.insecure = Some(global.insecure || profile.insecure.unwrap_or(config.defaults.insecure));
    profile.timeout = global
        .timeout
        .or(profile.timeout)
        .or(Some(config.defaults.timeout));

    Ok(profile)
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// `--token` wins over everything. Otherwise the shared resolvers run,
/// and an interactive terminal is asked for the password when only a
/// username is known.
pub fn resolve_client_config(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    let credentials = resolve_credentials(profile, profile_name, global)?;
    Ok(plexly_config::client_config_with_credentials(profile, credentials)?)
}

fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Credentials, CliError> {
    if let Some(ref token) = global.token {
        return Ok(Credentials::Token(SecretString::from(token.clone())));
    }

    match plexly_config::resolve_credentials(profile, profile_name) {
        Ok(credentials) => Ok(credentials),
        Err(ConfigError::NoCredentials { .. })
            if profile.username.is_some() && std::io::stdin().is_terminal() =>
        {
            let username = profile.username.clone().unwrap_or_default();
            let password = prompt_secret(&format!("plex.tv password for {username}: "))?;
            Ok(Credentials::Password { username, password })
        }
        Err(e) => Err(e.into()),
    }
}

/// Read a secret from the terminal without echo. Empty input is rejected.
pub fn prompt_secret(prompt: &str) -> Result<SecretString, CliError> {
    let value = rpassword::prompt_password(prompt)?;
    if value.is_empty() {
        return Err(CliError::Validation {
            field: "input".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(SecretString::from(value))
}

//! Config subcommand handlers.

use std::fmt::Write as _;

use plexly_config::{store_password, store_token};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let Some(p) = cfg.profiles.get(name) else { continue };
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref server) = p.server {
            let _ = writeln!(out, "server = \"{server}\"");
        }
        if let Some(ref url) = p.myplex_url {
            let _ = writeln!(out, "myplex_url = \"{url}\"");
        }
        if let Some(ref url) = p.servers_url {
            let _ = writeln!(out, "servers_url = \"{url}\"");
        }
        if let Some(ref proxy) = p.proxy {
            if let Some(ref host) = proxy.host {
                let port = proxy.port.map(|p| format!(":{p}")).unwrap_or_default();
                let _ = writeln!(out, "proxy = \"{}://{host}{port}\"", proxy.scheme);
            }
        }
        if let Some(ref id) = p.client_identifier {
            let _ = writeln!(out, "client_identifier = \"{id}\"");
        }
        if let Some(ref device) = p.device {
            let _ = writeln!(out, "device = \"{device}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.truncate(out.trim_end().len());
    out
}

fn status(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default(global);
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let mut cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            if let Some(ref username) = global.username {
                profile.username = Some(username.clone());
            }
            let username = profile.username.clone().ok_or_else(|| CliError::Validation {
                field: "username".into(),
                reason: format!("profile '{profile_name}' has no username; pass --username"),
            })?;

            let password = config::prompt_secret(&format!("plex.tv password for {username}: "))?;
            store_password(&profile_name, &password)?;
            config::save_config(&cfg, global)?;
            status(global, &format!("Password for '{username}' stored in the system keyring"));
            Ok(())
        }

        ConfigCommand::SetToken { token } => {
            let mut cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);

            let token = match token.or_else(|| global.token.clone()) {
                Some(token) => SecretString::from(token),
                None => config::prompt_secret("plex.tv token: ")?,
            };
            store_token(&profile_name, &token)?;

            cfg.profiles.entry(profile_name.clone()).or_default();
            config::save_config(&cfg, global)?;
            status(global, &format!("Token for profile '{profile_name}' stored in the system keyring"));
            Ok(())
        }

        ConfigCommand::SetServer { name } => {
            let mut cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);
            cfg.profiles.entry(profile_name.clone()).or_default().server = Some(name.clone());
            config::save_config(&cfg, global)?;
            status(global, &format!("Profile '{profile_name}' now uses server '{name}'"));
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default(global);
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available.join(", "),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg, global)?;
            status(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }
    }
}

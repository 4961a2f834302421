//! Command dispatch: bridges CLI args -> plex.tv session -> output formatting.

pub mod account;
pub mod browse;
pub mod config_cmd;
pub mod sections;
pub mod servers;
pub mod sessions;

use plexly_core::{MyPlex, PlexServer};

use crate::cli::{Command, GlobalOpts, ServerArgs};
use crate::error::CliError;

/// A signed-in plex.tv session plus the profile's preferred server.
pub struct Context {
    pub plex: MyPlex,
    pub default_server: Option<String>,
}

impl Context {
    pub fn new(plex: MyPlex, default_server: Option<String>) -> Self {
        Self {
            plex,
            default_server,
        }
    }

    /// Connect to the requested server.
    ///
    /// Falls back to the profile's server, then to the only server on the
    /// account when there is exactly one.
    pub async fn server(&self, args: &ServerArgs) -> Result<PlexServer, CliError> {
        if let Some(name) = args.server.as_ref().or(self.default_server.as_ref()) {
            return Ok(self.plex.server(name).await?);
        }

        let mut servers = self.plex.servers().await?;
        if servers.len() == 1 {
            let info = servers.remove(0);
            tracing::debug!(server = %info.name, "using the account's only server");
            return Ok(self.plex.connect(info)?);
        }

        Err(CliError::NoServerSelected {
            available: if servers.is_empty() {
                "(none)".into()
            } else {
                servers
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Account => account::handle(ctx, global),
        Command::Servers => servers::handle(ctx, global).await,
        Command::Sections(args) => sections::handle(ctx, &args, global).await,
        Command::Browse(args) => browse::handle(ctx, args, global).await,
        Command::Sessions(args) => sessions::handle(ctx, &args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions run without a session".into(),
        )),
    }
}

//! Server listing handler.

use tabled::Tabled;

use plexly_core::ServerInfo;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Owned")]
    owned: String,
    #[tabled(rename = "Local addresses")]
    local: String,
}

impl From<&ServerInfo> for ServerRow {
    fn from(s: &ServerInfo) -> Self {
        Self {
            name: s.name.clone(),
            url: s.url(),
            version: s.version.clone().unwrap_or_default(),
            owned: output::yes_no(s.owned),
            local: s.local_addresses.join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let servers = ctx.plex.servers().await?;
    let out = output::render_list(
        &global.output,
        &servers,
        |s| ServerRow::from(s),
        |s| s.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

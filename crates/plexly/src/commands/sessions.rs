//! Playback session handler.

use serde::Serialize;
use tabled::Tabled;

use plexly_core::Node;

use crate::cli::{GlobalOpts, OutputFormat, ServerArgs};
use crate::error::CliError;
use crate::output;

use super::Context;

/// One active playback, flattened from a session element.
#[derive(Debug, Serialize)]
struct SessionEntry {
    user: Option<String>,
    player: Option<String>,
    state: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    key: Option<String>,
    progress: Option<f64>,
}

impl From<&Node> for SessionEntry {
    fn from(node: &Node) -> Self {
        let raw_attr = |element: &str, name: &str| {
            node.raw_children()
                .iter()
                .find(|raw| raw.name == element)
                .and_then(|raw| raw.attr(name))
                .map(str::to_owned)
        };

        let title = match (node.get("grandparentTitle"), node.title()) {
            (Some(show), Some(episode)) => format!("{show} - {episode}"),
            (None, Some(title)) => title.to_owned(),
            _ => node.to_string(),
        };

        Self {
            user: raw_attr("User", "title"),
            player: raw_attr("Player", "title"),
            state: raw_attr("Player", "state"),
            kind: node.get("type").unwrap_or(node.type_name()).to_owned(),
            title,
            key: node.get("key").map(str::to_owned),
            progress: node.progress(),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

impl From<&SessionEntry> for SessionRow {
    fn from(s: &SessionEntry) -> Self {
        Self {
            user: s.user.clone().unwrap_or_default(),
            player: s.player.clone().unwrap_or_default(),
            state: s.state.clone().unwrap_or_default(),
            kind: s.kind.clone(),
            title: s.title.clone(),
            progress: s.progress.map(|p| format!("{p:.0}%")).unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: &ServerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let server = ctx.server(args).await?;
    let container = server.sessions().await?;

    // Session elements carry <User>; anything else in the container is noise.
    let sessions: Vec<SessionEntry> = container
        .children(None)?
        .iter()
        .filter(|node| node.is_session())
        .map(SessionEntry::from)
        .collect();

    if sessions.is_empty() && matches!(global.output, OutputFormat::Table) {
        if !global.quiet {
            eprintln!("Nothing is playing on {}", server.name());
        }
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &sessions,
        |s| SessionRow::from(s),
        |s| s.key.clone().unwrap_or_else(|| s.title.clone()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

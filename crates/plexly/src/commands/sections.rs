//! Library section listing handler.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, ServerArgs};
use crate::error::CliError;
use crate::output;

use super::Context;

/// One library section as listed by the server.
#[derive(Debug, Serialize, Tabled)]
struct SectionEntry {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Title")]
    title: String,
}

pub async fn handle(ctx: &Context, args: &ServerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let server = ctx.server(args).await?;
    let sections: Vec<SectionEntry> = server
        .sections()
        .await?
        .into_iter()
        .map(|(title, key)| SectionEntry { key, title })
        .collect();

    let out = output::render_list(
        &global.output,
        &sections,
        |s| SectionEntry {
            key: s.key.clone(),
            title: s.title.clone(),
        },
        |s| s.key.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

//! Library browsing handler.
//!
//! Lists the children of a library path or section. With `--load`, every
//! listed item is fetched from its own key first, concurrently.
//!
//! A loaded node holds the fetched container, so its row comes from the
//! element inside it with the same name and `ratingKey`. Without one (a
//! show's `/children` key returns its seasons), the listing row is kept and
//! the loaded children are counted.

use tabled::Tabled;

use plexly_core::{Node, NodeDetail};

use crate::cli::{BrowseArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Rating key")]
    rating_key: String,
    #[tabled(rename = "Added")]
    added: String,
    #[tabled(rename = "Items")]
    items: String,
}

impl From<&NodeDetail> for ItemRow {
    fn from(d: &NodeDetail) -> Self {
        let text = |name: &str| d.attributes.get(name).unwrap_or_default().to_owned();
        Self {
            kind: d.name.clone(),
            title: text("title"),
            key: text("key"),
            rating_key: text("ratingKey"),
            added: d
                .attributes
                .timestamp("addedAtDateTime")
                .or_else(|| d.attributes.parse_timestamp("addedAt"))
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            items: match d.children.len() {
                0 => String::new(),
                n => n.to_string(),
            },
        }
    }
}

// ── Loaded items ────────────────────────────────────────────────────

fn loaded_detail(listed: &Node, loaded: &Node) -> Result<NodeDetail, CliError> {
    if let Some(rating_key) = listed.rating_key() {
        let same_name = loaded.children(Some(loaded.type_name()))?;
        if let Some(item) = same_name
            .iter()
            .find(|c| c.type_name() == listed.type_name() && c.rating_key() == Some(rating_key))
        {
            return Ok(item.detail());
        }
    }
    let mut detail = listed.detail();
    detail.children = loaded.detail().children;
    Ok(detail)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: BrowseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let server = ctx.server(&args.server).await?;

    let container = if args.path.starts_with('/') {
        server.load_container(&args.path).await?
    } else {
        server.section(&args.path, args.view.into()).await?
    };
    tracing::debug!(container = %container, "browsing");

    let mut items = container.children(args.filter.as_deref())?;
    let details: Vec<NodeDetail> = if args.load {
        let listed = items.clone();
        items.load_all().await?;
        listed
            .iter()
            .zip(items.iter())
            .map(|(shallow, loaded)| loaded_detail(shallow, loaded))
            .collect::<Result<Vec<_>, CliError>>()?
    } else {
        items.iter().map(Node::detail).collect()
    };
    let out = output::render_list(
        &global.output,
        &details,
        |d| ItemRow::from(d),
        |d| {
            d.attributes
                .get("key")
                .or_else(|| d.attributes.get("title"))
                .unwrap_or_default()
                .to_owned()
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

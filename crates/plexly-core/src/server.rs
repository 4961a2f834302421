// ── Media server handle ──
//
// Entry point into one server's library. Every root node it builds shares
// the server's fetcher and the session's node registry, so nodes deep in
// the tree can load themselves.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use plexly_api::{RawTree, ServerClient, TransportConfig};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::error::CoreError;
use crate::fetch::Fetcher;
use crate::model::ServerInfo;
use crate::node::Node;
use crate::registry::NodeFactory;

pub const LIBRARY_PATH: &str = "/library";
pub const SECTIONS_PATH: &str = "/library/sections";
pub const SESSIONS_PATH: &str = "/status/sessions";

// ── DirectoryView ────────────────────────────────────────────────

/// Listing appended to a section path.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum DirectoryView {
    /// The section itself.
    #[default]
    None,
    All,
    Unwatched,
    Newest,
    RecentlyAdded,
    RecentlyViewed,
    OnDeck,
    Folder,
}

/// Path for a section key and view.
///
/// Keys under `/sync/` are full paths already; anything else is a
/// section id below `/library/sections`.
pub fn section_path(key: &str, view: DirectoryView) -> String {
    let mut path = if key.starts_with("/sync/") {
        key.to_owned()
    } else {
        format!("{SECTIONS_PATH}/{key}")
    };
    if view != DirectoryView::None {
        path.push('/');
        path.push_str(view.as_ref());
    }
    path
}

fn is_section_id(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// `title`, `title 2`, `title 3`... whichever is not yet taken.
fn next_free_title(sections: &IndexMap<String, String>, title: &str) -> String {
    let mut candidate = title.to_owned();
    let mut n = 1;
    while sections.contains_key(&candidate) {
        n += 1;
        candidate = format!("{title} {n}");
    }
    candidate
}

// ── PlexServer ───────────────────────────────────────────────────

/// A connected media server.
///
/// Cheaply cloneable; clones share the fetcher and the section cache.
#[derive(Clone)]
pub struct PlexServer {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    info: ServerInfo,
    fetcher: Arc<dyn Fetcher>,
    factory: Arc<NodeFactory>,
    sections: Mutex<IndexMap<String, String>>,
}

impl PlexServer {
    /// Connect over HTTP using the server's own access token.
    pub fn connect(
        info: ServerInfo,
        transport: &TransportConfig,
        factory: Arc<NodeFactory>,
    ) -> Result<Self, CoreError> {
        let base_url = Url::parse(&info.url()).map_err(|e| CoreError::Config {
            message: format!("Invalid server address {}: {e}", info.url()),
        })?;
        let client = ServerClient::new(base_url, info.access_token.clone(), transport)?;
        debug!(server = %info.name, url = %info.url(), "server client ready");
        Ok(Self::with_fetcher(info, Arc::new(client), factory))
    }

    /// Use any fetcher, e.g. a cached or in-memory one.
    pub fn with_fetcher(
        info: ServerInfo,
        fetcher: Arc<dyn Fetcher>,
        factory: Arc<NodeFactory>,
    ) -> Self {
        Self {
            inner: Arc::new(ServerInner {
                info,
                fetcher,
                factory,
                sections: Mutex::new(IndexMap::new()),
            }),
        }
    }

    pub fn info(&self) -> &ServerInfo {
        &self.inner.info
    }

    pub fn name(&self) -> &str {
        &self.inner.info.name
    }

    pub fn url(&self) -> String {
        self.inner.info.url()
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.inner.fetcher
    }

    pub fn factory(&self) -> &Arc<NodeFactory> {
        &self.inner.factory
    }

    // ── Containers ───────────────────────────────────────────────

    /// Fetch a path without building nodes.
    pub async fn load_container_raw(&self, path: &str) -> Result<RawTree, CoreError> {
        self.inner.fetcher.fetch(path).await
    }

    /// Fetch a path and build its root node.
    pub async fn load_container(&self, path: &str) -> Result<Node, CoreError> {
        let raw = self.load_container_raw(path).await?;
        self.inner.factory.build_at(
            raw,
            Arc::clone(&self.inner.fetcher),
            Some(path.to_owned()),
        )
    }

    /// The library root, `/library`.
    pub async fn library(&self) -> Result<Node, CoreError> {
        self.load_container(LIBRARY_PATH).await
    }

    /// Current playback sessions, `/status/sessions`.
    pub async fn sessions(&self) -> Result<Node, CoreError> {
        self.load_container(SESSIONS_PATH).await
    }

    // ── Sections ─────────────────────────────────────────────────

    /// Section title to key, in server order.
    ///
    /// Repeated titles get a numeric suffix (`TV Shows`, `TV Shows 2`).
    /// Untitled sections map under the empty title. Sections without a
    /// key are skipped. Each call refetches and
    /// replaces the cached mapping used by [`section`](Self::section).
    pub async fn sections(&self) -> Result<IndexMap<String, String>, CoreError> {
        let root = self.load_container(SECTIONS_PATH).await?;

        let mut sections = IndexMap::new();
        for child in &root.children(None)? {
            if let Ok(key) = child.key() {
                let title = next_free_title(&sections, child.title().unwrap_or_default());
                sections.insert(title, key.to_owned());
            }
        }
        info!(server = %self.name(), count = sections.len(), "sections loaded");

        *self.inner.sections.lock().await = sections.clone();
        Ok(sections)
    }

    /// Load one section by id or title.
    ///
    /// A numeric key is used as-is. Any other key is looked up by title in
    /// the cached section mapping, which is fetched first if empty.
    pub async fn section(&self, key: &str, view: DirectoryView) -> Result<Node, CoreError> {
        let key = self.resolve_section(key).await?;
        self.load_container(&section_path(&key, view)).await
    }

    async fn resolve_section(&self, key: &str) -> Result<String, CoreError> {
        if is_section_id(key) || key.starts_with("/sync/") {
            return Ok(key.to_owned());
        }

        let cached = {
            let sections = self.inner.sections.lock().await;
            if sections.is_empty() {
                None
            } else {
                Some(sections.get(key).cloned())
            }
        };
        let found = match cached {
            Some(found) => found,
            None => self.sections().await?.get(key).cloned(),
        };

        found.ok_or_else(|| CoreError::SectionNotFound {
            name: key.to_owned(),
        })
    }
}

impl fmt::Display for PlexServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name(), self.url())
    }
}

impl fmt::Debug for PlexServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlexServer")
            .field("name", &self.name())
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}

// ── Tree node ──
//
// One element of a server response: its attributes, its not-yet-built
// raw children, and shared handles to the fetcher and registry so it can
// build children and deep-load itself without any outside help.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use plexly_api::RawTree;
use serde::Serialize;
use tracing::{debug, trace};

use crate::attributes::{AttributeStore, AttributeValue};
use crate::collection::NodeCollection;
use crate::error::CoreError;
use crate::fetch::{Fetcher, resolve_key};
use crate::registry::{NodeFactory, NodeKind, NodeVariant};

/// A typed, lazily navigable element of a response tree.
///
/// Children stay raw until `children()` asks for them. `load()` is the
/// only operation that touches the network.
#[derive(Clone)]
pub struct Node {
    type_name: String,
    variant: Arc<dyn NodeVariant>,
    attributes: AttributeStore,
    raw_children: Vec<RawTree>,
    source_path: Option<String>,
    fetcher: Arc<dyn Fetcher>,
    factory: Arc<NodeFactory>,
}

/// Serializable snapshot of a node and its raw sub-tree.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDetail {
    pub name: String,
    pub attributes: AttributeStore,
    pub children: Vec<RawTree>,
}

impl Node {
    pub(crate) fn assemble(
        raw: RawTree,
        variant: Arc<dyn NodeVariant>,
        fetcher: Arc<dyn Fetcher>,
        factory: Arc<NodeFactory>,
        source_path: Option<String>,
    ) -> Self {
        let mut node = Self {
            attributes: AttributeStore::from_raw(&raw.attributes),
            type_name: raw.name,
            variant,
            raw_children: raw.children,
            source_path,
            fetcher,
            factory,
        };
        node.run_derive();
        node
    }

    fn run_derive(&mut self) {
        let variant = Arc::clone(&self.variant);
        variant.derive(self);
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> NodeKind {
        self.variant.kind()
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Raw text of one attribute.
    ///
    /// Derived values such as `progress` or `addedAtDateTime` are not raw
    /// text and give `None` here; read them through
    /// [`AttributeStore::value`], [`AttributeStore::float`] or the typed
    /// accessors.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Store a derived attribute. Intended for `NodeVariant::derive`.
    pub fn set_derived(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.set_derived(name, value);
    }

    /// Path of the request this node's data came from, if known.
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn has_key(&self) -> bool {
        self.attributes.get("key").is_some()
    }

    pub fn key(&self) -> Result<&str, CoreError> {
        self.attributes
            .get("key")
            .ok_or_else(|| CoreError::MissingKey {
                type_name: self.type_name.clone(),
            })
    }

    // ── Typed accessors ──────────────────────────────────────────────

    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title")
    }

    pub fn rating_key(&self) -> Option<&str> {
        self.attributes.get("ratingKey")
    }

    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        self.attributes.timestamp("addedAtDateTime")
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.attributes.timestamp("updatedAtDateTime")
    }

    /// Watch progress in percent, for session nodes.
    pub fn progress(&self) -> Option<f64> {
        match self.attributes.value("progress")? {
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    // ── Children ─────────────────────────────────────────────────────

    pub fn has_children(&self) -> bool {
        !self.raw_children.is_empty()
    }

    pub fn raw_children(&self) -> &[RawTree] {
        &self.raw_children
    }

    /// Build child nodes.
    ///
    /// Without a filter every raw child is built. With one, only children
    /// whose `title` matches case-insensitively, or whose type name equals
    /// the filter exactly, are built. No match is an empty collection.
    pub fn children(&self, filter: Option<&str>) -> Result<NodeCollection, CoreError> {
        let needle = filter.map(|f| (f, f.to_lowercase()));

        let nodes = self
            .raw_children
            .iter()
            .filter(|raw| {
                needle
                    .as_ref()
                    .is_none_or(|(exact, lower)| matches_filter(raw, exact, lower))
            })
            .map(|raw| {
                self.factory.build_at(
                    raw.clone(),
                    Arc::clone(&self.fetcher),
                    self.source_path.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NodeCollection::new(nodes))
    }

    /// First child matching `title`, or `None`.
    pub fn child(&self, title: &str) -> Result<Option<Node>, CoreError> {
        Ok(self.children(Some(title))?.into_iter().next())
    }

    /// Whether this node describes a playback session.
    ///
    /// Checks the raw children without building them, so it works for
    /// trees containing types that have no registered variant.
    pub fn is_session(&self) -> bool {
        ["User", "TranscodeSession"].iter().any(|name| {
            let lower = name.to_lowercase();
            self.raw_children
                .iter()
                .any(|raw| matches_filter(raw, name, &lower))
        })
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Replace this node's data with the tree fetched from its key.
    ///
    /// A node without a key is returned unchanged and nothing is fetched.
    /// Attributes are replaced wholesale, not merged, and derived
    /// attributes are recomputed. Fetch errors are returned as-is.
    pub async fn load(&mut self) -> Result<&mut Self, CoreError> {
        let Some(key) = self.attributes.get("key") else {
            trace!(type_name = %self.type_name, "no key, load skipped");
            return Ok(self);
        };
        let path = resolve_key(key, self.source_path.as_deref());
        debug!(type_name = %self.type_name, %path, "loading node");

        let tree = self.fetcher.fetch(&path).await?;

        self.attributes = AttributeStore::from_raw(&tree.attributes);
        self.raw_children = tree.children;
        self.source_path = Some(path);
        self.run_derive();
        Ok(self)
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn detail(&self) -> NodeDetail {
        NodeDetail {
            name: self.type_name.clone(),
            attributes: self.attributes.clone(),
            children: self.raw_children.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.detail()).unwrap_or(serde_json::Value::Null)
    }
}

fn matches_filter(raw: &RawTree, exact: &str, lower: &str) -> bool {
    raw.name == exact
        || raw
            .attr("title")
            .is_some_and(|title| title.to_lowercase() == lower)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title().unwrap_or(&self.type_name))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind())
            .field("attributes", &self.attributes)
            .field("children", &self.raw_children.len())
            .field("source_path", &self.source_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;

    // ── Fixtures ────────────────────────────────────────────────────

    /// Serves canned trees by path and records every request.
    #[derive(Default)]
    struct MapFetcher {
        trees: HashMap<String, RawTree>,
        calls: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, path: &str, tree: RawTree) -> Self {
            self.trees.insert(path.to_owned(), tree);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, path: &str) -> Result<RawTree, CoreError> {
            self.calls.lock().unwrap().push(path.to_owned());
            self.trees.get(path).cloned().ok_or(CoreError::Api {
                message: format!("Error code 404 received from server: {path}"),
                status: Some(404),
            })
        }
    }

    fn library() -> RawTree {
        RawTree::new("MediaContainer")
            .with_attr("size", "2")
            .with_child(
                RawTree::new("Directory")
                    .with_attr("key", "1")
                    .with_attr("title", "TV Shows"),
            )
            .with_child(
                RawTree::new("Directory")
                    .with_attr("key", "2")
                    .with_attr("title", "Movies"),
            )
    }

    fn root(tree: RawTree, fetcher: Arc<MapFetcher>) -> Node {
        Arc::new(NodeFactory::new())
            .build_at(tree, fetcher, Some("/library/sections".into()))
            .unwrap()
    }

    // ── Navigation ──────────────────────────────────────────────────

    #[test]
    fn children_without_filter_builds_all() {
        let node = root(library(), Arc::default());
        let children = node.children(None).unwrap();
        assert_eq!(children.count(), 2);
        assert_eq!(children.get(0).unwrap().type_name(), "Directory");
    }

    #[test]
    fn child_lookup_is_case_insensitive() {
        let node = root(library(), Arc::default());
        for title in ["Movies", "movies", "MOVIES"] {
            let child = node.child(title).unwrap().unwrap();
            assert_eq!(child.title(), Some("Movies"));
            assert_eq!(child.type_name(), "Directory");
        }
        assert!(node.child("Nonexistent").unwrap().is_none());
    }

    #[test]
    fn filter_matches_literal_type_name() {
        let tree = library().with_child(RawTree::new("Hub").with_attr("title", "On Deck"));
        let node = root(tree, Arc::default());
        assert_eq!(node.children(Some("Directory")).unwrap().count(), 2);
        assert_eq!(node.children(Some("Hub")).unwrap().count(), 1);
        // Type names are not folded.
        assert_eq!(node.children(Some("directory")).unwrap().count(), 0);
    }

    #[test]
    fn no_children_or_no_match_is_empty() {
        let leaf = root(RawTree::new("Video").with_attr("title", "Endgame"), Arc::default());
        assert!(!leaf.has_children());
        assert!(leaf.children(Some("anything")).unwrap().is_empty());
        assert!(leaf.children(None).unwrap().is_empty());

        let node = root(library(), Arc::default());
        assert_eq!(node.children(Some("nonexistent-title")).unwrap().count(), 0);
    }

    #[test]
    fn unregistered_child_fails_only_when_built() {
        let tree = library().with_child(RawTree::new("Weirdtype").with_attr("title", "odd"));
        let node = root(tree, Arc::default());

        assert!(matches!(
            node.children(None),
            Err(CoreError::UnregisteredNodeType { .. })
        ));
        // A filter that skips the unknown element never builds it.
        assert_eq!(node.children(Some("movies")).unwrap().count(), 1);
    }

    #[test]
    fn session_detection_reads_raw_children() {
        let video = RawTree::new("Video").with_child(RawTree::new("TranscodeSession"));
        assert!(root(video, Arc::default()).is_session());

        let titled = RawTree::new("Video").with_child(RawTree::new("Player").with_attr("title", "user"));
        assert!(root(titled, Arc::default()).is_session());

        let plain = RawTree::new("Video").with_child(RawTree::new("Media"));
        assert!(!root(plain, Arc::default()).is_session());
    }

    #[test]
    fn key_requires_key_attribute() {
        let node = root(library(), Arc::default());
        assert!(!node.has_key());
        assert!(matches!(
            node.key(),
            Err(CoreError::MissingKey { ref type_name }) if type_name == "MediaContainer"
        ));

        let movies = node.child("movies").unwrap().unwrap();
        assert!(movies.has_key());
        assert_eq!(movies.key().unwrap(), "2");
    }

    #[test]
    fn display_prefers_title() {
        let node = root(library(), Arc::default());
        assert_eq!(node.to_string(), "MediaContainer");
        assert_eq!(node.child("movies").unwrap().unwrap().to_string(), "Movies");
    }

    #[test]
    fn detail_snapshot_serializes_tree() {
        let node = root(library(), Arc::default());
        let json = node.to_json();
        assert_eq!(json["name"], "MediaContainer");
        assert_eq!(json["attributes"]["size"], "2");
        assert_eq!(json["children"][1]["attributes"]["title"], "Movies");
    }

    // ── Loading ─────────────────────────────────────────────────────

    fn movies_listing() -> RawTree {
        RawTree::new("MediaContainer")
            .with_attr("title1", "Movies")
            .with_attr("viewGroup", "movie")
            .with_child(
                RawTree::new("Video")
                    .with_attr("key", "/library/metadata/7459")
                    .with_attr("title", "Endgame")
                    .with_attr("addedAt", "1427997393"),
            )
    }

    #[tokio::test]
    async fn load_without_key_is_a_no_op() {
        let fetcher = Arc::new(MapFetcher::default());
        let mut node = root(library(), Arc::clone(&fetcher));
        let before = node.detail().attributes;

        node.load().await.unwrap();

        assert!(fetcher.calls().is_empty());
        assert_eq!(node.detail().attributes, before);
        assert_eq!(node.children(None).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn load_replaces_attributes_and_children() {
        let fetcher = Arc::new(MapFetcher::default().with("/library/sections/2", movies_listing()));
        let node = root(library(), Arc::clone(&fetcher));
        let mut movies = node.child("Movies").unwrap().unwrap();
        assert!(!movies.has_children());

        movies.load().await.unwrap();

        assert_eq!(fetcher.calls(), ["/library/sections/2"]);
        assert_eq!(movies.type_name(), "Directory");
        assert_eq!(movies.get("viewGroup"), Some("movie"));
        // Replaced, not merged.
        assert_eq!(movies.get("key"), None);
        assert_eq!(movies.source_path(), Some("/library/sections/2"));

        let endgame = movies.child("endgame").unwrap().unwrap();
        assert_eq!(endgame.added_at().unwrap().timestamp(), 1_427_997_393);
    }

    #[tokio::test]
    async fn load_twice_refetches_with_same_result() {
        let video = RawTree::new("Video").with_attr("key", "/library/metadata/7459");
        let detail = RawTree::new("MediaContainer")
            .with_attr("key", "/library/metadata/7459")
            .with_child(RawTree::new("Video").with_attr("title", "Endgame"));
        let fetcher = Arc::new(MapFetcher::default().with("/library/metadata/7459", detail));
        let mut node = root(video, Arc::clone(&fetcher));

        node.load().await.unwrap();
        let once = node.to_json();
        node.load().await.unwrap();

        assert_eq!(fetcher.calls().len(), 2);
        assert_eq!(node.to_json(), once);
    }

    #[tokio::test]
    async fn load_reruns_derivation() {
        let stub = RawTree::new("Video")
            .with_attr("key", "/status/sessions/1")
            .with_attr("addedAt", "100");
        let fresh = RawTree::new("Video")
            .with_attr("viewOffset", "250")
            .with_attr("duration", "1000")
            .with_child(RawTree::new("User").with_attr("title", "jo"));
        let fetcher = Arc::new(MapFetcher::default().with("/status/sessions/1", fresh));
        let mut node = root(stub, fetcher);
        assert!(node.added_at().is_some());

        node.load().await.unwrap();

        assert_eq!(node.progress(), Some(25.0));
        assert!(node.added_at().is_none());
    }

    #[tokio::test]
    async fn load_forwards_fetch_errors() {
        let video = RawTree::new("Video").with_attr("key", "/library/metadata/404");
        let mut node = root(video, Arc::default());

        let err = node.load().await.unwrap_err();
        assert!(matches!(err, CoreError::Api { status: Some(404), .. }));
        // Failed loads leave the node untouched.
        assert_eq!(node.get("key"), Some("/library/metadata/404"));
    }

    #[test]
    fn derived_values_are_not_raw_text() {
        let video = RawTree::new("Video")
            .with_attr("viewOffset", "500")
            .with_attr("duration", "1000")
            .with_attr("addedAt", "1427997393")
            .with_child(RawTree::new("User").with_attr("title", "jo"));
        let node = root(video, Arc::default());

        assert_eq!(node.get("progress"), None);
        assert_eq!(node.attributes().float("progress"), Some(50.0));
        assert_eq!(node.progress(), Some(50.0));
        assert_eq!(node.get("addedAtDateTime"), None);
        assert!(node.attributes().value("addedAtDateTime").is_some());
        assert_eq!(node.get("addedAt"), Some("1427997393"));
    }
}

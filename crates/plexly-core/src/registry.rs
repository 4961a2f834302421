// ── Node type registry ──
//
// Maps an element's type name (`Video`, `Directory`, ...) to the variant
// that interprets it. Variants differ only in the derived attributes they
// add after construction. The set is open: callers register extra type
// names before building, and the last registration for a name wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use plexly_api::RawTree;
use tracing::trace;

use crate::attributes::AttributeValue;
use crate::error::CoreError;
use crate::fetch::Fetcher;
use crate::node::Node;

/// Coarse classification of a node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    PlayableItem,
    Folder,
    Container,
}

/// Behaviour attached to a registered type name.
pub trait NodeVariant: Send + Sync {
    fn kind(&self) -> NodeKind;

    /// Add derived attributes. Runs at construction and after every
    /// successful `load()`, always against freshly replaced raw attributes.
    fn derive(&self, _node: &mut Node) {}
}

// ── Built-in variants ───────────────────────────────────────────────

/// Videos, tracks, photos and their media/tag sub-elements.
///
/// Session nodes (those with a `User` or `TranscodeSession` child) get a
/// `progress` percentage from `viewOffset / duration`. `addedAt` and
/// `updatedAt` get parsed `addedAtDateTime` / `updatedAtDateTime` siblings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayableItem;

impl NodeVariant for PlayableItem {
    fn kind(&self) -> NodeKind {
        NodeKind::PlayableItem
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn derive(&self, node: &mut Node) {
        if node.attributes().contains("viewOffset") && node.is_session() {
            let attrs = node.attributes();
            let progress = match (attrs.parse_int("viewOffset"), attrs.parse_int("duration")) {
                (Some(offset), Some(duration)) if duration > 0 => {
                    AttributeValue::Float(offset as f64 / duration as f64 * 100.0)
                }
                _ => AttributeValue::Absent,
            };
            node.set_derived("progress", progress);
        }

        for (raw, derived) in [
            ("addedAt", "addedAtDateTime"),
            ("updatedAt", "updatedAtDateTime"),
        ] {
            if node.attributes().contains(raw) {
                let value = node
                    .attributes()
                    .parse_timestamp(raw)
                    .map_or(AttributeValue::Absent, AttributeValue::Timestamp);
                node.set_derived(derived, value);
            }
        }
    }
}

/// Library sections, shows, seasons, albums.
#[derive(Debug, Clone, Copy, Default)]
pub struct Folder;

impl NodeVariant for Folder {
    fn kind(&self) -> NodeKind {
        NodeKind::Folder
    }
}

/// Catalog roots and structural elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Container;

impl NodeVariant for Container {
    fn kind(&self) -> NodeKind {
        NodeKind::Container
    }
}

const PLAYABLE_TYPES: &[&str] = &[
    "Video",
    "Track",
    "Photo",
    "Media",
    "Part",
    "Country",
    "Genre",
    "Director",
    "Writer",
    "Role",
    "Producer",
    "Collection",
    "Label",
];

const CONTAINER_TYPES: &[&str] = &[
    "MediaContainer",
    "User",
    "Player",
    "Session",
    "TranscodeSession",
    "Stream",
    "Location",
    "Server",
    "Hub",
];

// ── Factory ─────────────────────────────────────────────────────────

/// Registry of node variants keyed by exact type name.
#[derive(Clone)]
pub struct NodeFactory {
    variants: HashMap<String, Arc<dyn NodeVariant>>,
}

impl Default for NodeFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        for name in PLAYABLE_TYPES {
            factory.register(*name, Arc::new(PlayableItem));
        }
        for name in CONTAINER_TYPES {
            factory.register(*name, Arc::new(Container));
        }
        factory.register("Directory", Arc::new(Folder));
        factory
    }
}

impl fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeFactory")
            .field("type_names", &self.type_names())
            .finish()
    }
}

impl NodeFactory {
    /// Factory with every built-in variant registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with nothing registered.
    pub fn empty() -> Self {
        Self {
            variants: HashMap::new(),
        }
    }

    /// Register a variant for a type name, returning the one it replaced.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        variant: Arc<dyn NodeVariant>,
    ) -> Option<Arc<dyn NodeVariant>> {
        self.variants.insert(type_name.into(), variant)
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.variants.contains_key(type_name)
    }

    pub fn kind_of(&self, type_name: &str) -> Option<NodeKind> {
        self.variants.get(type_name).map(|v| v.kind())
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a root node from a fetched tree.
    pub fn build(
        self: &Arc<Self>,
        raw: RawTree,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Node, CoreError> {
        self.build_at(raw, fetcher, None)
    }

    /// Build a node, remembering the path its tree was fetched from so
    /// relative keys can be resolved on `load()`.
    pub fn build_at(
        self: &Arc<Self>,
        raw: RawTree,
        fetcher: Arc<dyn Fetcher>,
        source_path: Option<String>,
    ) -> Result<Node, CoreError> {
        let variant = self
            .variants
            .get(&raw.name)
            .cloned()
            .ok_or_else(|| CoreError::UnregisteredNodeType {
                type_name: raw.name.clone(),
            })?;
        trace!(type_name = %raw.name, kind = %variant.kind(), "building node");

        Ok(Node::assemble(
            raw,
            variant,
            fetcher,
            Arc::clone(self),
            source_path,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl Fetcher for Offline {
        async fn fetch(&self, path: &str) -> Result<RawTree, CoreError> {
            Err(CoreError::Internal(format!("offline: {path}")))
        }
    }

    fn build(factory: NodeFactory, raw: RawTree) -> Result<Node, CoreError> {
        Arc::new(factory).build(raw, Arc::new(Offline))
    }

    #[test]
    fn builtins_cover_common_elements() {
        let factory = NodeFactory::new();
        assert_eq!(factory.kind_of("Video"), Some(NodeKind::PlayableItem));
        assert_eq!(factory.kind_of("Directory"), Some(NodeKind::Folder));
        assert_eq!(factory.kind_of("MediaContainer"), Some(NodeKind::Container));
        assert_eq!(factory.kind_of("TranscodeSession"), Some(NodeKind::Container));
        assert!(!factory.is_registered("video"));
    }

    #[test]
    fn build_keeps_type_name() {
        for name in ["Video", "Directory", "MediaContainer", "Genre"] {
            let node = build(NodeFactory::new(), RawTree::new(name)).unwrap();
            assert_eq!(node.type_name(), name);
        }
    }

    #[test]
    fn unregistered_type_is_a_hard_failure() {
        let err = build(NodeFactory::new(), RawTree::new("Weirdtype")).unwrap_err();
        assert!(
            matches!(err, CoreError::UnregisteredNodeType { ref type_name } if type_name == "Weirdtype")
        );
    }

    #[test]
    fn register_extends_and_last_write_wins() {
        let mut factory = NodeFactory::empty();
        assert!(factory.register("Weirdtype", Arc::new(Folder)).is_none());
        let replaced = factory.register("Weirdtype", Arc::new(PlayableItem));
        assert_eq!(replaced.unwrap().kind(), NodeKind::Folder);
        assert_eq!(factory.kind_of("Weirdtype"), Some(NodeKind::PlayableItem));

        let node = build(factory, RawTree::new("Weirdtype")).unwrap();
        assert_eq!(node.kind(), NodeKind::PlayableItem);
    }

    #[test]
    fn session_video_gets_progress() {
        let raw = RawTree::new("Video")
            .with_attr("viewOffset", "500")
            .with_attr("duration", "1000")
            .with_child(RawTree::new("User").with_attr("title", "jo"));
        let node = build(NodeFactory::new(), raw).unwrap();
        assert_eq!(node.progress(), Some(50.0));
    }

    #[test]
    fn non_session_video_has_no_progress() {
        let raw = RawTree::new("Video")
            .with_attr("viewOffset", "500")
            .with_attr("duration", "1000");
        let node = build(NodeFactory::new(), raw).unwrap();
        assert!(!node.attributes().contains("progress"));
    }

    #[test]
    fn zero_duration_progress_is_absent() {
        let raw = RawTree::new("Video")
            .with_attr("viewOffset", "500")
            .with_attr("duration", "0")
            .with_child(RawTree::new("TranscodeSession"));
        let node = build(NodeFactory::new(), raw).unwrap();
        assert!(node.attributes().value("progress").unwrap().is_absent());
        assert_eq!(node.progress(), None);
    }

    #[test]
    fn dates_are_derived_when_present() {
        let raw = RawTree::new("Video")
            .with_attr("addedAt", "1427997393")
            .with_attr("updatedAt", "not-a-date");
        let node = build(NodeFactory::new(), raw).unwrap();

        assert_eq!(node.added_at().unwrap().timestamp(), 1_427_997_393);
        assert!(node
            .attributes()
            .value("updatedAtDateTime")
            .unwrap()
            .is_absent());
        assert_eq!(node.updated_at(), None);
    }

    #[test]
    fn folders_derive_nothing() {
        let raw = RawTree::new("Directory").with_attr("addedAt", "1427997393");
        let node = build(NodeFactory::new(), raw).unwrap();
        assert!(!node.attributes().contains("addedAtDateTime"));
        assert_eq!(node.attributes().len(), 1);
    }
}

// ── Node collection ──
//
// Ordered group of nodes produced by one children query. Each query makes
// a fresh collection; `load_all` mutates members in place.

use std::fmt;

use futures_util::future::try_join_all;
use tracing::debug;

use crate::error::CoreError;
use crate::node::Node;

#[derive(Debug, Clone, Default)]
pub struct NodeCollection {
    nodes: Vec<Node>,
}

impl NodeCollection {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Node, CoreError> {
        let len = self.nodes.len();
        self.nodes
            .get(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Node, CoreError> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })
    }

    pub fn first(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }

    /// Deep-load every member.
    ///
    /// Fetches run concurrently on the calling task. The first error is
    /// returned and the remaining fetches are dropped with the future.
    pub async fn load_all(&mut self) -> Result<&mut Self, CoreError> {
        debug!(count = self.nodes.len(), "loading collection");
        try_join_all(self.nodes.iter_mut().map(|node| node.load())).await?;
        Ok(self)
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }
}

impl IntoIterator for NodeCollection {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeCollection {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Display for NodeCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use plexly_api::RawTree;

    use super::*;
    use crate::fetch::Fetcher;
    use crate::registry::NodeFactory;

    /// Echoes the requested path back as a `title` attribute.
    #[derive(Default)]
    struct EchoFetcher {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(&self, path: &str) -> Result<RawTree, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(path) {
                return Err(CoreError::Timeout { timeout_secs: 30 });
            }
            Ok(RawTree::new("MediaContainer").with_attr("title", format!("loaded {path}")))
        }
    }

    fn collection(fetcher: Arc<EchoFetcher>) -> NodeCollection {
        let tree = RawTree::new("MediaContainer")
            .with_child(
                RawTree::new("Directory")
                    .with_attr("key", "/library/sections/1")
                    .with_attr("title", "TV Shows"),
            )
            .with_child(RawTree::new("Directory").with_attr("title", "Keyless"))
            .with_child(
                RawTree::new("Directory")
                    .with_attr("key", "/library/sections/2")
                    .with_attr("title", "Movies"),
            );
        Arc::new(NodeFactory::new())
            .build(tree, fetcher)
            .unwrap()
            .children(None)
            .unwrap()
    }

    #[test]
    fn indexing_is_bounds_checked() {
        let c = collection(Arc::default());
        assert_eq!(c.count(), 3);
        assert_eq!(c.get(2).unwrap().title(), Some("Movies"));
        assert!(matches!(
            c.get(3),
            Err(CoreError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn display_joins_members() {
        let c = collection(Arc::default());
        assert_eq!(c.to_string(), "TV Shows, Keyless, Movies");
        assert_eq!(NodeCollection::default().to_string(), "");
    }

    #[tokio::test]
    async fn load_all_loads_every_keyed_member() {
        let fetcher = Arc::new(EchoFetcher::default());
        let mut c = collection(Arc::clone(&fetcher));

        c.load_all().await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(c.count(), 3);
        assert_eq!(c.get(0).unwrap().title(), Some("loaded /library/sections/1"));
        assert_eq!(c.get(1).unwrap().title(), Some("Keyless"));
        assert_eq!(c.get(2).unwrap().title(), Some("loaded /library/sections/2"));
    }

    #[tokio::test]
    async fn load_all_surfaces_member_errors() {
        let fetcher = Arc::new(EchoFetcher {
            fail_on: Some("/library/sections/2"),
            ..EchoFetcher::default()
        });
        let mut c = collection(fetcher);

        let err = c.load_all().await.unwrap_err();
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 30 }));
    }
}

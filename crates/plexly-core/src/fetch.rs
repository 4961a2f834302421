// ── Fetcher capability ──
//
// The single seam between the node model and the network. Every node built
// during a session holds a shared handle to one fetcher, so any node at any
// depth can deep-load itself.

use async_trait::async_trait;
use plexly_api::{RawTree, ServerClient};

use crate::error::CoreError;

/// Retrieve a fresh response tree for a server path.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<RawTree, CoreError>;
}

#[async_trait]
impl Fetcher for ServerClient {
    async fn fetch(&self, path: &str) -> Result<RawTree, CoreError> {
        Ok(self.get_tree(path).await?)
    }
}

/// Resolve a node key against the path its tree was fetched from.
///
/// Absolute paths and URLs are returned unchanged. Relative keys such as
/// `"1"` under `/library/sections` become `/library/sections/1`.
pub fn resolve_key(key: &str, source_path: Option<&str>) -> String {
    if key.starts_with('/') || key.starts_with("http://") || key.starts_with("https://") {
        return key.to_owned();
    }
    match source_path {
        Some(base) => {
            let base = base.split('?').next().unwrap_or(base);
            format!("{}/{key}", base.trim_end_matches('/'))
        }
        None => format!("/{key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_keys_pass_through() {
        assert_eq!(
            resolve_key("/library/metadata/7459", Some("/library/sections/2/all")),
            "/library/metadata/7459"
        );
        assert_eq!(
            resolve_key("https://other/sync/1", Some("/library")),
            "https://other/sync/1"
        );
    }

    #[test]
    fn relative_keys_join_source_path() {
        assert_eq!(resolve_key("1", Some("/library/sections")), "/library/sections/1");
        assert_eq!(resolve_key("all", Some("/library/sections/1/")), "/library/sections/1/all");
        assert_eq!(
            resolve_key("onDeck", Some("/library/sections/1?type=2")),
            "/library/sections/1/onDeck"
        );
    }

    #[test]
    fn relative_key_without_source_is_rooted() {
        assert_eq!(resolve_key("library", None), "/library");
    }
}

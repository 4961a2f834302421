// Named shortcuts over `Node::child` and `Node::children`.
//
// `show.season("Season 2")` reads better than `show.child("Season 2")`,
// but the two must never behave differently. Every alias here is a plain
// forward with no logic of its own.

use crate::collection::NodeCollection;
use crate::error::CoreError;
use crate::node::Node;

macro_rules! node_aliases {
    ($( $one:ident / $many:ident ),* $(,)?) => {
        impl Node {
            $(
                #[doc = concat!("Alias of [`Node::child`] for `", stringify!($one), "` lookups.")]
                pub fn $one(&self, title: &str) -> Result<Option<Node>, CoreError> {
                    self.child(title)
                }

                #[doc = concat!("Alias of [`Node::children`] for `", stringify!($many), "` listings.")]
                pub fn $many(&self, filter: Option<&str>) -> Result<NodeCollection, CoreError> {
                    self.children(filter)
                }
            )*
        }
    };
}

node_aliases! {
    section / sections,
    show / shows,
    season / seasons,
    episode / episodes,
    movie / movies,
    artist / artists,
    album / albums,
    track / tracks,
}

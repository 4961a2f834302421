// plexly-core: Navigable node model over Plex response trees
//
// Turns the raw trees returned by `plexly-api` into typed nodes that build
// their children lazily and deep-load themselves through a shared fetcher.
// Also hosts the plex.tv session and media-server handles the CLI drives.

pub mod attributes;
pub mod collection;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod model;
pub mod myplex;
pub mod node;
pub mod registry;
pub mod server;

mod aliases;

// ── Primary re-exports ──────────────────────────────────────────────
pub use attributes::{AttributeStore, AttributeValue};
pub use collection::NodeCollection;
pub use config::{ClientConfig, Credentials, TlsVerification};
pub use error::CoreError;
pub use fetch::Fetcher;
pub use myplex::MyPlex;
pub use node::{Node, NodeDetail};
pub use registry::{Container, Folder, NodeFactory, NodeKind, NodeVariant, PlayableItem};
pub use server::{DirectoryView, PlexServer};

pub use model::{Account, ServerInfo, Subscription};

// The response tree is part of the public construction surface.
pub use plexly_api::{PlexHeaders, RawTree};

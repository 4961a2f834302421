// plexly-api: Async Rust client for plex.tv and Plex Media Server endpoints
//
// Everything here speaks HTTP and XML. The response tree comes back as a
// `RawTree`; turning it into navigable nodes is `plexly-core`'s job.

pub mod error;
pub mod headers;
pub mod myplex;
pub mod server;
pub mod transport;
pub mod tree;

mod response;

pub use error::Error;
pub use headers::PlexHeaders;
pub use myplex::MyPlexClient;
pub use server::ServerClient;
pub use transport::{TlsMode, TransportConfig};
pub use tree::RawTree;

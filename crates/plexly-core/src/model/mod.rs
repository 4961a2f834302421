// ── Account and server domain types ──
//
// Plain data built from plex.tv responses. Navigable library content is
// not modelled here; it stays a `Node` tree.

pub mod account;
pub mod server;

pub use account::{Account, Subscription};
pub use server::ServerInfo;

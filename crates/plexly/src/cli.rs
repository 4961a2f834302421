//! Clap derive structures for the `plexly` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use plexly_core::DirectoryView;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// plexly -- browse Plex media servers from the command line
#[derive(Debug, Parser)]
#[command(
    name = "plexly",
    version,
    about = "Browse Plex media servers and plex.tv accounts from the command line",
    long_about = "Signs in to plex.tv, discovers the media servers registered to the\n\
        account, and walks their libraries, sections, and playback sessions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "PLEXLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "PLEXLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// plex.tv username or email (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// plex.tv authentication token (skips password sign-in)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PLEXLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "PLEXLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PLEXLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the signed-in plex.tv account
    #[command(alias = "whoami")]
    Account,

    /// List servers registered to the account
    #[command(alias = "srv")]
    Servers,

    /// List library sections on a server
    #[command(alias = "sec")]
    Sections(ServerArgs),

    /// List the items under a library path or section
    #[command(alias = "ls")]
    Browse(BrowseArgs),

    /// Show what is playing right now
    #[command(alias = "np")]
    Sessions(ServerArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Server selection shared by every server-bound command.
#[derive(Debug, Args)]
pub struct ServerArgs {
    /// Server name (case-insensitive); defaults to the profile's server
    #[arg(long, short = 's', env = "PLEXLY_SERVER")]
    pub server: Option<String>,
}

// ── Browse ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Absolute path (`/library/metadata/7424/children`) or a section
    /// id or title (`2`, `"TV Shows"`)
    pub path: String,

    #[command(flatten)]
    pub server: ServerArgs,

    /// Section view, when PATH names a section
    #[arg(long, default_value = "none")]
    pub view: ViewArg,

    /// Only items whose title or element type matches
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Load every listed item from its own key before printing
    #[arg(long, short = 'l')]
    pub load: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewArg {
    /// The section's own directory listing
    None,
    All,
    Unwatched,
    Newest,
    RecentlyAdded,
    RecentlyViewed,
    OnDeck,
    Folder,
}

impl From<ViewArg> for DirectoryView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::None => Self::None,
            ViewArg::All => Self::All,
            ViewArg::Unwatched => Self::Unwatched,
            ViewArg::Newest => Self::Newest,
            ViewArg::RecentlyAdded => Self::RecentlyAdded,
            ViewArg::RecentlyViewed => Self::RecentlyViewed,
            ViewArg::OnDeck => Self::OnDeck,
            ViewArg::Folder => Self::Folder,
        }
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the configuration with secrets masked
    Show,

    /// Store a profile's plex.tv password in the system keyring
    SetPassword,

    /// Store a profile's authentication token in the system keyring
    SetToken {
        /// Token value (prompted when omitted)
        token: Option<String>,
    },

    /// Set the default server for a profile
    SetServer {
        /// Server name as listed by `plexly servers`
        name: String,
    },

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use plexly_core::MyPlex;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a plex.tv session
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "plexly", &mut std::io::stdout());
            Ok(())
        }

        // All other commands sign in first
        cmd => {
            let cfg = config::load_config_or_default(&cli.global);
            let profile_name = config::active_profile_name(&cli.global, &cfg);
            let profile = config::active_profile(&cli.global, &cfg, &profile_name)?;
            let client_config = config::resolve_client_config(&profile, &profile_name, &cli.global)?;

            let mut plex = MyPlex::new(client_config)?;
            plex.sign_in()
                .await
                .map_err(|e| CliError::from(e).for_profile(&profile_name))?;

            let ctx = commands::Context::new(plex, profile.server.clone());
            tracing::debug!(command = ?cmd, profile = %profile_name, "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}

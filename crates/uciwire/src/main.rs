mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use uciwire_core::RemoteOverlay;

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
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a router connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "uciwire", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require a session with the router
        cmd => {
            let (profile_name, remote) = config::build_remote_config(&cli.global)?;
            let overlay = RemoteOverlay::connect(remote)
                .await
                .map_err(|e| CliError::from(e).for_profile(&profile_name))?;

            tracing::debug!(command = ?cmd, profile = %profile_name, "dispatching command");
            let result = commands::dispatch(cmd, &overlay, &cli.global).await;

            // Close the rpcd session whatever the command's outcome
            if let Err(e) = overlay.service().logout().await {
                tracing::warn!(error = %e, "failed to close router session");
            }

            result.map_err(|e| e.for_profile(&profile_name))
        }
    }
}

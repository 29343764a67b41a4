//! NAS panel backend.
//!
//! Main entry point for the panel CLI and server.

mod cli;
mod commands;
mod server;

use clap::Parser;

use naspanel_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_default() {
        Commands::Run { host, port } => {
            let mut config = ConfigLoader::load_or_default(&cli.config)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            server::init_tracing(&config.logging)?;
            server::run_server(config).await
        }
        Commands::CheckConfig => {
            if !commands::check_config(&cli.config)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::NextRuns { expr, count } => commands::next_runs(&cli.config, &expr, count),
    }
}

//! CLI definitions for the NAS panel.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// NAS panel CLI.
#[derive(Parser)]
#[command(name = "naspanel")]
#[command(about = "NAS administration panel backend")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        env = "NASPANEL_CONFIG",
        default_value = "/etc/nas-panel/config.toml",
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the server in foreground (default)
    Run {
        /// Server host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration file
    CheckConfig,

    /// Print the next fire times of a cron expression
    NextRuns {
        /// Cron expression, five or six fields
        expr: String,

        /// How many fire times to print
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            host: None,
            port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["naspanel"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "naspanel",
            "--config",
            "/tmp/panel.toml",
            "run",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/tmp/panel.toml"));
        match cli.command {
            Some(Commands::Run { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_next_runs_args() {
        let cli = Cli::try_parse_from(["naspanel", "next-runs", "*/5 * * * *", "-n", "3"]).unwrap();
        match cli.command {
            Some(Commands::NextRuns { expr, count }) => {
                assert_eq!(expr, "*/5 * * * *");
                assert_eq!(count, 3);
            }
            _ => panic!("expected next-runs command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["naspanel", "check-config", "-c", "panel.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("panel.toml"));
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }
}

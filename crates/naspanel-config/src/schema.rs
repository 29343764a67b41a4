//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub cron: CronConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Authentication gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bearer tokens accepted by the gate.
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tokens: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Scheduled command execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronConfig {
    /// Durable job list.
    #[serde(default = "default_jobs_file")]
    pub jobs_file: PathBuf,

    /// IANA time zone used to evaluate schedules.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Ceiling for every command run, in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Shell used as `<shell> -c <command>`.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Capacity of the job-due queue between triggers and the dispatcher.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            jobs_file: default_jobs_file(),
            timezone: default_timezone(),
            command_timeout_ms: default_command_timeout_ms(),
            shell: default_shell(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_jobs_file() -> PathBuf {
    PathBuf::from("/etc/nas-panel/cron-jobs.json")
}

fn default_timezone() -> String {
    "Europe/Warsaw".to_string()
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files. Console only when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.auth.enabled);
        assert!(config.auth.tokens.is_empty());
        assert_eq!(
            config.cron.jobs_file,
            PathBuf::from("/etc/nas-panel/cron-jobs.json")
        );
        assert_eq!(config.cron.queue_capacity, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let config: Config = toml::from_str("[cron]\ntimezone = \"UTC\"").unwrap();
        assert_eq!(config.cron.timezone, "UTC");
        assert_eq!(config.cron.shell, "sh");
        assert_eq!(config.cron.command_timeout_ms, 30_000);
    }
}

//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Self::finish(Config::default()));
        }
        Self::load(path)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(Self::finish(config))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
            field: "env".to_string(),
            message: e.to_string(),
        })?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn finish(mut config: Config) -> Config {
        config.cron.jobs_file = Self::expand_pathbuf(&config.cron.jobs_file);
        if let Some(dir) = config.logging.directory.take() {
            config.logging.directory = Some(Self::expand_pathbuf(&dir));
        }
        config
    }

    fn expand_pathbuf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cron.timezone, "Europe/Warsaw");
        assert_eq!(config.cron.command_timeout_ms, 30_000);
    }

    #[test]
    fn test_load_cron_section() {
        let content = r#"
            [cron]
            jobs_file = "/var/lib/nas-panel/jobs.json"
            timezone = "UTC"
            command_timeout_ms = 5000
            shell = "bash"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(
            config.cron.jobs_file,
            PathBuf::from("/var/lib/nas-panel/jobs.json")
        );
        assert_eq!(config.cron.timezone, "UTC");
        assert_eq!(config.cron.command_timeout_ms, 5000);
        assert_eq!(config.cron.shell, "bash");
    }

    #[test]
    fn test_load_auth_tokens() {
        let content = r#"
            [auth]
            tokens = ["first", "second"]
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(config.auth.enabled);
        assert_eq!(config.auth.tokens.len(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        writeln!(file, "port = 5000").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test-only variable name, not read anywhere else
        unsafe {
            std::env::set_var("NASPANEL_TEST_TOKEN", "s3cret");
        }
        let content = "[auth]\ntokens = [\"${NASPANEL_TEST_TOKEN}\"]";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.auth.tokens, vec!["s3cret".to_string()]);
        unsafe {
            std::env::remove_var("NASPANEL_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NASPANEL_UNSET_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_jobs_file_tilde_expanded() {
        let content = "[cron]\njobs_file = \"~/cron-jobs.json\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(!config.cron.jobs_file.to_string_lossy().starts_with('~'));
        assert!(config.cron.jobs_file.ends_with("cron-jobs.json"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        let path = "/etc/nas-panel";
        assert_eq!(ConfigLoader::expand_path(path), path);
    }
}

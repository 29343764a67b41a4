//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// One hour.
const LONG_TIMEOUT_MS: u64 = 3_600_000;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_auth(config, &mut result);
        Self::validate_cron(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_auth(config: &Config, result: &mut ValidationResult) {
        if !config.auth.enabled {
            result.add_warning(ValidationWarning::new(
                "auth.enabled",
                "Authentication is disabled, every route is reachable without a token",
            ));
            return;
        }

        if config.auth.tokens.is_empty() {
            result.add_error(ValidationError::new(
                "auth.tokens",
                "Authentication is enabled but no tokens are configured",
            ));
        }

        if config.auth.tokens.iter().any(|t| t.trim().is_empty()) {
            result.add_error(ValidationError::new(
                "auth.tokens",
                "Tokens cannot be empty strings",
            ));
        }
    }

    fn validate_cron(config: &Config, result: &mut ValidationResult) {
        let cron = &config.cron;

        if cron.jobs_file.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "cron.jobs_file",
                "jobs_file cannot be empty",
            ));
        }

        if cron.timezone.trim().is_empty() {
            result.add_error(ValidationError::new(
                "cron.timezone",
                "timezone cannot be empty",
            ));
        }

        if cron.command_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "cron.command_timeout_ms",
                "command_timeout_ms must be greater than 0",
            ));
        } else if cron.command_timeout_ms > LONG_TIMEOUT_MS {
            result.add_warning(ValidationWarning::new(
                "cron.command_timeout_ms",
                "command_timeout_ms is above one hour, hung commands will hold resources for long",
            ));
        }

        if cron.shell.trim().is_empty() {
            result.add_error(ValidationError::new("cron.shell", "shell cannot be empty"));
        }

        if cron.queue_capacity == 0 {
            result.add_error(ValidationError::new(
                "cron.queue_capacity",
                "queue_capacity must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

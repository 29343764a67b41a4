    use super::*;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.tokens = vec!["token".to_string()];
        config
    }

    #[test]
    fn test_validate_config_with_token() {
        let result = ConfigValidator::validate(&valid_config()).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_default_config_requires_tokens() {
        let result = ConfigValidator::validate(&Config::default()).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "auth.tokens"));
    }

    #[test]
    fn test_validate_auth_disabled_warns() {
        let mut config = Config::default();
        config.auth.enabled = false;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "auth.enabled"));
    }

    #[test]
    fn test_validate_blank_token() {
        let mut config = valid_config();
        config.auth.tokens.push("  ".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_invalid_port() {
        let mut config = valid_config();
        config.server.port = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "server.port"));
    }

    #[test]
    fn test_validate_empty_jobs_file() {
        let mut config = valid_config();
        config.cron.jobs_file = PathBuf::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "cron.jobs_file"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = valid_config();
        config.cron.command_timeout_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "cron.command_timeout_ms"));
    }

    #[test]
    fn test_validate_long_timeout_warning() {
        let mut config = valid_config();
        config.cron.command_timeout_ms = 2 * 3_600_000;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.path == "cron.command_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_timezone_and_shell() {
        let mut config = valid_config();
        config.cron.timezone = String::new();
        config.cron.shell = " ".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_validate_zero_queue_capacity() {
        let mut config = valid_config();
        config.cron.queue_capacity = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "cron.queue_capacity"));
    }

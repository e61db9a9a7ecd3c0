use super::schemas::Config;
/// Configuration utilities - loading and access helpers
///
/// The configuration is loaded and validated once at startup and then
/// stored in a process-wide cell. It is never reloaded while a cycle runs.
use once_cell::sync::OnceCell;
use std::path::Path;

/// Global configuration instance
pub static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load the configuration from the default path
pub fn load_config() -> Result<(), String> {
    let path = crate::paths::get_config_path();
    load_config_from_path(&path.to_string_lossy())
}

/// Load configuration from a specific file path and initialize the global
///
/// A missing file falls back to the schema defaults. The result is
/// validated before it is published.
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let config = if Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;
        parse_config(&contents).map_err(|e| format!("Config file '{}': {}", path, e))?
    } else {
        eprintln!("⚠️  Config file '{}' not found, using default values", path);
        Config::default()
    };

    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(())
}

/// Parse TOML text into a config without touching the global
pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Execute a function with read access to the configuration
///
/// Falls back to defaults when nothing was loaded, which only happens in
/// tests and tools that skip `load_config`.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(config) => f(config),
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reclaim.max_retries, 3);
        assert_eq!(config.reclaim.batch_size, 5);
        assert_eq!(config.reclaim.probation_period_days, 60);
        assert_eq!(config.reclaim.retry_backoff_ms, 1000);
        assert!(!config.reclaim.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = parse_config(
            r#"
            [reclaim]
            dry_run = true

            [telegram]
            enabled = true
            bot_token = "123:abc"
            chat_id = "-100200300"
            "#,
        )
        .unwrap();

        assert!(config.reclaim.dry_run);
        assert_eq!(config.reclaim.max_retries, 3);
        assert_eq!(config.rpc.url, "https://api.devnet.solana.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_fails_fast() {
        let mut config = Config::default();
        config.reclaim.max_retries = 0;
        assert!(config.validate().unwrap_err().contains("max_retries"));

        let mut config = Config::default();
        config.operator.address = "not-a-key".to_string();
        assert!(config.validate().unwrap_err().contains("operator.address"));

        let mut config = Config::default();
        config.telegram.enabled = true;
        assert!(config.validate().unwrap_err().contains("bot_token"));

        let mut config = Config::default();
        config.rpc.url = "ftp://example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_types_rejected() {
        assert!(parse_config("[reclaim]\nmax_retries = \"three\"").is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip_file() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[reclaim]"));
        assert!(toml_str.contains("[scheduler]"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_str.as_bytes()).unwrap();
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(parse_config(&contents).unwrap(), config);
    }
}

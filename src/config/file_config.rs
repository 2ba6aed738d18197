//! Configuration file support for paper-insight.
//!
//! This module provides TOML configuration file parsing with support
//! for environment variable overrides.
//!
//! # Configuration File Format
//!
//! ```toml
//! [search]
//! base_url = "http://export.arxiv.org/api/query"
//! max_results = 5
//! timeout_secs = 10
//! max_retries = 3
//! backoff_factor = 2.0
//! abstract_char_limit = 1500
//!
//! [summarizer]
//! enabled = true
//! model = "facebook/bart-large-cnn"
//! endpoint = "https://api-inference.huggingface.co"
//!
//! [insight]
//! enabled = true
//! model = "mistralai/Mixtral-8x7B-Instruct-v0.1"
//! endpoint = "https://router.huggingface.co/v1"
//! max_tokens = 300
//! temperature = 0.7
//!
//! [logging]
//! level = "info"
//! format = "plain"
//! ```
//!
//! Any key can be overridden from the environment as
//! `PAPER_INSIGHT__<SECTION>__<KEY>`, e.g. `PAPER_INSIGHT__SEARCH__MAX_RETRIES=5`.
//! Credentials are not part of this file; see
//! [`Credentials`](super::Credentials).

use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "paper-insight.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PAPER_INSIGHT";

/// Load configuration from an optional TOML file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigFileError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigFileError::Io(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Find a configuration file in the default locations
///
/// Checks `./paper-insight.toml`, then `<config dir>/paper-insight/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}

/// Save configuration to a TOML file, creating parent directories
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Load error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let toml_content = r#"
[search]
max_results = 8
backoff_factor = 1.5
abstract_char_limit = 0

[summarizer]
enabled = false

[insight]
model = "meta-llama/Llama-3.1-8B-Instruct"
temperature = 0.2

[logging]
format = "json"
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.search.max_results, 8);
        assert_eq!(config.search.backoff_factor, 1.5);
        assert_eq!(config.search.abstract_char_limit, 0);
        // Untouched keys keep their defaults
        assert_eq!(config.search.timeout_secs, 10);
        assert!(!config.summarizer.enabled);
        assert_eq!(config.summarizer.model, "facebook/bart-large-cnn");
        assert_eq!(config.insight.model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.insight.temperature, 0.2);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.search.max_results = 12;
        config.insight.enabled = false;

        save_config(&config, &path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.search.max_results, 12);
        assert!(!loaded.insight.enabled);
        assert_eq!(loaded.summarizer.model, config.summarizer.model);
        assert_eq!(loaded.insight.endpoint, config.insight.endpoint);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/config.toml");
        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigFileError::Io(_))));
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        let result = load_config(Some(&path));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[search]\nbase_url = \"::nope::\"\n").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigFileError::Invalid(_))));
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("PAPER_INSIGHT__SUMMARIZER__TIMEOUT_SECS", "17");
        let config = load_config(None).unwrap();
        std::env::remove_var("PAPER_INSIGHT__SUMMARIZER__TIMEOUT_SECS");

        assert_eq!(config.summarizer.timeout_secs, 17);
    }
}

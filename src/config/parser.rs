use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `primary.base-url`
pub const ENV_BASE_URL: &str = "LINKSCOUT_SCRAPE_BASE_URL";

/// Environment variable overriding `primary.api-key`
pub const ENV_API_KEY: &str = "LINKSCOUT_SCRAPE_API_KEY";

/// Environment variable toggling the primary scrape stage (`false` disables it)
pub const ENV_ENABLED: &str = "LINKSCOUT_SCRAPE_ENABLED";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied before validation, so an override that
/// produces an invalid configuration is reported just like a bad file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use link_scout::config::load_config;
///
/// let config = load_config(Path::new("link-scout.toml")).unwrap();
/// println!("Scrape service: {}", config.primary.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from a TOML string without touching the environment
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Applies environment overrides to a configuration
///
/// The lookup function is injected so callers (and tests) decide where the
/// values come from.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.primary.base_url = base_url.trim().to_string();
    }

    if let Some(api_key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        config.primary.api_key = Some(api_key.trim().to_string());
    }

    if let Some(enabled) = lookup(ENV_ENABLED) {
        config.primary.enabled = !enabled.trim().eq_ignore_ascii_case("false");
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so operators can tell which configuration a running
/// process picked up.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

//! Configuration module for Link-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus the environment overrides for the primary scrape service.
//!
//! # Example
//!
//! ```no_run
//! use link_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-scout.toml")).unwrap();
//! println!("Max retries: {}", config.retry.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CircuitBreakerConfig, Config, HttpConfig, PacingConfig, PrimaryConfig, RateLimitConfig,
    RetryProfile, SecurityConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, parse_config,
    ENV_API_KEY, ENV_BASE_URL, ENV_ENABLED,
};
pub use validation::validate;

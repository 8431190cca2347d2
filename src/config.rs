// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Configuration loaded from environment variables.

use std::env;

/// Default cap on username probe attempts.
pub const DEFAULT_USERNAME_PROBE_LIMIT: u32 = 1000;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project hosting the Firestore database
    pub gcp_project_id: String,
    /// Maximum number of candidates tried by the username probe
    pub username_probe_limit: u32,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            username_probe_limit: DEFAULT_USERNAME_PROBE_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let username_probe_limit = match env::var("USERNAME_PROBE_LIMIT") {
            Ok(raw) => parse_probe_limit(&raw)?,
            Err(_) => DEFAULT_USERNAME_PROBE_LIMIT,
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            username_probe_limit,
        })
    }
}

fn parse_probe_limit(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ConfigError::Invalid {
            name: "USERNAME_PROBE_LIMIT",
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("GCP_PROJECT_ID", "users-test");
        env::set_var("USERNAME_PROBE_LIMIT", "25");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gcp_project_id, "users-test");
        assert_eq!(config.username_probe_limit, 25);

        env::remove_var("USERNAME_PROBE_LIMIT");
    }

    #[test]
    fn test_probe_limit_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_probe_limit("0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            parse_probe_limit("lots"),
            Err(ConfigError::Invalid { .. })
        ));
        assert_eq!(parse_probe_limit(" 7 ").unwrap(), 7);
    }
}

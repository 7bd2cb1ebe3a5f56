//! Configuration Module
//!
//! Cache budgets and server settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{DEFAULT_BYTE_BUDGET, DEFAULT_RESPONSE_BUDGET_MB};

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget of the byte-budget TTL cache
    pub byte_cache_max_bytes: usize,
    /// Estimated-memory budget of the response cache, in MiB
    pub response_cache_max_mb: f64,
    /// TTL in seconds for byte cache writes that do not carry one
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BYTE_CACHE_MAX_BYTES` - Byte cache budget (default: 1048576)
    /// - `RESPONSE_CACHE_MAX_MB` - Response cache budget in MiB (default: 4.0)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// Missing or unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            byte_cache_max_bytes: env_or("BYTE_CACHE_MAX_BYTES", defaults.byte_cache_max_bytes),
            response_cache_max_mb: env_or("RESPONSE_CACHE_MAX_MB", defaults.response_cache_max_mb),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            byte_cache_max_bytes: DEFAULT_BYTE_BUDGET,
            response_cache_max_mb: DEFAULT_RESPONSE_BUDGET_MB,
            default_ttl: 300,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.byte_cache_max_bytes, 1_048_576);
        assert_eq!(config.response_cache_max_mb, 4.0);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_from_env_overrides_and_fallbacks() {
        env::set_var("BYTE_CACHE_MAX_BYTES", "2048");
        env::set_var("RESPONSE_CACHE_MAX_MB", "0.5");
        env::set_var("DEFAULT_TTL", "not-a-number");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.byte_cache_max_bytes, 2048);
        assert_eq!(config.response_cache_max_mb, 0.5);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 3000);

        env::remove_var("BYTE_CACHE_MAX_BYTES");
        env::remove_var("RESPONSE_CACHE_MAX_MB");
        env::remove_var("DEFAULT_TTL");
    }
}

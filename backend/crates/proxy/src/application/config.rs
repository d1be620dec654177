//! Proxy Configuration

use platform::config::{EnvError, env_or, env_parse};
use std::time::Duration;

/// 5 GiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Proxy gateway configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream API base URL
    pub upstream_base_url: String,
    /// Overall upstream timeout; `None` keeps the transport default
    pub upstream_timeout: Option<Duration>,
    /// Hard ceiling for dataset uploads, checked before forwarding
    pub max_upload_bytes: u64,
    /// Largest body accepted on forwarding routes
    pub max_json_bytes: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_base_url: "http://localhost:8000".to_string(),
            upstream_timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_json_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ProxyConfig {
    /// Read `UPSTREAM_BASE_URL`, `UPSTREAM_TIMEOUT_SECS` and `MAX_UPLOAD_BYTES`
    pub fn from_env() -> Result<Self, EnvError> {
        let defaults = Self::default();
        // 0 means no overall timeout
        let timeout_secs: u64 = env_parse("UPSTREAM_TIMEOUT_SECS", 0)?;
        let upstream_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(Self {
            upstream_base_url: env_or("UPSTREAM_BASE_URL", &defaults.upstream_base_url),
            upstream_timeout,
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            ..defaults
        })
    }

    /// Config for development (local upstream, short timeout)
    pub fn development() -> Self {
        Self {
            upstream_timeout: Some(Duration::from_secs(30)),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling_is_five_gib() {
        assert_eq!(ProxyConfig::default().max_upload_bytes, 5_368_709_120);
    }

    #[test]
    fn test_development_sets_timeout_only() {
        let config = ProxyConfig::development();
        assert_eq!(config.upstream_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}

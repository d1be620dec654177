//! Client Configuration

use platform::config::{EnvError, env_bool, env_opt, env_or};
use std::path::PathBuf;

/// Request Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Route every call through the local proxy gateway instead of calling
    /// the upstream API directly. Only the base URL changes.
    pub use_proxy: bool,
    /// Proxy gateway base URL (e.g. `http://localhost:31113/api`)
    pub proxy_base_url: String,
    /// Upstream API base URL
    pub upstream_base_url: String,
    /// Refresh endpoint, relative to the base URL
    pub refresh_path: String,
    /// Login endpoint, relative to the base URL
    pub login_path: String,
    /// Where the user is sent after an unrecoverable auth failure
    pub sign_in_path: String,
    /// File backing the session when a file store is used
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            use_proxy: true,
            proxy_base_url: "http://localhost:31113/api".to_string(),
            upstream_base_url: "http://localhost:8000".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            login_path: "/auth/login".to_string(),
            sign_in_path: "/sign-in".to_string(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Read `USE_PROXY`, `PROXY_BASE_URL`, `UPSTREAM_BASE_URL`,
    /// `SIGN_IN_PATH` and `SESSION_FILE`
    pub fn from_env() -> Result<Self, EnvError> {
        let defaults = Self::default();
        Ok(Self {
            use_proxy: env_bool("USE_PROXY", defaults.use_proxy)?,
            proxy_base_url: env_or("PROXY_BASE_URL", &defaults.proxy_base_url),
            upstream_base_url: env_or("UPSTREAM_BASE_URL", &defaults.upstream_base_url),
            sign_in_path: env_or("SIGN_IN_PATH", &defaults.sign_in_path),
            session_file: env_opt("SESSION_FILE").map(PathBuf::from),
            ..defaults
        })
    }

    /// Config that talks straight to `base_url` (tests, scripts)
    pub fn direct(base_url: impl Into<String>) -> Self {
        Self {
            use_proxy: false,
            upstream_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL selected by the proxy switch
    pub fn base_url(&self) -> &str {
        if self.use_proxy {
            &self.proxy_base_url
        } else {
            &self.upstream_base_url
        }
    }
}

//! Environment configuration helpers
//!
//! Thin typed readers over `std::env`. The binary loads `.env` with
//! `dotenvy` before any of these run.

use std::env;
use std::str::FromStr;

/// Invalid environment value
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid value for {key}: {value:?}")]
pub struct EnvError {
    pub key: String,
    pub value: String,
}

/// String variable with a default
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Optional string variable (blank counts as unset)
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parsed variable with a default
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, EnvError> {
    match env_opt(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| EnvError {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// Boolean variable: `1/true/yes/on` and `0/false/no/off`
pub fn env_bool(key: &str, default: bool) -> Result<bool, EnvError> {
    match env_opt(key) {
        None => Ok(default),
        Some(raw) => parse_bool(&raw).ok_or(EnvError {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// Parse the boolean spellings accepted by [`env_bool`]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Comma separated list; empty items are dropped
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

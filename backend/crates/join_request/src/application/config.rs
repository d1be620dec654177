//! Join Request Configuration

use http::HeaderValue;
use platform::config::{EnvError, env_opt, env_parse};
use std::time::Duration;

/// Orchestrator and reconcile worker configuration
#[derive(Debug, Clone)]
pub struct JoinRequestConfig {
    /// How often the worker drains the outbox
    pub poll_interval: Duration,
    /// Attempts (including the inline one) before an entry is abandoned
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt
    pub base_backoff: Duration,
    /// Upper bound for the retry delay
    pub max_backoff: Duration,
    /// Entries handled per worker pass
    pub batch_size: usize,
    /// Bearer token the worker authenticates with; without it nothing is
    /// retried
    pub service_token: Option<String>,
    /// How long reconciled entries are kept before purge
    pub done_retention: Duration,
}

impl Default for JoinRequestConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            max_attempts: 8,
            base_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(3600),
            batch_size: 50,
            service_token: None,
            done_retention: Duration::from_secs(7 * 24 * 3600),
        }
    }
}

impl JoinRequestConfig {
    /// Override from `OUTBOX_POLL_INTERVAL_SECS`, `OUTBOX_MAX_ATTEMPTS` and
    /// `OUTBOX_SERVICE_TOKEN`; unset variables keep the current values
    pub fn with_env_overrides(self) -> Result<Self, EnvError> {
        Ok(Self {
            poll_interval: Duration::from_secs(env_parse(
                "OUTBOX_POLL_INTERVAL_SECS",
                self.poll_interval.as_secs(),
            )?),
            max_attempts: env_parse("OUTBOX_MAX_ATTEMPTS", self.max_attempts)?,
            service_token: env_opt("OUTBOX_SERVICE_TOKEN").or(self.service_token),
            ..self
        })
    }

    /// Config for development (fast retries)
    pub fn development() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            base_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Delay after the `attempts`-th failure: `base * 2^(attempts-1)`,
    /// capped at `max_backoff`
    pub fn backoff(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(20);
        self.base_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// `Authorization` the worker sends upstream
    pub fn service_authorization(&self) -> Option<HeaderValue> {
        let token = self.service_token.as_deref()?;
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

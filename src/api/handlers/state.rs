//! Recovery flow configuration shared across handlers.

use crate::tokens::{DEFAULT_PURGE_INTERVAL, DEFAULT_TOKEN_TTL};
use std::time::Duration;

const DEFAULT_MIN_SECRET_LENGTH: usize = 12;

#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    base_url: String,
    token_ttl: Duration,
    purge_interval: Duration,
    min_secret_length: usize,
    expose_diagnostics: bool,
}

impl RecoveryConfig {
    /// `base_url` is the externally reachable portal URL used to build
    /// recovery links.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token_ttl: DEFAULT_TOKEN_TTL,
            purge_interval: DEFAULT_PURGE_INTERVAL,
            min_secret_length: DEFAULT_MIN_SECRET_LENGTH,
            expose_diagnostics: false,
        }
    }

    #[must_use]
    pub fn with_token_ttl_hours(mut self, hours: u64) -> Self {
        self.token_ttl = Duration::from_secs(hours * 3600);
        self
    }

    #[must_use]
    pub fn with_purge_interval_seconds(mut self, seconds: u64) -> Self {
        self.purge_interval = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_min_secret_length(mut self, length: usize) -> Self {
        self.min_secret_length = length;
        self
    }

    /// Attach delivery diagnostics to `/recover` responses. Operator/debug
    /// deployments only; never enable this facing unauthenticated callers.
    #[must_use]
    pub fn with_expose_diagnostics(mut self, expose: bool) -> Self {
        self.expose_diagnostics = expose;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        self.purge_interval
    }

    #[must_use]
    pub fn min_secret_length(&self) -> usize {
        self.min_secret_length
    }

    #[must_use]
    pub fn expose_diagnostics(&self) -> bool {
        self.expose_diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_production_safe() {
        let config = RecoveryConfig::new("https://portal.example.com".to_string());
        assert_eq!(config.token_ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(config.min_secret_length(), 12);
        assert!(!config.expose_diagnostics());
    }

    #[test]
    fn builders_override_defaults() {
        let config = RecoveryConfig::new("https://portal.example.com".to_string())
            .with_token_ttl_hours(1)
            .with_purge_interval_seconds(30)
            .with_min_secret_length(8)
            .with_expose_diagnostics(true);
        assert_eq!(config.token_ttl(), Duration::from_secs(3600));
        assert_eq!(config.purge_interval(), Duration::from_secs(30));
        assert_eq!(config.min_secret_length(), 8);
        assert!(config.expose_diagnostics());
    }
}

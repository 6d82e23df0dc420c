//! Packaging configuration.

use serde::{Deserialize, Serialize};

use crate::crypto::SessionKeyAlgorithm;
use crate::error::{Error, Result};

/// Default number of recipient builders polled at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Maximum allowed number of recipient builders polled at once.
pub const MAX_IN_FLIGHT: usize = 64;

/// What to do when a recipient's package cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Let every builder settle, bind all successes, then return the first
    /// failure.
    #[default]
    WaitAll,
    /// Return on the first failure. Fragments bound so far are kept and
    /// builders still in flight are dropped.
    FailFast,
}

/// Configuration for [`Packager`](crate::Packager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingConfig {
    /// Failure handling.
    pub failure_policy: FailurePolicy,

    /// Algorithm for outside-encryption session keys.
    pub session_key_algorithm: SessionKeyAlgorithm,

    /// Number of recipient builders polled at once.
    pub max_in_flight: usize,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::WaitAll,
            session_key_algorithm: SessionKeyAlgorithm::Aes256,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl PackagingConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_in_flight` is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 || self.max_in_flight > MAX_IN_FLIGHT {
            return Err(Error::Config(format!(
                "max_in_flight must be between 1 and {MAX_IN_FLIGHT}, got {}",
                self.max_in_flight
            )));
        }
        Ok(())
    }

    /// Sets the failure policy.
    #[must_use]
    pub const fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the session key algorithm.
    #[must_use]
    pub const fn session_key_algorithm(mut self, algorithm: SessionKeyAlgorithm) -> Self {
        self.session_key_algorithm = algorithm;
        self
    }

    /// Sets the number of builders polled at once, clamped to
    /// `1..=MAX_IN_FLIGHT`.
    #[must_use]
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.clamp(1, MAX_IN_FLIGHT);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PackagingConfig::new();
        assert_eq!(config.failure_policy, FailurePolicy::WaitAll);
        assert_eq!(config.session_key_algorithm, SessionKeyAlgorithm::Aes256);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters_clamp() {
        let config = PackagingConfig::new()
            .failure_policy(FailurePolicy::FailFast)
            .session_key_algorithm(SessionKeyAlgorithm::Aes128)
            .max_in_flight(0);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.session_key_algorithm, SessionKeyAlgorithm::Aes128);
        assert_eq!(config.max_in_flight, 1);

        let config = PackagingConfig::new().max_in_flight(1000);
        assert_eq!(config.max_in_flight, MAX_IN_FLIGHT);
    }

    #[test]
    fn from_json_partial() {
        let config = PackagingConfig::from_json(r#"{"failure_policy":"fail_fast"}"#).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
    }

    #[test]
    fn from_json_full() {
        let config = PackagingConfig::from_json(
            r#"{"failure_policy":"wait_all","session_key_algorithm":"aes128","max_in_flight":4}"#,
        )
        .unwrap();
        assert_eq!(config.session_key_algorithm, SessionKeyAlgorithm::Aes128);
        assert_eq!(config.max_in_flight, 4);
    }

    #[test]
    fn from_json_rejects_zero_in_flight() {
        let err = PackagingConfig::from_json(r#"{"max_in_flight":0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = PackagingConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}

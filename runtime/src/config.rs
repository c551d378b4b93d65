//! Configuration for the aggregate store runtime.
//!
//! Loaded from environment variables with defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `RSVP_CONFLICT_MAX_RETRIES` | 8 |
//! | `RSVP_CONFLICT_INITIAL_DELAY_MS` | 5 |
//! | `RSVP_CONFLICT_MAX_DELAY_MS` | 250 |
//! | `RSVP_CONFLICT_BACKOFF_MULTIPLIER` | 2.0 |
//!
//! Unparseable values fall back to the default, as does a backoff multiplier
//! that is not a finite number greater than zero.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Write-conflict retry settings for the mutation executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt before giving up
    pub max_retries: u32,
    /// Backoff before the first retry, in milliseconds
    pub initial_delay_ms: u64,
    /// Backoff cap, in milliseconds
    pub max_delay_ms: u64,
    /// Growth factor between retries
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 8,
            initial_delay_ms: 5,
            max_delay_ms: 250,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a key lookup.
    ///
    /// `from_env` uses the process environment; tests pass a map.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_retries: parse_or(&lookup, "RSVP_CONFLICT_MAX_RETRIES", defaults.max_retries),
            initial_delay_ms: parse_or(
                &lookup,
                "RSVP_CONFLICT_INITIAL_DELAY_MS",
                defaults.initial_delay_ms,
            ),
            max_delay_ms: parse_or(&lookup, "RSVP_CONFLICT_MAX_DELAY_MS", defaults.max_delay_ms),
            backoff_multiplier: Some(parse_or(
                &lookup,
                "RSVP_CONFLICT_BACKOFF_MULTIPLIER",
                defaults.backoff_multiplier,
            ))
            .filter(|m: &f64| m.is_finite() && *m > 0.0)
            .unwrap_or(defaults.backoff_multiplier),
        }
    }

    /// The retry policy described by this configuration.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .multiplier(self.backoff_multiplier)
            .build()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_policy_defaults() {
        let config = RetryConfig::from_lookup(|_| None);
        assert_eq!(config, RetryConfig::default());
        assert_eq!(config.policy(), RetryPolicy::default());
    }

    #[test]
    fn reads_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RSVP_CONFLICT_MAX_RETRIES", "3"),
            ("RSVP_CONFLICT_INITIAL_DELAY_MS", "10"),
            ("RSVP_CONFLICT_BACKOFF_MULTIPLIER", "1.5"),
        ]
        .into_iter()
        .collect();

        let config = RetryConfig::from_lookup(|key| vars.get(key).map(ToString::to_string));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay_ms, 10);
        assert_eq!(config.max_delay_ms, 250);

        let policy = config.policy();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.initial_delay, Duration::from_millis(10));
        assert!((policy.multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = RetryConfig::from_lookup(|key| {
            (key == "RSVP_CONFLICT_MAX_RETRIES").then(|| "many".to_string())
        });
        assert_eq!(config.max_retries, 8);
    }

    #[test]
    fn non_positive_multiplier_falls_back() {
        for raw in ["-2", "0", "NaN", "inf"] {
            let config = RetryConfig::from_lookup(|key| {
                (key == "RSVP_CONFLICT_BACKOFF_MULTIPLIER").then(|| raw.to_string())
            });
            assert!(
                (config.backoff_multiplier - 2.0).abs() < f64::EPSILON,
                "{raw} gave {}",
                config.backoff_multiplier
            );
        }
    }
}

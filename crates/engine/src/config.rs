// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration.
//!
//! Defaults match the documented policy: 95/70 thresholds, three attempts,
//! 45s generation deadline with two same-attempt retries, 120s audit
//! deadline, five-minute job wall clock, one-hour session TTL. Deadlines
//! nest: generation < audit < wall clock.

use bg_core::RoutingPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Tunable policy and deadlines for the job runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub routing: RoutingPolicy,
    /// Hard per-call generation deadline.
    pub generation_timeout: Duration,
    /// Same-attempt retries after a generation timeout.
    pub generation_retries: u32,
    /// Backoff before the first retry; doubles per retry.
    pub retry_backoff: Duration,
    /// Hard per-call audit deadline.
    pub audit_timeout: Duration,
    /// Authoritative whole-job wall clock across all attempts.
    pub job_timeout: Duration,
    /// Session handle time-to-live in the registry.
    pub session_ttl: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            routing: RoutingPolicy::default(),
            generation_timeout: Duration::from_secs(45),
            generation_retries: 2,
            retry_backoff: Duration::from_secs(1),
            audit_timeout: Duration::from_secs(120),
            job_timeout: Duration::from_secs(300),
            session_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl RunnerConfig {
    bg_core::setters! {
        set {
            routing: RoutingPolicy,
            generation_timeout: Duration,
            generation_retries: u32,
            retry_backoff: Duration,
            audit_timeout: Duration,
            job_timeout: Duration,
            session_ttl: Duration,
        }
    }

    /// Parse a TOML config snapshot. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(raw)?;
        let defaults = Self::default();
        let routing_defaults = defaults.routing.clone();
        Ok(Self {
            routing: RoutingPolicy {
                auto_approve_score: file
                    .auto_approve_score
                    .unwrap_or(routing_defaults.auto_approve_score),
                review_score: file.review_score.unwrap_or(routing_defaults.review_score),
                max_attempts: file.max_attempts.unwrap_or(routing_defaults.max_attempts),
            },
            generation_timeout: secs_or(file.generation_timeout_secs, defaults.generation_timeout),
            generation_retries: file.generation_retries.unwrap_or(defaults.generation_retries),
            retry_backoff: secs_or(file.retry_backoff_secs, defaults.retry_backoff),
            audit_timeout: secs_or(file.audit_timeout_secs, defaults.audit_timeout),
            job_timeout: secs_or(file.job_timeout_secs, defaults.job_timeout),
            session_ttl: secs_or(file.session_ttl_secs, defaults.session_ttl),
        })
    }
}

fn secs_or(value: Option<u64>, default: Duration) -> Duration {
    value.map(Duration::from_secs).unwrap_or(default)
}

/// On-disk form of [`RunnerConfig`], all fields optional.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    auto_approve_score: Option<u8>,
    review_score: Option<u8>,
    max_attempts: Option<u32>,
    generation_timeout_secs: Option<u64>,
    generation_retries: Option<u32>,
    retry_backoff_secs: Option<u64>,
    audit_timeout_secs: Option<u64>,
    job_timeout_secs: Option<u64>,
    session_ttl_secs: Option<u64>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compliance scoring boundary.
//!
//! [`DegradingScorer`] is the only scorer the orchestrator ever sees: it
//! bounds the call and converts any failure into a synthetic zero score.
//! A broken scorer must never crash a job that already holds a valid
//! generated image: the user still sees the image, annotated as
//! unverifiable.

use async_trait::async_trait;
use bg_core::ComplianceScore;
use std::time::Duration;
use thiserror::Error;

/// Default per-call audit deadline. Strictly shorter than the job wall clock.
pub const AUDIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from the scoring capability
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("audit timed out")]
    Timeout,
    #[error("audit failed: {0}")]
    Failed(String),
}

/// The compliance-scoring capability.
#[async_trait]
pub trait ComplianceScorer: Send + Sync {
    async fn score(
        &self,
        image_url: &str,
        guidelines_full_text: &str,
    ) -> Result<ComplianceScore, ScorerError>;
}

/// Wraps a scorer with a deadline and full failure degradation.
///
/// Always returns a score: failures become
/// [`ComplianceScore::degraded`] with the failure description.
pub struct DegradingScorer<S> {
    inner: S,
    deadline: Duration,
}

impl<S> DegradingScorer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, deadline: AUDIT_TIMEOUT }
    }

    pub fn with_deadline(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

impl<S: ComplianceScorer> DegradingScorer<S> {
    /// Score an artifact, degrading instead of failing.
    pub async fn score_or_degrade(
        &self,
        image_url: &str,
        guidelines_full_text: &str,
    ) -> ComplianceScore {
        let outcome = tokio::time::timeout(
            self.deadline,
            self.inner.score(image_url, guidelines_full_text),
        )
        .await;

        match outcome {
            Ok(Ok(score)) => score,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "scorer failed; degrading to zero score");
                ComplianceScore::degraded(e.to_string())
            }
            Err(_elapsed) => {
                tracing::warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    "scorer timed out; degrading to zero score"
                );
                ComplianceScore::degraded(ScorerError::Timeout.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "scorer_tests.rs"]
mod tests;

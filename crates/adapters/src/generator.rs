// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image generation boundary.
//!
//! Providers upload the produced artifact themselves and return a durable
//! reference; raw bytes never cross this boundary. The per-call deadline
//! lives in [`TimeoutGenerator`], distinct from the whole-job wall clock,
//! and surfaces as [`GeneratorError::Timeout`] so the orchestrator can
//! retry the same attempt instead of advancing the counter.

use crate::session::SessionHandle;
use async_trait::async_trait;
use bg_core::SessionId;
use std::time::Duration;
use thiserror::Error;

/// Default per-call generation deadline.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Errors from the generation capability
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The per-call deadline elapsed. Retryable within the same attempt.
    #[error("generation timed out")]
    Timeout,
    /// The provider failed outright. Not retryable.
    #[error("generation failed: {0}")]
    Failed(String),
}

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Compressed brand tokens injected alongside the prompt.
    pub brand_tokens: String,
    /// Durable references to logo images the provider should honor.
    pub reference_images: Vec<String>,
    /// Open conversation to route the call through, for edit-in-place
    /// semantics. `None` means single-shot generation.
    pub continuation: Option<SessionHandle>,
}

/// A produced artifact.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Durable reference to the uploaded artifact.
    pub image_url: String,
    /// Conversation handle the provider kept open for follow-up edits.
    pub session_id: SessionId,
    /// Raw provider response, retained for observability.
    pub raw_response: serde_json::Value,
}

/// The image-generation capability.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<Generated, GeneratorError>;
}

/// Wraps a generator with a hard per-call deadline.
pub struct TimeoutGenerator<G> {
    inner: G,
    deadline: Duration,
}

impl<G> TimeoutGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self { inner, deadline: GENERATION_TIMEOUT }
    }

    pub fn with_deadline(inner: G, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for TimeoutGenerator<G> {
    async fn generate(&self, request: GenerateRequest) -> Result<Generated, GeneratorError> {
        match tokio::time::timeout(self.deadline, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                tracing::warn!(deadline_ms = self.deadline.as_millis() as u64, "generation call timed out");
                Err(GeneratorError::Timeout)
            }
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;

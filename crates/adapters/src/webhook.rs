// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook delivery boundary.
//!
//! Terminal job states are reported to an external delivery collaborator.
//! Delivery is best-effort: the collaborator retries on its own schedule,
//! and a delivery failure never affects job correctness. The runner logs
//! it and moves on.

use async_trait::async_trait;
use bg_core::JobState;
use thiserror::Error;

/// Errors from webhook delivery
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook delivery failed: {0}")]
    Delivery(String),
}

/// Fire-and-forget notification of terminal job states.
///
/// The payload is the full final state so downstream consumers need no
/// second read.
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    async fn notify(&self, state: &JobState) -> Result<(), WebhookError>;
}

/// No-op notifier for deployments without webhook consumers.
#[derive(Default, Clone)]
pub struct NoopWebhook;

#[async_trait]
impl WebhookNotifier for NoopWebhook {
    async fn notify(&self, _state: &JobState) -> Result<(), WebhookError> {
        Ok(())
    }
}

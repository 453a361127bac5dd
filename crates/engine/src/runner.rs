// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job runner: the front door collaborators call.
//!
//! Two invocation modes wrap the orchestrator: synchronous
//! (`run_to_completion` blocks until terminal or needs-review) and
//! detached (`spawn` returns immediately and the job runs as its own
//! task). Idempotency is checked exactly once at creation, webhook
//! delivery fires on terminal states, and `resume` is the only entry
//! point out of a needs-review pause.

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use crate::orchestrator::{CancelFlags, Orchestrator};
use bg_adapters::{
    BrandStore, ComplianceScorer, ImageGenerator, SessionBackend, WebhookNotifier,
};
use bg_core::{
    BrandId, Clock, Event, JobConfig, JobId, JobState, JobStatus, UserDecision,
};
use bg_storage::{JobPatch, JobStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Adapter and collaborator wiring for a [`JobRunner`].
pub struct RunnerDeps<G, S, B> {
    pub generator: G,
    pub scorer: S,
    pub sessions: B,
    pub brands: Arc<dyn BrandStore>,
    pub store: Arc<dyn JobStore>,
    pub webhook: Arc<dyn WebhookNotifier>,
}

/// Creates, runs, resumes, and cancels generation jobs.
pub struct JobRunner<G, S, B, C> {
    orchestrator: Arc<Orchestrator<G, S, B, C>>,
    brands: Arc<dyn BrandStore>,
    store: Arc<dyn JobStore>,
    webhook: Arc<dyn WebhookNotifier>,
    clock: C,
    cancellations: CancelFlags,
}

impl<G, S, B, C> Clone for JobRunner<G, S, B, C>
where
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            brands: Arc::clone(&self.brands),
            store: Arc::clone(&self.store),
            webhook: Arc::clone(&self.webhook),
            clock: self.clock.clone(),
            cancellations: self.cancellations.clone(),
        }
    }
}

impl<G, S, B, C> JobRunner<G, S, B, C>
where
    G: ImageGenerator + Send + Sync + 'static,
    S: ComplianceScorer + Send + Sync + 'static,
    B: SessionBackend + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(deps: RunnerDeps<G, S, B>, config: RunnerConfig, clock: C) -> Self {
        let cancellations = CancelFlags::new();
        let orchestrator = Orchestrator::new(
            deps.generator,
            deps.scorer,
            deps.sessions,
            Arc::clone(&deps.store),
            clock.clone(),
            config,
            cancellations.clone(),
        );
        Self {
            orchestrator: Arc::new(orchestrator),
            brands: deps.brands,
            store: deps.store,
            webhook: deps.webhook,
            clock,
            cancellations,
        }
    }

    /// Create a new job at `pending`.
    ///
    /// The idempotency key is checked exactly once, here: a live prior job
    /// under the same key is returned as-is and no second record is
    /// created.
    pub async fn start(
        &self,
        brand_id: impl Into<BrandId>,
        prompt: impl Into<String>,
        generation_params: HashMap<String, String>,
        idempotency_key: Option<&str>,
    ) -> Result<JobId, RunnerError> {
        let brand_id = brand_id.into();

        if let Some(key) = idempotency_key {
            if let Some(existing) = self.store.find_by_idempotency_key(key).await? {
                tracing::info!(job_id = %existing, key, "idempotent start: returning existing job");
                return Ok(existing);
            }
        }

        // Resolve the brand up front: a job for an unknown brand should
        // fail at creation, not inside the background loop.
        let brand = self.brands.get_brand(&brand_id).await?;

        let config = JobConfig::builder(JobId::new(), brand_id, prompt)
            .generation_params(generation_params)
            .original_had_logos(brand.has_logos())
            .build();
        let state = JobState::new(config, &self.clock);
        let job_id = state.id.clone();

        self.store.insert(state).await?;
        if let Some(key) = idempotency_key {
            self.store.remember_idempotency_key(key, &job_id).await?;
        }

        tracing::info!(job_id = %job_id, brand_id = %brand.brand_id, "job created");
        Ok(job_id)
    }

    /// Synchronous mode: run the orchestrator loop until the job reaches a
    /// terminal state or pauses for review, and return the final state.
    pub async fn run_to_completion(&self, job_id: &JobId) -> Result<JobState, RunnerError> {
        let state = self.require_job(job_id).await?;

        match state.status {
            // Nothing to drive; report the state as-is.
            JobStatus::NeedsReview => return Ok(state),
            s if s.is_terminal() => return Ok(state),
            // Pending, Correcting, or a mid-flight status left by a
            // crashed process: the loop redoes the interrupted cycle.
            _ => {}
        }

        let brand = self.brands.get_brand(&state.brand_id).await?;
        let finished = self.orchestrator.run(state, &brand).await?;
        self.report_if_terminal(&finished).await;
        Ok(finished)
    }

    /// Async mode: run the job as a detached task and return immediately.
    ///
    /// The final state is persisted and the webhook fired from inside the
    /// task. A task that errors out persists a failed state rather than
    /// leaving the job silently stuck.
    pub fn spawn(&self, job_id: &JobId) -> tokio::task::JoinHandle<()> {
        let runner = self.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            if let Err(e) = runner.run_to_completion(&job_id).await {
                tracing::error!(job_id = %job_id, error = %e, "detached job run failed");
                runner.mark_system_failure(&job_id, &e).await;
            }
        })
    }

    /// Re-enter the state machine from a needs-review pause.
    pub async fn resume(
        &self,
        job_id: &JobId,
        decision: UserDecision,
        tweak_instruction: Option<String>,
    ) -> Result<JobState, RunnerError> {
        let state = self.require_job(job_id).await?;

        if state.status != JobStatus::NeedsReview {
            return Err(RunnerError::InvalidResume(format!(
                "job {} is {}, expected needs_review",
                job_id, state.status
            )));
        }
        // Fabricating a missing brand or prompt here would corrupt the
        // audit trail; a hole in the record fails loudly instead.
        if state.prompt.is_empty() || state.brand_id.as_str().is_empty() {
            return Err(RunnerError::InvalidResume(format!(
                "job {} record is missing prompt or brand_id",
                job_id
            )));
        }

        tracing::info!(job_id = %job_id, decision = %decision, "human decision received");

        let state = self
            .orchestrator
            .apply_event(state, Event::UserDecided { decision, tweak_instruction })
            .await?;

        match decision {
            UserDecision::Approve => {
                self.orchestrator.reset_session(job_id);
                self.report_if_terminal(&state).await;
                Ok(state)
            }
            UserDecision::Tweak | UserDecision::Regenerate => {
                if decision == UserDecision::Regenerate {
                    // A regenerate starts over: drop the conversation so the
                    // next attempt is single-shot.
                    self.orchestrator.reset_session(job_id);
                }
                let brand = self.brands.get_brand(&state.brand_id).await?;
                let finished = self.orchestrator.run(state, &brand).await?;
                self.report_if_terminal(&finished).await;
                Ok(finished)
            }
        }
    }

    /// Request cancellation.
    ///
    /// A paused or pending job cancels immediately; a running job cancels
    /// at its next attempt boundary (an in-flight external call is allowed
    /// to finish).
    pub async fn cancel(&self, job_id: &JobId) -> Result<JobState, RunnerError> {
        let state = self.require_job(job_id).await?;

        if state.is_terminal() {
            return Ok(state);
        }

        match state.status {
            JobStatus::Pending | JobStatus::NeedsReview => {
                let cancelled = self.orchestrator.apply_event(state, Event::Cancelled).await?;
                self.orchestrator.reset_session(job_id);
                self.report_if_terminal(&cancelled).await;
                Ok(cancelled)
            }
            _ => {
                self.cancellations.request(job_id);
                tracing::info!(job_id = %job_id, "cancellation requested; will apply at next attempt boundary");
                Ok(state)
            }
        }
    }

    /// Current state of a job, queryable at any time.
    pub async fn status(&self, job_id: &JobId) -> Result<JobState, RunnerError> {
        self.require_job(job_id).await
    }

    async fn require_job(&self, job_id: &JobId) -> Result<JobState, RunnerError> {
        self.store
            .get(job_id)
            .await?
            .ok_or_else(|| RunnerError::JobNotFound(job_id.clone()))
    }

    /// Fire-and-forget terminal notification. Delivery failures are
    /// logged; they never affect job correctness.
    async fn report_if_terminal(&self, state: &JobState) {
        if !state.is_terminal() {
            return;
        }
        if let Err(e) = self.webhook.notify(state).await {
            tracing::warn!(job_id = %state.id, error = %e, "webhook delivery failed (best effort)");
        }
    }

    /// Best-effort persistence of a system failure from a detached task.
    async fn mark_system_failure(&self, job_id: &JobId, error: &RunnerError) {
        match self.store.get(job_id).await {
            // Terminal records are immutable; nothing to repair.
            Ok(Some(state)) if state.is_terminal() => return,
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => return,
        }
        let patch = JobPatch {
            status: Some(JobStatus::Failed),
            error: Some(format!("system error: manual investigation required ({error})")),
            updated_at_ms: Some(self.clock.epoch_ms()),
            ..Default::default()
        };
        match self.store.update(job_id, patch).await {
            Ok(state) => self.report_if_terminal(&state).await,
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "failed to persist system failure")
            }
        }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

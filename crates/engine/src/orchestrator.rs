// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator: drives generate → audit → route cycles for one job.
//!
//! All state changes go through the pure transition function and are
//! persisted immediately as partial merges, so the loop can stop (crash,
//! needs-review pause, cancellation) after any step and a later invocation
//! continues from the last durable point. Within one job everything is
//! strictly sequential; concurrency exists only across jobs.

use crate::composer;
use crate::config::RunnerConfig;
use crate::error::RunnerError;
use bg_adapters::{
    ComplianceScorer, DegradingScorer, GenerateRequest, Generated, GeneratorError, ImageGenerator,
    SessionBackend, SessionHandle, SessionRegistry, TimeoutGenerator,
};
use bg_core::{transition, BrandProfile, Clock, Event, JobId, JobState, JobStatus};
use bg_storage::{JobPatch, JobStore};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Cross-task cancellation requests, keyed by job.
///
/// A request is observed at the top of the next attempt loop iteration,
/// never preemptively mid-call: an external call already in flight is
/// allowed to finish so the provider request is not orphaned.
#[derive(Clone, Default)]
pub struct CancelFlags {
    requested: Arc<Mutex<HashSet<JobId>>>,
}

impl CancelFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of a job.
    pub fn request(&self, job_id: &JobId) {
        self.requested.lock().insert(job_id.clone());
    }

    /// Consume a pending request for this job, if any.
    pub fn take(&self, job_id: &JobId) -> bool {
        self.requested.lock().remove(job_id)
    }
}

/// Drives one job through the state machine until terminal or paused.
pub struct Orchestrator<G, S, B, C> {
    generator: TimeoutGenerator<G>,
    scorer: DegradingScorer<S>,
    sessions: SessionRegistry<B, C>,
    store: Arc<dyn JobStore>,
    clock: C,
    config: RunnerConfig,
    cancellations: CancelFlags,
}

impl<G, S, B, C> Orchestrator<G, S, B, C>
where
    G: ImageGenerator,
    S: ComplianceScorer,
    B: SessionBackend,
    C: Clock,
{
    pub fn new(
        generator: G,
        scorer: S,
        sessions: B,
        store: Arc<dyn JobStore>,
        clock: C,
        config: RunnerConfig,
        cancellations: CancelFlags,
    ) -> Self {
        Self {
            generator: TimeoutGenerator::with_deadline(generator, config.generation_timeout),
            scorer: DegradingScorer::with_deadline(scorer, config.audit_timeout),
            sessions: SessionRegistry::with_ttl(sessions, clock.clone(), config.session_ttl),
            store,
            clock,
            config,
            cancellations,
        }
    }

    /// Apply one event and persist the resulting change.
    ///
    /// The merge result from the store is authoritative: it reflects the
    /// latest persisted record, not this task's in-memory copy.
    pub async fn apply_event(
        &self,
        state: JobState,
        event: Event,
    ) -> Result<JobState, RunnerError> {
        let old = state.clone();
        let event_name = event.name();
        let mut next = transition(state, event, &self.config.routing);
        next.updated_at_ms = self.clock.epoch_ms();

        let patch = JobPatch::diff(&old, &next);
        if patch.is_empty() {
            return Ok(next);
        }
        let merged = self.store.update(&next.id, patch).await?;
        tracing::info!(
            job_id = %merged.id,
            event = event_name,
            from = %old.status,
            to = %merged.status,
            attempt = merged.attempt_count,
            "state transition"
        );
        Ok(merged)
    }

    /// Drop the job's conversation handle so the next attempt is
    /// single-shot (used for regenerate decisions and terminal cleanup).
    pub fn reset_session(&self, job_id: &JobId) {
        self.sessions.remove(job_id);
    }

    /// Run the attempt loop until the job is terminal or paused for review.
    pub async fn run(
        &self,
        mut state: JobState,
        brand: &BrandProfile,
    ) -> Result<JobState, RunnerError> {
        let deadline = self.clock.now() + self.config.job_timeout;

        if state.status == JobStatus::Pending {
            state = self.apply_event(state, Event::Start).await?;
        }

        loop {
            // Cancellation checkpoint: only at attempt boundaries.
            if self.cancellations.take(&state.id) {
                state = self.apply_event(state, Event::Cancelled).await?;
                break;
            }

            if self.clock.now() >= deadline {
                state = self.wall_clock_failure(state).await?;
                break;
            }

            // First attempt generates from the original prompt; correction
            // attempts go through the composer.
            let prompt = if state.attempt_count == 0 {
                state.prompt.clone()
            } else {
                let composed = composer::compose(&state, brand);
                if composed.consumed_tweak {
                    state = self.apply_event(state, Event::CorrectionComposed).await?;
                }
                composed.prompt
            };

            state = self.apply_event(state, Event::GenerationStarted).await?;

            let continuation = self.continuation_for(&state);
            let request = GenerateRequest {
                prompt,
                brand_tokens: brand.compressed_tokens.clone(),
                reference_images: brand.logo_references.clone(),
                continuation,
            };

            let generated = match self.bounded(deadline, self.generate_with_retry(&state.id, request)).await {
                None => {
                    state = self.wall_clock_failure(state).await?;
                    break;
                }
                Some(Err(e)) => {
                    let error = format!(
                        "system error: manual investigation required (generation failed: {e})"
                    );
                    state = self.apply_event(state, Event::Failed { error }).await?;
                    break;
                }
                Some(Ok(generated)) => generated,
            };

            self.sessions.bind(&state.id, generated.session_id.clone());
            state = self
                .apply_event(
                    state,
                    Event::GenerationComplete {
                        image_url: generated.image_url.clone(),
                        session_id: Some(generated.session_id),
                    },
                )
                .await?;

            let audit = self.scorer.score_or_degrade(&generated.image_url, &brand.guidelines_full_text);
            let score = match self.bounded(deadline, audit).await {
                None => {
                    state = self.wall_clock_failure(state).await?;
                    break;
                }
                Some(score) => score,
            };
            tracing::debug!(
                job_id = %state.id,
                overall = score.overall_score,
                model_approved = score.approved,
                violations = score.violation_count(),
                "audit verdict (model approval advisory only)"
            );

            state = self.apply_event(state, Event::AuditComplete { score }).await?;

            match state.status {
                JobStatus::Correcting => continue,
                _ => break,
            }
        }

        if state.is_terminal() {
            self.sessions.remove(&state.id);
        }
        Ok(state)
    }

    /// Continuation handle for this attempt, if multi-turn editing is
    /// possible. A registry miss on a job that has a persisted session is
    /// the cross-process case: regress to single-shot, keep the field.
    fn continuation_for(&self, state: &JobState) -> Option<SessionHandle> {
        if state.attempt_count == 0 || state.session_id.is_none() {
            return None;
        }
        let (handle, is_new) = self.sessions.get_or_create(&state.id);
        if is_new {
            tracing::warn!(
                job_id = %state.id,
                session_id = %state.session_id.as_ref().map(|s| s.as_str()).unwrap_or(""),
                "session handle lost or expired; falling back to single-shot generation"
            );
            return None;
        }
        Some(handle)
    }

    /// Generate, retrying the same attempt on timeout with exponential
    /// backoff. Non-timeout failures are terminal for the job.
    async fn generate_with_retry(
        &self,
        job_id: &JobId,
        request: GenerateRequest,
    ) -> Result<Generated, GeneratorError> {
        let mut backoff = self.config.retry_backoff;
        let mut retries_left = self.config.generation_retries;
        loop {
            match self.generator.generate(request.clone()).await {
                Ok(generated) => return Ok(generated),
                Err(GeneratorError::Timeout) if retries_left > 0 => {
                    retries_left -= 1;
                    tracing::warn!(
                        job_id = %job_id,
                        backoff_ms = backoff.as_millis() as u64,
                        retries_left,
                        "generation timed out; retrying same attempt"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Bound a future by the remaining wall-clock budget. The wall clock
    /// is authoritative and wins a race against any stuck inner call.
    async fn bounded<T>(&self, deadline: Instant, fut: impl Future<Output = T>) -> Option<T> {
        let remaining = deadline.saturating_duration_since(self.clock.now());
        if remaining.is_zero() {
            return None;
        }
        tokio::time::timeout(remaining, fut).await.ok()
    }

    async fn wall_clock_failure(&self, state: JobState) -> Result<JobState, RunnerError> {
        let error = format!(
            "workflow timed out after {}s ({} attempts completed)",
            self.config.job_timeout.as_secs(),
            state.attempt_count
        );
        tracing::warn!(job_id = %state.id, attempt = state.attempt_count, "job wall clock exceeded");
        self.apply_event(state, Event::Failed { error }).await
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pure state machine: `(JobState, Event) -> JobState`.
//!
//! All status changes happen here and nowhere else. The orchestrator, the
//! resume entry point, and the cancellation path all fold events through
//! [`transition`], so a job resumed by a different process follows exactly
//! the code path a fresh job does.

use crate::event::Event;
use crate::job::{JobState, JobStatus};
use crate::score::ComplianceScore;
use crate::UserDecision;
use serde::{Deserialize, Serialize};

/// Threshold policy for routing a completed audit.
///
/// Thresholds are a business decision, not a model decision: the scorer's
/// own `approved` bit is never consulted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    /// Scores at or above this complete the job without review.
    pub auto_approve_score: u8,
    /// Scores at or above this (but below auto-approve) pause for review.
    /// Scores below are the correction band.
    pub review_score: u8,
    /// Attempt ceiling. A sub-review score at this count fails the job.
    pub max_attempts: u32,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            auto_approve_score: 95,
            review_score: 70,
            max_attempts: 3,
        }
    }
}

impl RoutingPolicy {
    /// Route a completed audit.
    ///
    /// `attempt_count` is the post-increment count for the cycle that just
    /// finished; `has_user_decision` is whether a human has already decided
    /// on this job at least once.
    pub fn route_audit(
        &self,
        overall_score: u8,
        attempt_count: u32,
        has_user_decision: bool,
    ) -> JobStatus {
        if overall_score >= self.auto_approve_score {
            return JobStatus::Completed;
        }
        if overall_score >= self.review_score {
            // Middle band always pauses for a human, never auto-corrects.
            return JobStatus::NeedsReview;
        }
        // Low score. A first attempt (or any attempt without a prior human
        // decision) pauses for review: auto-correcting output the user has
        // never seen drifts from their intent.
        if attempt_count <= 1 || !has_user_decision {
            return JobStatus::NeedsReview;
        }
        if attempt_count < self.max_attempts {
            JobStatus::Correcting
        } else {
            JobStatus::Failed
        }
    }

    /// Human-readable failure reason for an exhausted attempt budget.
    ///
    /// Distinct from system-error failures so the caller can tell
    /// "model could not comply" from "investigate the pipeline".
    pub fn max_attempts_error(&self) -> String {
        format!(
            "model could not produce compliant output after {} attempts",
            self.max_attempts
        )
    }
}

/// Apply one event to a job state, returning the next state.
///
/// Total over all (state, event) pairs. Terminal states are immutable:
/// any event applied to one returns the state unchanged.
pub fn transition(mut state: JobState, event: Event, policy: &RoutingPolicy) -> JobState {
    if state.is_terminal() {
        return state;
    }

    match event {
        Event::Start => {
            if state.status == JobStatus::Pending {
                state.status = JobStatus::Generating;
            }
        }

        Event::GenerationStarted => {
            state.status = JobStatus::Generating;
        }

        Event::GenerationComplete { image_url, session_id } => {
            state.current_image_url = Some(image_url);
            // Set-only: a generator that reports no session (or a new one
            // after a registry miss) must not erase the persisted handle.
            if state.session_id.is_none() {
                state.session_id = session_id;
            }
            state.status = JobStatus::Auditing;
        }

        Event::AuditComplete { score } => {
            state = apply_audit(state, score, policy);
        }

        Event::UserDecided { decision, tweak_instruction } => {
            state.user_decision = Some(decision);
            match decision {
                UserDecision::Approve => {
                    state.status = JobStatus::Completed;
                }
                UserDecision::Tweak => {
                    state.user_tweak_instruction = tweak_instruction;
                    state.status = JobStatus::Correcting;
                }
                UserDecision::Regenerate => {
                    state.user_tweak_instruction = None;
                    state.status = JobStatus::Correcting;
                }
            }
        }

        Event::CorrectionComposed => {
            // Tweak instructions are single-use.
            state.user_tweak_instruction = None;
        }

        Event::Cancelled => {
            state.status = JobStatus::Cancelled;
        }

        Event::Failed { error } => {
            state.error = Some(error);
            state.status = JobStatus::Failed;
        }
    }

    state
}

fn apply_audit(mut state: JobState, score: ComplianceScore, policy: &RoutingPolicy) -> JobState {
    let overall = score.overall_score;
    state.record_audit(score);
    state.attempt_count += 1;

    let routed = policy.route_audit(overall, state.attempt_count, state.has_user_decision());
    if routed == JobStatus::Failed {
        state.error = Some(policy.max_attempts_error());
    }
    state.status = routed;
    state
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;

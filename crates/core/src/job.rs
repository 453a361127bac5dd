// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state record and status machine vocabulary.
//!
//! [`JobState`] is the single mutable record threading through the
//! orchestrator. Every field the state machine needs lives here; there is
//! deliberately no out-of-band "job record" to reconstruct from, so a
//! partial persisted blob can never silently drop `brand_id` or `prompt`.

use crate::brand::BrandId;
use crate::clock::Clock;
use crate::decision::UserDecision;
use crate::id::{JobId, SessionId};
use crate::score::ComplianceScore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a generation job.
///
/// Transitions are monotone through the state machine in
/// [`crate::transition`]; `auditing` always follows a `generating` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, not yet picked up by the orchestrator.
    Pending,
    /// An image-generation call is in flight.
    Generating,
    /// A compliance audit is in flight.
    Auditing,
    /// Paused for a human decision. Non-terminal.
    NeedsReview,
    /// Routed into another correction cycle.
    Correcting,
    /// Terminal: accepted (auto-approved or human-approved).
    Completed,
    /// Terminal: gave up, `error` says why.
    Failed,
    /// Terminal: explicitly cancelled.
    Cancelled,
}

impl JobStatus {
    /// Check if this status is terminal (job record becomes immutable).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// Check if this status is a pause awaiting human input.
    pub fn is_paused(&self) -> bool {
        matches!(self, JobStatus::NeedsReview)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Generating => "generating",
        Auditing => "auditing",
        NeedsReview => "needs_review",
        Correcting => "correcting",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Configuration for creating a new job
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub id: JobId,
    pub brand_id: BrandId,
    pub prompt: String,
    pub generation_params: HashMap<String, String>,
    pub original_had_logos: bool,
}

impl JobConfig {
    pub fn builder(
        id: impl Into<JobId>,
        brand_id: impl Into<BrandId>,
        prompt: impl Into<String>,
    ) -> JobConfigBuilder {
        JobConfigBuilder {
            id: id.into(),
            brand_id: brand_id.into(),
            prompt: prompt.into(),
            generation_params: HashMap::new(),
            original_had_logos: false,
        }
    }
}

pub struct JobConfigBuilder {
    id: JobId,
    brand_id: BrandId,
    prompt: String,
    generation_params: HashMap<String, String>,
    original_had_logos: bool,
}

impl JobConfigBuilder {
    crate::setters! {
        set {
            generation_params: HashMap<String, String>,
            original_had_logos: bool,
        }
    }

    pub fn build(self) -> JobConfig {
        JobConfig {
            id: self.id,
            brand_id: self.brand_id,
            prompt: self.prompt,
            generation_params: self.generation_params,
            original_had_logos: self.original_had_logos,
        }
    }
}

/// The single mutable record for one generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobState {
    pub id: JobId,
    pub brand_id: BrandId,
    /// Original user prompt. Corrections always build on this, never replace it.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub generation_params: HashMap<String, String>,
    /// Completed generate+audit cycles. Monotonically non-decreasing.
    #[serde(default)]
    pub attempt_count: u32,
    /// Every audit verdict, append-only, never truncated or reordered.
    #[serde(default)]
    pub audit_history: Vec<ComplianceScore>,
    /// Overall scores mirroring `audit_history`, for routing convenience.
    #[serde(default)]
    pub compliance_scores: Vec<u8>,
    /// Multi-turn conversation handle id. Once set, preserved verbatim
    /// until a terminal status; losing it regresses tweaks to
    /// generate-from-scratch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Most recent artifact reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_image_url: Option<String>,
    /// Latest human decision, if a review has happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_decision: Option<UserDecision>,
    /// Free-text tweak instruction. Single-use: cleared once composed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_tweak_instruction: Option<String>,
    /// Whether the first generation carried brand logos. Preserved across
    /// tweaks so corrections don't silently drop logo usage.
    #[serde(default)]
    pub original_had_logos: bool,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at_ms: u64,
    #[serde(default)]
    pub updated_at_ms: u64,
}

impl JobState {
    /// Create a new job at `pending` with attempt_count 0.
    pub fn new(config: JobConfig, clock: &impl Clock) -> Self {
        Self::new_with_epoch_ms(config, clock.epoch_ms())
    }

    /// Create a new job with explicit epoch_ms.
    pub fn new_with_epoch_ms(config: JobConfig, epoch_ms: u64) -> Self {
        Self {
            id: config.id,
            brand_id: config.brand_id,
            prompt: config.prompt,
            generation_params: config.generation_params,
            attempt_count: 0,
            audit_history: Vec::new(),
            compliance_scores: Vec::new(),
            session_id: None,
            current_image_url: None,
            user_decision: None,
            user_tweak_instruction: None,
            original_had_logos: config.original_had_logos,
            status: JobStatus::Pending,
            error: None,
            created_at_ms: epoch_ms,
            updated_at_ms: epoch_ms,
        }
    }

    /// Check if the job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether a human has already made a decision for this job.
    pub fn has_user_decision(&self) -> bool {
        self.user_decision.is_some()
    }

    /// The most recent audit verdict, if any.
    pub fn latest_score(&self) -> Option<&ComplianceScore> {
        self.audit_history.last()
    }

    /// Append an audit verdict to both history vectors.
    ///
    /// The only writer of `audit_history` and `compliance_scores`, so the
    /// mirror cannot diverge.
    pub fn record_audit(&mut self, score: ComplianceScore) {
        self.compliance_scores.push(score.overall_score);
        self.audit_history.push(score);
    }
}

crate::builder! {
    pub struct JobStateBuilder => JobState {
        into {
            id: JobId = "job-test",
            brand_id: BrandId = "brand-test",
            prompt: String = "a launch banner",
        }
        set {
            generation_params: HashMap<String, String> = HashMap::new(),
            attempt_count: u32 = 0,
            audit_history: Vec<ComplianceScore> = Vec::new(),
            compliance_scores: Vec<u8> = Vec::new(),
            original_had_logos: bool = false,
            status: JobStatus = JobStatus::Pending,
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
        option {
            session_id: SessionId = None,
            current_image_url: String = None,
            user_decision: UserDecision = None,
            user_tweak_instruction: String = None,
            error: String = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

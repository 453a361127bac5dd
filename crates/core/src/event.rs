// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events that drive the generation state machine.
//!
//! The orchestrator never mutates a [`crate::JobState`] directly: it builds
//! an [`Event`] from what just happened (a generation finished, an audit
//! came back, a human decided) and folds it through
//! [`crate::transition::transition`]. Resuming a persisted job is the same
//! fold over the same function; there is no separate resume code path.

use crate::decision::UserDecision;
use crate::id::SessionId;
use crate::score::ComplianceScore;
use serde::{Deserialize, Serialize};

/// Events that trigger state transitions in the generation machine.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Job picked up by the orchestrator.
    #[serde(rename = "job:start")]
    Start,

    /// A generation call is being issued (first attempt or correction loop).
    #[serde(rename = "generation:started")]
    GenerationStarted,

    /// The generator produced a durable artifact reference.
    #[serde(rename = "generation:complete")]
    GenerationComplete {
        image_url: String,
        /// Conversation handle reported by the generator, if any.
        /// Never clears an already-set handle on the job.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<SessionId>,
    },

    /// The audit step produced a verdict (possibly degraded).
    #[serde(rename = "audit:complete")]
    AuditComplete { score: ComplianceScore },

    /// A human resolved a needs-review pause.
    #[serde(rename = "review:decided")]
    UserDecided {
        decision: UserDecision,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tweak_instruction: Option<String>,
    },

    /// The correction composer consumed the pending tweak instruction.
    #[serde(rename = "correction:composed")]
    CorrectionComposed,

    /// Explicit cancellation observed at an attempt boundary.
    #[serde(rename = "job:cancelled")]
    Cancelled,

    /// Unrecoverable failure (generation exhausted, wall clock, system error).
    #[serde(rename = "job:failed")]
    Failed { error: String },
}

impl Event {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "job:start",
            Event::GenerationStarted => "generation:started",
            Event::GenerationComplete { .. } => "generation:complete",
            Event::AuditComplete { .. } => "audit:complete",
            Event::UserDecided { .. } => "review:decided",
            Event::CorrectionComposed => "correction:composed",
            Event::Cancelled => "job:cancelled",
            Event::Failed { .. } => "job:failed",
        }
    }
}

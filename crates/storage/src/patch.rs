// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partial job-state updates.
//!
//! A [`JobPatch`] carries only the fields a transition changed. Merge rules
//! encode the state-record invariants:
//! - `session_id` is set-only: a patch can establish it, never erase it.
//! - `append_audits` appends; `audit_history` is never truncated or
//!   reordered.
//! - `user_tweak_instruction` is double-optional so the composer can
//!   explicitly clear it after consumption.

use bg_core::{ComplianceScore, JobState, JobStatus, SessionId, UserDecision};
use serde::{Deserialize, Serialize};

/// A partial update to one job's persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_count: Option<u32>,
    /// Audit verdicts to append (with their score mirror entries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub append_audits: Vec<ComplianceScore>,
    /// Set-only. Merging `None` leaves the stored handle untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_decision: Option<UserDecision>,
    /// Outer `None` = untouched; `Some(None)` = explicit clear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_tweak_instruction: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<u64>,
}

impl JobPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compute the patch that takes `old` to `new`.
    ///
    /// Assumes `new` was produced from `old` by the transition function, so
    /// `audit_history` only grows and identity fields never change.
    pub fn diff(old: &JobState, new: &JobState) -> Self {
        let mut patch = Self::default();

        if new.status != old.status {
            patch.status = Some(new.status);
        }
        if new.attempt_count != old.attempt_count {
            patch.attempt_count = Some(new.attempt_count);
        }
        if new.audit_history.len() > old.audit_history.len() {
            patch.append_audits = new.audit_history[old.audit_history.len()..].to_vec();
        }
        if new.session_id != old.session_id {
            patch.session_id = new.session_id.clone();
        }
        if new.current_image_url != old.current_image_url {
            patch.current_image_url = new.current_image_url.clone();
        }
        if new.user_decision != old.user_decision {
            patch.user_decision = new.user_decision;
        }
        if new.user_tweak_instruction != old.user_tweak_instruction {
            patch.user_tweak_instruction = Some(new.user_tweak_instruction.clone());
        }
        if new.error != old.error {
            patch.error = new.error.clone();
        }
        if new.updated_at_ms != old.updated_at_ms {
            patch.updated_at_ms = Some(new.updated_at_ms);
        }

        patch
    }

    /// Apply this patch onto a stored state.
    pub fn merge_into(self, state: &mut JobState) {
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(count) = self.attempt_count {
            state.attempt_count = count;
        }
        for score in self.append_audits {
            state.record_audit(score);
        }
        if state.session_id.is_none() {
            if let Some(session_id) = self.session_id {
                state.session_id = Some(session_id);
            }
        }
        if let Some(url) = self.current_image_url {
            state.current_image_url = Some(url);
        }
        if let Some(decision) = self.user_decision {
            state.user_decision = Some(decision);
        }
        if let Some(tweak) = self.user_tweak_instruction {
            state.user_tweak_instruction = tweak;
        }
        if let Some(error) = self.error {
            state.error = Some(error);
        }
        if let Some(ms) = self.updated_at_ms {
            state.updated_at_ms = ms;
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human decision types for needs-review pauses.

use serde::{Deserialize, Serialize};

/// The decision a human makes on a job paused at needs-review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserDecision {
    /// Accept the current artifact as-is, regardless of score.
    Approve,
    /// Edit the current artifact per a free-text instruction.
    Tweak,
    /// Discard the current artifact and generate fresh from the original prompt.
    Regenerate,
}

crate::simple_display! {
    UserDecision {
        Approve => "approve",
        Tweak => "tweak",
        Regenerate => "regenerate",
    }
}

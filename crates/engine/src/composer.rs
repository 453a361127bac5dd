// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correction composer: turns audit violations or a user tweak into the
//! next generation prompt.
//!
//! The two input modes are mutually exclusive per invocation. A pending
//! tweak instruction always wins; otherwise the latest audit's worst
//! violations are rewritten as imperative fix instructions on top of the
//! original prompt. Consumed tweaks are cleared by the caller via the
//! `CorrectionComposed` event.

use bg_core::{BrandProfile, JobState};

/// Worst violations folded into one automated correction.
const MAX_CORRECTIONS: usize = 3;

/// The prompt for the next generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub prompt: String,
    /// True when a pending tweak instruction was consumed; the caller must
    /// clear it on the job state (single-use field).
    pub consumed_tweak: bool,
}

/// Compose the next prompt for a correcting job.
pub fn compose(state: &JobState, brand: &BrandProfile) -> ComposedPrompt {
    match state.user_tweak_instruction.as_deref() {
        Some(instruction) => ComposedPrompt {
            prompt: compose_tweak(instruction, state, brand),
            consumed_tweak: true,
        },
        None => ComposedPrompt {
            prompt: compose_corrections(state),
            consumed_tweak: false,
        },
    }
}

/// User-directed tweak: pass the user's text through, adding brand
/// reminders only where the instruction touches guideline territory.
fn compose_tweak(instruction: &str, state: &JobState, brand: &BrandProfile) -> String {
    let mut prompt = format!("Edit the current image: {}.", instruction.trim_end_matches('.'));
    let lowered = instruction.to_lowercase();

    let mut reminders: Vec<String> = Vec::new();
    if lowered.contains("text") || lowered.contains("font") {
        reminders.push("use only the brand's approved fonts".to_string());
    }
    if lowered.contains("color") || lowered.contains("colour") {
        reminders.push("stay within the approved brand color palette".to_string());
    }
    if lowered.contains("logo") {
        reminders.push("keep brand logo usage correct and unmodified".to_string());
    }
    if !reminders.is_empty() {
        prompt.push_str(&format!(
            " Brand requirements: {}. Reference: {}.",
            reminders.join("; "),
            brand.compressed_tokens
        ));
    }

    if state.original_had_logos {
        prompt.push_str(" Preserve the existing brand logo placement.");
    }

    prompt
}

/// Automated correction: highest-severity violations from the latest
/// audit, rewritten as explicit imperative instructions on the original
/// prompt.
fn compose_corrections(state: &JobState) -> String {
    let mut prompt = state.prompt.clone();

    if let Some(score) = state.latest_score() {
        let worst = score.worst_violations(MAX_CORRECTIONS);
        if !worst.is_empty() {
            prompt.push_str("\n\nCorrect the following brand-compliance issues:");
            for violation in worst {
                match &violation.fix_suggestion {
                    Some(fix) => {
                        prompt.push_str(&format!("\n- Fix: {}. {}.", violation.description, fix))
                    }
                    None => prompt.push_str(&format!("\n- Fix: {}.", violation.description)),
                }
            }
        }
    }

    if state.original_had_logos {
        prompt.push_str("\nKeep the brand logo usage from the original request.");
    }

    prompt
}

#[cfg(test)]
#[path = "composer_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compliance scoring types.
//!
//! A [`ComplianceScore`] is the structured verdict of the audit step: a
//! 0–100 overall score, per-category breakdown, and itemized violations.
//! The model also reports its own `approved` bit, but routing never trusts
//! it; threshold policy lives in [`crate::transition::RoutingPolicy`].

use serde::{Deserialize, Serialize};

/// Severity of a single guideline violation.
///
/// Ordered so that `sort` puts `Critical` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

crate::simple_display! {
    Severity {
        Critical => "critical",
        Major => "major",
        Minor => "minor",
    }
}

/// A single guideline violation found during audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub description: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

/// Per-category score with its violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// Structured result of auditing one generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceScore {
    /// 0–100 overall assessment. Authoritative for routing.
    pub overall_score: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryScore>,
    /// Model-reported approval. Advisory only; logged, never routed on.
    pub approved: bool,
}

impl ComplianceScore {
    /// Synthetic zero score used when the scorer fails or times out.
    ///
    /// A broken scorer must never crash a job that already holds a valid
    /// generated image; the user still sees the image with a
    /// "could not verify" annotation carried by this score.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            overall_score: 0,
            categories: vec![CategoryScore {
                name: "verification".to_string(),
                score: 0,
                violations: vec![Violation {
                    description: format!("could not verify compliance: {}", reason.into()),
                    severity: Severity::Critical,
                    fix_suggestion: Some("manual review required".to_string()),
                }],
            }],
            approved: false,
        }
    }

    /// All violations across categories, ordered worst-first, capped at `n`.
    pub fn worst_violations(&self, n: usize) -> Vec<&Violation> {
        let mut all: Vec<&Violation> =
            self.categories.iter().flat_map(|c| c.violations.iter()).collect();
        all.sort_by_key(|v| v.severity);
        all.truncate(n);
        all
    }

    /// Total violation count across all categories.
    pub fn violation_count(&self) -> usize {
        self.categories.iter().map(|c| c.violations.len()).sum()
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;

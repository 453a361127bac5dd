// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted fake adapters for tests.
//!
//! Fakes are deterministic: generators and scorers consume a script of
//! outcomes and record every request so tests can assert on continuation
//! use, prompt content, and call counts.

use crate::generator::{GenerateRequest, Generated, GeneratorError, ImageGenerator};
use crate::scorer::{ComplianceScorer, ScorerError};
use crate::webhook::{WebhookError, WebhookNotifier};
use async_trait::async_trait;
use bg_core::score::CategoryScore;
use bg_core::{ComplianceScore, JobState, SessionId, Severity, Violation};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One scripted generator outcome.
#[derive(Debug, Clone)]
pub enum GeneratorScript {
    /// Succeed with this artifact url.
    Url(String),
    /// Report a per-call timeout.
    Timeout,
    /// Fail outright.
    Fail(String),
    /// Sleep before succeeding (for deadline-wrapper tests).
    Slow(Duration, String),
}

/// Scripted image generator.
///
/// With an empty script every call succeeds with a sequential url.
/// Continuation semantics mirror real providers: a call with a
/// continuation stays in that session, a single-shot call opens a new one.
#[derive(Default, Clone)]
pub struct FakeGenerator {
    script: Arc<Mutex<VecDeque<GeneratorScript>>>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
    calls: Arc<Mutex<u32>>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl IntoIterator<Item = GeneratorScript>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().clone()
    }

    /// How many requests carried a continuation handle.
    pub fn continuations_used(&self) -> usize {
        self.requests.lock().iter().filter(|r| r.continuation.is_some()).count()
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock()
    }
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<Generated, GeneratorError> {
        let n = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        self.requests.lock().push(request.clone());

        let step = self.script.lock().pop_front();
        let url = match step {
            None => format!("https://cdn.test/img-{n}.png"),
            Some(GeneratorScript::Url(url)) => url,
            Some(GeneratorScript::Timeout) => return Err(GeneratorError::Timeout),
            Some(GeneratorScript::Fail(reason)) => return Err(GeneratorError::Failed(reason)),
            Some(GeneratorScript::Slow(delay, url)) => {
                tokio::time::sleep(delay).await;
                url
            }
        };

        let session_id = match &request.continuation {
            Some(handle) => handle.session_id.clone(),
            None => SessionId::from_string(format!("ses-fake-{n}")),
        };

        Ok(Generated {
            image_url: url,
            session_id,
            raw_response: serde_json::json!({ "fake": true, "call": n }),
        })
    }
}

/// One scripted scorer outcome.
#[derive(Debug, Clone)]
pub enum ScorerScript {
    Score(u8),
    Fail(String),
    /// Sleep past any reasonable deadline (for degradation tests).
    Slow(Duration, u8),
}

/// Scripted compliance scorer.
///
/// With an empty script every call returns a passing score.
#[derive(Default, Clone)]
pub struct FakeScorer {
    script: Arc<Mutex<VecDeque<ScorerScript>>>,
    scored_urls: Arc<Mutex<Vec<String>>>,
}

impl FakeScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand: a scorer returning these overall scores in order.
    pub fn with_scores(scores: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: Arc::new(Mutex::new(scores.into_iter().map(ScorerScript::Score).collect())),
            ..Self::default()
        }
    }

    pub fn with_script(script: impl IntoIterator<Item = ScorerScript>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Self::default()
        }
    }

    pub fn scored_urls(&self) -> Vec<String> {
        self.scored_urls.lock().clone()
    }

    /// Build the structured verdict for an overall score.
    pub fn verdict(overall: u8) -> ComplianceScore {
        let violations = if overall >= 95 {
            vec![]
        } else {
            vec![Violation {
                description: "brand color palette not respected".to_string(),
                severity: if overall < 70 { Severity::Major } else { Severity::Minor },
                fix_suggestion: Some("use the approved primary palette".to_string()),
            }]
        };
        ComplianceScore {
            overall_score: overall,
            categories: vec![CategoryScore {
                name: "colors".to_string(),
                score: overall,
                violations,
            }],
            approved: overall >= 95,
        }
    }
}

#[async_trait]
impl ComplianceScorer for FakeScorer {
    async fn score(
        &self,
        image_url: &str,
        _guidelines_full_text: &str,
    ) -> Result<ComplianceScore, ScorerError> {
        self.scored_urls.lock().push(image_url.to_string());

        let script = self.script.lock().pop_front();
        match script {
            None => Ok(Self::verdict(96)),
            Some(ScorerScript::Score(overall)) => Ok(Self::verdict(overall)),
            Some(ScorerScript::Fail(reason)) => Err(ScorerError::Failed(reason)),
            Some(ScorerScript::Slow(delay, overall)) => {
                tokio::time::sleep(delay).await;
                Ok(Self::verdict(overall))
            }
        }
    }
}

/// Webhook notifier that records every delivered state.
#[derive(Default, Clone)]
pub struct RecordingWebhook {
    delivered: Arc<Mutex<Vec<JobState>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (jobs must be unaffected).
    pub fn fail_deliveries(&self) {
        *self.fail.lock() = true;
    }

    pub fn delivered(&self) -> Vec<JobState> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl WebhookNotifier for RecordingWebhook {
    async fn notify(&self, state: &JobState) -> Result<(), WebhookError> {
        if *self.fail.lock() {
            return Err(WebhookError::Delivery("receiver unavailable".to_string()));
        }
        self.delivered.lock().push(state.clone());
        Ok(())
    }
}

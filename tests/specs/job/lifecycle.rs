// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job creation, idempotency, detached runs, and cancellation.

use crate::prelude::*;

#[tokio::test]
async fn auto_approve_end_to_end() {
    let env = env(FakeScorer::with_scores([97]));

    let job_id = env
        .runner
        .start("brand-acme", "a product launch banner", HashMap::new(), None)
        .await
        .unwrap();
    let finished = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.attempt_count, 1);
    assert_eq!(finished.compliance_scores, vec![97]);
    assert!(finished.current_image_url.is_some());

    // Webhook carried the full final state.
    let delivered = env.webhook.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, job_id);
    assert_eq!(delivered[0].status, JobStatus::Completed);
    assert_eq!(delivered[0].compliance_scores, vec![97]);
}

#[tokio::test]
async fn idempotency_key_prevents_duplicate_jobs() {
    let env = env(FakeScorer::new());

    let first = env
        .runner
        .start("brand-acme", "banner", HashMap::new(), Some("retry-safe-key"))
        .await
        .unwrap();
    let second = env
        .runner
        .start("brand-acme", "banner", HashMap::new(), Some("retry-safe-key"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(env.store.len(), 1);
}

#[tokio::test]
async fn generation_params_are_persisted() {
    let env = env(FakeScorer::new());
    let mut params = HashMap::new();
    params.insert("aspect_ratio".to_string(), "16:9".to_string());

    let job_id = env.runner.start("brand-acme", "banner", params, None).await.unwrap();

    let state = env.runner.status(&job_id).await.unwrap();
    assert_eq!(state.generation_params.get("aspect_ratio").map(String::as_str), Some("16:9"));
}

#[tokio::test]
async fn logo_flag_follows_the_brand() {
    let env = env(FakeScorer::new());

    let with_logos = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();
    let without = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();

    assert!(env.runner.status(&with_logos).await.unwrap().original_had_logos);
    assert!(!env.runner.status(&without).await.unwrap().original_had_logos);
}

#[tokio::test]
async fn detached_mode_returns_immediately_and_completes() {
    let env = env(FakeScorer::with_scores([96]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let handle = env.runner.spawn(&job_id);
    handle.await.unwrap();

    let state = env.runner.status(&job_id).await.unwrap();
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(env.webhook.delivered().len(), 1);
}

#[tokio::test]
async fn concurrent_jobs_do_not_interfere() {
    let env = env(FakeScorer::new());

    let a = env.runner.start("brand-acme", "banner a", HashMap::new(), None).await.unwrap();
    let b = env.runner.start("brand-acme", "banner b", HashMap::new(), None).await.unwrap();

    let (ha, hb) = (env.runner.spawn(&a), env.runner.spawn(&b));
    ha.await.unwrap();
    hb.await.unwrap();

    assert_eq!(env.runner.status(&a).await.unwrap().status, JobStatus::Completed);
    assert_eq!(env.runner.status(&b).await.unwrap().status, JobStatus::Completed);
    assert_eq!(env.webhook.delivered().len(), 2);
}

#[tokio::test]
async fn cancel_before_running_terminates_the_job() {
    let env = env(FakeScorer::new());
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let cancelled = env.runner.cancel(&job_id).await.unwrap();

    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert!(env.generator.requests().is_empty());
    // Cancellation is terminal and notified.
    assert_eq!(env.webhook.delivered().len(), 1);

    // A cancelled job cannot be driven further.
    let state = env.runner.run_to_completion(&job_id).await.unwrap();
    assert_eq!(state.status, JobStatus::Cancelled);
}

#[tokio::test]
async fn cancel_paused_review_terminates_the_job() {
    let env = env(FakeScorer::with_scores([55]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();
    env.runner.run_to_completion(&job_id).await.unwrap();

    let cancelled = env.runner.cancel(&job_id).await.unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);

    let err = env.runner.resume(&job_id, UserDecision::Approve, None).await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidResume(_)));
}

#[tokio::test]
async fn status_is_queryable_at_every_stage() {
    let env = env(FakeScorer::with_scores([55]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    assert_eq!(env.runner.status(&job_id).await.unwrap().status, JobStatus::Pending);
    env.runner.run_to_completion(&job_id).await.unwrap();
    assert_eq!(env.runner.status(&job_id).await.unwrap().status, JobStatus::NeedsReview);
}

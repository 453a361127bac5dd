// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Degradation and failure-handling behavior under broken collaborators.

use crate::prelude::*;

#[tokio::test]
async fn broken_scorer_degrades_and_the_job_still_pauses() {
    let env = env(FakeScorer::with_script([ScorerScript::Fail("scorer offline".into())]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let paused = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(paused.status, JobStatus::NeedsReview);
    let score = paused.latest_score().unwrap();
    assert_eq!(score.overall_score, 0);
    assert!(!score.approved);
    assert!(score.violation_count() >= 1);
    assert!(score.worst_violations(1)[0].description.contains("could not verify"));
    // The artifact is still there for the reviewer.
    assert!(paused.current_image_url.is_some());
}

#[tokio::test]
async fn slow_scorer_times_out_and_degrades() {
    let config = spec_config().audit_timeout(Duration::from_millis(10));
    let env = env_with_config(
        FakeScorer::with_script([ScorerScript::Slow(Duration::from_millis(200), 96)]),
        config,
    );
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let paused = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(paused.status, JobStatus::NeedsReview);
    assert_eq!(paused.compliance_scores, vec![0]);
}

#[tokio::test]
async fn generator_timeouts_retry_within_one_attempt() {
    let generator = FakeGenerator::with_script([
        GeneratorScript::Timeout,
        GeneratorScript::Url("https://cdn/recovered.png".into()),
    ]);
    let env = env_full(generator, FakeScorer::with_scores([96]), spec_config());
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let finished = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.attempt_count, 1);
    assert_eq!(finished.current_image_url.as_deref(), Some("https://cdn/recovered.png"));
    assert_eq!(env.generator.call_count(), 2);
}

#[tokio::test]
async fn generator_hard_failure_is_a_system_error() {
    let generator = FakeGenerator::with_script([GeneratorScript::Fail("provider 500".into())]);
    let env = env_full(generator, FakeScorer::new(), spec_config());
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let finished = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(finished.status, JobStatus::Failed);
    let error = finished.error.unwrap_or_default();
    // Distinguishable from "model could not comply".
    assert!(error.contains("system error"), "got: {error}");
    assert_eq!(env.webhook.delivered().len(), 1);
}

#[tokio::test]
async fn whole_job_wall_clock_is_authoritative() {
    let config = spec_config()
        .job_timeout(Duration::from_millis(50))
        .audit_timeout(Duration::from_secs(30));
    let env = env_with_config(
        FakeScorer::with_script([ScorerScript::Slow(Duration::from_millis(500), 96)]),
        config,
    );
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let finished = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(finished.status, JobStatus::Failed);
    assert!(finished.error.as_deref().unwrap_or("").contains("timed out"));
}

#[tokio::test]
async fn webhook_outage_never_corrupts_job_state() {
    let env = env(FakeScorer::with_scores([96]));
    env.webhook.fail_deliveries();
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let finished = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    let stored = env.store.get(&job_id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
}

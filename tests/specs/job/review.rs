// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Needs-review pauses, human decisions, and attempt exhaustion.

use crate::prelude::*;

#[tokio::test]
async fn first_low_score_pauses_with_full_violation_detail() {
    let env = env(FakeScorer::with_scores([55]));
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();

    let paused = env.runner.run_to_completion(&job_id).await.unwrap();

    assert_eq!(paused.status, JobStatus::NeedsReview);
    assert_eq!(paused.audit_history.len(), 1);
    assert_eq!(paused.attempt_count, 1);
    // Never a bare score: the reviewer sees categories and violations.
    let score = paused.latest_score().unwrap();
    assert!(!score.categories.is_empty());
    assert!(score.violation_count() > 0);
}

#[tokio::test]
async fn mid_band_score_pauses_even_on_later_attempts() {
    let env = env(FakeScorer::with_scores([55, 88]));
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();
    env.runner.run_to_completion(&job_id).await.unwrap();

    let second = env
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("brighten colors".into()))
        .await
        .unwrap();

    // 88 is below auto-approve: review again, never silent completion.
    assert_eq!(second.status, JobStatus::NeedsReview);
    assert_eq!(second.attempt_count, 2);
    assert_eq!(second.compliance_scores, vec![55, 88]);
}

#[tokio::test]
async fn approve_completes_whatever_the_score_was() {
    let env = env(FakeScorer::with_scores([55, 88]));
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();
    env.runner.run_to_completion(&job_id).await.unwrap();
    env.runner
        .resume(&job_id, UserDecision::Tweak, Some("brighten colors".into()))
        .await
        .unwrap();

    let finished = env.runner.resume(&job_id, UserDecision::Approve, None).await.unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.compliance_scores, vec![55, 88]);
    assert_eq!(env.webhook.delivered().len(), 1);
}

#[tokio::test]
async fn corrections_exhaust_into_failure_at_the_attempt_cap() {
    let env = env(FakeScorer::with_scores([40, 45, 50]));
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();

    let paused = env.runner.run_to_completion(&job_id).await.unwrap();
    assert_eq!(paused.status, JobStatus::NeedsReview);

    // After one human decision, sub-70 scores auto-correct to the cap.
    let finished = env
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("try again".into()))
        .await
        .unwrap();

    assert_eq!(finished.status, JobStatus::Failed);
    assert_eq!(finished.attempt_count, 3);
    assert_eq!(finished.compliance_scores, vec![40, 45, 50]);
    let error = finished.error.unwrap_or_default();
    assert!(error.contains("could not produce compliant output after 3 attempts"), "got: {error}");
}

#[tokio::test]
async fn raised_attempt_cap_consumes_a_longer_losing_streak() {
    // Same shape with a cap of four: [40, 45, 50, 50] and the user never
    // approving ends in failure on the fourth attempt.
    let config =
        spec_config().routing(RoutingPolicy { max_attempts: 4, ..RoutingPolicy::default() });
    let env = env_with_config(FakeScorer::with_scores([40, 45, 50, 50]), config);
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();

    env.runner.run_to_completion(&job_id).await.unwrap();
    let finished = env
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("try again".into()))
        .await
        .unwrap();

    assert_eq!(finished.status, JobStatus::Failed);
    assert_eq!(finished.attempt_count, 4);
    assert_eq!(finished.compliance_scores, vec![40, 45, 50, 50]);
}

#[tokio::test]
async fn tweak_instruction_reaches_the_generator_and_is_single_use() {
    let env = env(FakeScorer::with_scores([55, 88]));
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();
    env.runner.run_to_completion(&job_id).await.unwrap();

    let second = env
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("brighten colors".into()))
        .await
        .unwrap();

    let requests = env.generator.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].prompt.contains("brighten colors"));
    // Consumed: the persisted record no longer carries the instruction.
    assert!(second.user_tweak_instruction.is_none());
}

#[tokio::test]
async fn regenerate_decision_starts_over_single_shot() {
    let env = env(FakeScorer::with_scores([55, 96]));
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();
    env.runner.run_to_completion(&job_id).await.unwrap();

    let finished = env.runner.resume(&job_id, UserDecision::Regenerate, None).await.unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(env.generator.continuations_used(), 0);
}

#[tokio::test]
async fn resume_on_a_running_job_is_a_client_error() {
    let env = env(FakeScorer::new());
    let job_id = env.runner.start("brand-plain", "banner", HashMap::new(), None).await.unwrap();

    let err = env.runner.resume(&job_id, UserDecision::Approve, None).await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidResume(_)));
}

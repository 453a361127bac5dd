// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-turn session continuity, including simulated process restarts.

use crate::prelude::*;

#[tokio::test]
async fn session_is_established_on_first_generation() {
    let env = env(FakeScorer::with_scores([55]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();

    let paused = env.runner.run_to_completion(&job_id).await.unwrap();

    assert!(paused.session_id.is_some());
}

#[tokio::test]
async fn tweak_in_the_same_process_edits_in_place() {
    let env = env(FakeScorer::with_scores([55, 88]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();
    let paused = env.runner.run_to_completion(&job_id).await.unwrap();
    let session_before = paused.session_id.clone();

    let second = env
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("brighten colors".into()))
        .await
        .unwrap();

    // Multi-turn: the correction went through the open conversation.
    assert_eq!(env.generator.continuations_used(), 1);
    // The persisted session id never changed.
    assert_eq!(second.session_id, session_before);
}

#[tokio::test]
async fn restart_regresses_to_single_shot_but_keeps_the_session_field() {
    let env_a = env(FakeScorer::with_scores([55]));
    let job_id = env_a.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();
    let paused = env_a.runner.run_to_completion(&job_id).await.unwrap();
    let session_before = paused.session_id.clone();
    assert!(session_before.is_some());

    // A different process resumes the job: same store, empty registry.
    let env_b = restart(&env_a, FakeScorer::with_scores([88]));
    let second = env_b
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("brighten colors".into()))
        .await
        .unwrap();

    assert_eq!(second.status, JobStatus::NeedsReview);
    // No continuation handle existed in the new process.
    assert_eq!(env_b.generator.continuations_used(), 0);
    // The registry miss must not erase the persisted field.
    assert_eq!(second.session_id, session_before);
}

#[tokio::test]
async fn session_survives_every_persisted_step_until_terminal() {
    let env = env(FakeScorer::with_scores([55, 40, 96]));
    let job_id = env.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();
    let paused = env.runner.run_to_completion(&job_id).await.unwrap();
    let session = paused.session_id.clone();

    // Tweak drives a 40 (auto-correct) and then a 96 (complete).
    let finished = env
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("fix the palette".into()))
        .await
        .unwrap();

    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.session_id, session);

    // Every intermediate persist kept the field too.
    let stored = env.store.get(&job_id).await.unwrap().unwrap();
    assert_eq!(stored.session_id, session);
}

#[tokio::test]
async fn audit_history_is_append_only_across_restarts() {
    let env_a = env(FakeScorer::with_scores([40]));
    let job_id = env_a.runner.start("brand-acme", "banner", HashMap::new(), None).await.unwrap();
    env_a.runner.run_to_completion(&job_id).await.unwrap();

    let env_b = restart(&env_a, FakeScorer::with_scores([45, 96]));
    let finished = env_b
        .runner
        .resume(&job_id, UserDecision::Tweak, Some("closer to the guide".into()))
        .await
        .unwrap();

    assert_eq!(finished.compliance_scores, vec![40, 45, 96]);
    assert_eq!(finished.audit_history.len(), 3);
}

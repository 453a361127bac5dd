// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the end-to-end specs.

pub use bg_adapters::fake::{GeneratorScript, ScorerScript};
pub use bg_adapters::{
    BrandStore, FakeGenerator, FakeScorer, MemoryBrandStore, MemorySessionBackend,
    RecordingWebhook,
};
pub use bg_core::{
    BrandId, BrandProfile, FakeClock, JobId, JobStatus, RoutingPolicy, UserDecision,
};
pub use bg_engine::{JobRunner, RunnerConfig, RunnerDeps, RunnerError};
pub use bg_storage::{JobStore, MemoryJobStore};
pub use std::collections::HashMap;
pub use std::sync::Arc;
pub use std::time::Duration;

pub type SpecRunner = JobRunner<FakeGenerator, FakeScorer, MemorySessionBackend, FakeClock>;

pub struct TestEnv {
    pub runner: SpecRunner,
    pub generator: FakeGenerator,
    pub store: Arc<MemoryJobStore>,
    pub brands: Arc<MemoryBrandStore>,
    pub webhook: RecordingWebhook,
}

pub fn acme_brand() -> BrandProfile {
    BrandProfile {
        brand_id: BrandId::new("brand-acme"),
        guidelines_full_text: "The full Acme brand guidelines.".into(),
        compressed_tokens: "palette: #003366/#ffffff; font: Inter".into(),
        logo_references: vec!["https://cdn/acme-logo.png".into()],
    }
}

/// Brand with no logo references (for logo-flag scenarios).
pub fn plain_brand() -> BrandProfile {
    BrandProfile {
        brand_id: BrandId::new("brand-plain"),
        guidelines_full_text: "Plain brand guidelines.".into(),
        compressed_tokens: "palette: grayscale".into(),
        logo_references: vec![],
    }
}

pub fn spec_config() -> RunnerConfig {
    RunnerConfig::default().retry_backoff(Duration::from_millis(1))
}

/// Fresh environment with the given scorer script.
pub fn env(scorer: FakeScorer) -> TestEnv {
    env_with_config(scorer, spec_config())
}

pub fn env_with_config(scorer: FakeScorer, config: RunnerConfig) -> TestEnv {
    env_full(FakeGenerator::new(), scorer, config)
}

pub fn env_full(generator: FakeGenerator, scorer: FakeScorer, config: RunnerConfig) -> TestEnv {
    let store = Arc::new(MemoryJobStore::new());
    let brands = Arc::new(MemoryBrandStore::new());
    brands.put(acme_brand());
    brands.put(plain_brand());
    let webhook = RecordingWebhook::new();
    let clock = FakeClock::new();

    let deps = RunnerDeps {
        generator: generator.clone(),
        scorer,
        sessions: MemorySessionBackend::new(),
        brands: brands.clone() as Arc<dyn BrandStore>,
        store: store.clone() as Arc<dyn JobStore>,
        webhook: Arc::new(webhook.clone()),
    };
    let runner = JobRunner::new(deps, config, clock);

    TestEnv { runner, generator, store, brands, webhook }
}

/// A "restarted process": same durable store and brands, but a brand-new
/// runner whose in-memory session registry has never seen any job.
pub fn restart(previous: &TestEnv, scorer: FakeScorer) -> TestEnv {
    let generator = FakeGenerator::new();
    let webhook = RecordingWebhook::new();
    let clock = FakeClock::new();

    let deps = RunnerDeps {
        generator: generator.clone(),
        scorer,
        sessions: MemorySessionBackend::new(),
        brands: previous.brands.clone() as Arc<dyn BrandStore>,
        store: previous.store.clone() as Arc<dyn JobStore>,
        webhook: Arc::new(webhook.clone()),
    };
    let runner = JobRunner::new(deps, spec_config(), clock);

    TestEnv {
        runner,
        generator,
        store: previous.store.clone(),
        brands: previous.brands.clone(),
        webhook,
    }
}

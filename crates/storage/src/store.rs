// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store trait and the in-memory implementation.
//!
//! The trait is async because production deployments back it with an
//! external keyed store; the in-memory implementation serves single-process
//! deployments and every test in the workspace.

use crate::patch::JobPatch;
use async_trait::async_trait;
use bg_core::{JobId, JobState};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from job store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job already exists: {0}")]
    Duplicate(JobId),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable keyed store of job state, with partial-merge updates.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch the latest persisted state for a job.
    async fn get(&self, id: &JobId) -> Result<Option<JobState>, StoreError>;

    /// Persist a newly created job. Fails on duplicate IDs.
    async fn insert(&self, state: JobState) -> Result<(), StoreError>;

    /// Read-modify-write merge of a partial update; returns the merged state.
    async fn update(&self, id: &JobId, patch: JobPatch) -> Result<JobState, StoreError>;

    /// Look up a previously created job by client idempotency key.
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<JobId>, StoreError>;

    /// Associate an idempotency key with a job at creation time.
    async fn remember_idempotency_key(&self, key: &str, id: &JobId) -> Result<(), StoreError>;
}

/// In-memory job store keyed by job id.
///
/// Writes are per-job, so a single map lock is enough; there is no
/// cross-job contention to speak of.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, JobState>>,
    idempotency: Mutex<HashMap<String, JobId>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs (test observability).
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, id: &JobId) -> Result<Option<JobState>, StoreError> {
        Ok(self.jobs.lock().get(id).cloned())
    }

    async fn insert(&self, state: JobState) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock();
        if jobs.contains_key(&state.id) {
            return Err(StoreError::Duplicate(state.id));
        }
        jobs.insert(state.id.clone(), state);
        Ok(())
    }

    async fn update(&self, id: &JobId, patch: JobPatch) -> Result<JobState, StoreError> {
        let mut jobs = self.jobs.lock();
        let state = jobs.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        patch.merge_into(state);
        Ok(state.clone())
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<JobId>, StoreError> {
        let idempotency = self.idempotency.lock();
        let Some(id) = idempotency.get(key) else {
            return Ok(None);
        };
        // A key only counts while the job it names is still live.
        if self.jobs.lock().contains_key(id) {
            Ok(Some(id.clone()))
        } else {
            Ok(None)
        }
    }

    async fn remember_idempotency_key(&self, key: &str, id: &JobId) -> Result<(), StoreError> {
        self.idempotency.lock().insert(key.to_string(), id.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

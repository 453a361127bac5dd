// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner error taxonomy.
//!
//! External-call failures never appear here: the generator boundary
//! translates them into retry decisions and the scorer boundary degrades
//! them into zero scores. What remains are client errors (bad resume,
//! unknown job) and collaborator failures (store, brand lookup) that must
//! fail loudly rather than fabricate state.

use bg_adapters::BrandStoreError;
use bg_core::JobId;
use bg_storage::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the job runner
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Resuming a job that is not paused, or whose record is incomplete.
    /// A client error; never retried internally.
    #[error("invalid resume: {0}")]
    InvalidResume(String),

    /// The job is in a state the requested operation does not apply to.
    #[error("job not runnable: {0}")]
    NotRunnable(String),

    #[error(transparent)]
    Brand(#[from] BrandStoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

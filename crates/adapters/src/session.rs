// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry: job id → open multi-turn conversation handle.
//!
//! Handles let repeated tweaks against one job edit the same image instead
//! of regenerating from scratch. The registry is deliberately lossy: a
//! handle older than the TTL, or one that never existed in this process
//! (container recycle, resume on another host), is reported as new and the
//! orchestrator falls back to single-shot generation. Losing a handle is a
//! logged regression, never an error, and never touches the job's
//! persisted `session_id`.

use bg_core::{Clock, JobId, SessionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default handle time-to-live.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// An open conversation with the generation capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    pub session_id: SessionId,
    pub created_at_ms: u64,
}

/// Pluggable storage for session handles.
///
/// The in-memory backend serves single-process deployments; multi-process
/// deployments plug in an external keyed store so handles survive
/// container recycling.
pub trait SessionBackend: Send + Sync {
    fn get(&self, job_id: &JobId) -> Option<SessionHandle>;
    fn put(&self, job_id: &JobId, handle: SessionHandle);
    fn remove(&self, job_id: &JobId);
}

/// Process-local session storage.
#[derive(Default)]
pub struct MemorySessionBackend {
    handles: Mutex<HashMap<JobId, SessionHandle>>,
}

impl MemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionBackend for MemorySessionBackend {
    fn get(&self, job_id: &JobId) -> Option<SessionHandle> {
        self.handles.lock().get(job_id).cloned()
    }

    fn put(&self, job_id: &JobId, handle: SessionHandle) {
        self.handles.lock().insert(job_id.clone(), handle);
    }

    fn remove(&self, job_id: &JobId) {
        self.handles.lock().remove(job_id);
    }
}

/// Time-limited cache of conversation handles, keyed by job.
pub struct SessionRegistry<B, C> {
    backend: B,
    clock: C,
    ttl: Duration,
}

impl<B: SessionBackend, C: Clock> SessionRegistry<B, C> {
    pub fn new(backend: B, clock: C) -> Self {
        Self { backend, clock, ttl: SESSION_TTL }
    }

    pub fn with_ttl(backend: B, clock: C, ttl: Duration) -> Self {
        Self { backend, clock, ttl }
    }

    /// Return the live handle for a job, or mint a fresh one.
    ///
    /// Idempotent. `is_new == true` means there was no live handle: never
    /// created, expired (evicted lazily here), or created by another
    /// process. Callers treat a new handle as "no continuation available
    /// for this attempt".
    pub fn get_or_create(&self, job_id: &JobId) -> (SessionHandle, bool) {
        let now_ms = self.clock.epoch_ms();
        if let Some(handle) = self.backend.get(job_id) {
            let age_ms = now_ms.saturating_sub(handle.created_at_ms);
            if age_ms <= self.ttl.as_millis() as u64 {
                return (handle, false);
            }
            tracing::debug!(job_id = %job_id, age_ms, "session handle expired; evicting");
            self.backend.remove(job_id);
        }

        let handle = SessionHandle {
            session_id: SessionId::new(),
            created_at_ms: now_ms,
        };
        self.backend.put(job_id, handle.clone());
        (handle, true)
    }

    /// Record the provider-reported session for a job, refreshing the TTL.
    pub fn bind(&self, job_id: &JobId, session_id: SessionId) {
        let handle = SessionHandle {
            session_id,
            created_at_ms: self.clock.epoch_ms(),
        };
        self.backend.put(job_id, handle);
    }

    /// Drop a job's handle (terminal-state cleanup).
    pub fn remove(&self, job_id: &JobId) {
        self.backend.remove(job_id);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

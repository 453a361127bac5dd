// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bg-storage: Durable job store behind a partial-merge interface.
//!
//! The store is the single source of truth for job state. Every orchestrator
//! mutation is a read-modify-write of the latest persisted record via
//! [`JobPatch`], never a full replace, so a resuming process cannot
//! clobber fields (most critically `session_id`) it did not touch.

pub mod patch;
pub mod store;

pub use patch::JobPatch;
pub use store::{JobStore, MemoryJobStore, StoreError};

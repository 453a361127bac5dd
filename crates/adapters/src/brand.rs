// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Brand store boundary.

use async_trait::async_trait;
use bg_core::{BrandId, BrandProfile};
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from the brand store
#[derive(Debug, Error)]
pub enum BrandStoreError {
    #[error("brand not found: {0}")]
    NotFound(BrandId),
    #[error("brand store error: {0}")]
    Backend(String),
}

/// Read access to compiled brand guideline objects.
#[async_trait]
pub trait BrandStore: Send + Sync {
    async fn get_brand(&self, brand_id: &BrandId) -> Result<BrandProfile, BrandStoreError>;
}

/// In-memory brand store. Doubles as the test fixture.
#[derive(Default)]
pub struct MemoryBrandStore {
    brands: Mutex<HashMap<BrandId, BrandProfile>>,
}

impl MemoryBrandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, profile: BrandProfile) {
        self.brands.lock().insert(profile.brand_id.clone(), profile);
    }
}

#[async_trait]
impl BrandStore for MemoryBrandStore {
    async fn get_brand(&self, brand_id: &BrandId) -> Result<BrandProfile, BrandStoreError> {
        self.brands
            .lock()
            .get(brand_id)
            .cloned()
            .ok_or_else(|| BrandStoreError::NotFound(brand_id.clone()))
    }
}

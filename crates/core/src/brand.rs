// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Brand identity types consumed by the generation core.
//!
//! BrandId is caller-supplied (brands are owned by an external store), so
//! unlike JobId it carries no generated prefix. The core only consumes a
//! brand's compiled guideline object; ingestion and compression happen
//! elsewhere.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a brand whose guidelines govern a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrandId(pub String);

impl BrandId {
    /// Create a new BrandId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value of this BrandId.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BrandId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BrandId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for BrandId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BrandId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for BrandId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A brand's compiled guideline object.
///
/// `guidelines_full_text` feeds the compliance scorer; `compressed_tokens`
/// is the short form injected into generation prompts; `logo_references`
/// are durable artifact URLs passed to the generator as reference images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub brand_id: BrandId,
    pub guidelines_full_text: String,
    pub compressed_tokens: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logo_references: Vec<String>,
}

impl BrandProfile {
    /// Whether this brand has logo reference images to carry into generations.
    pub fn has_logos(&self) -> bool {
        !self.logo_references.is_empty()
    }
}

#[cfg(test)]
#[path = "brand_tests.rs"]
mod tests;

//! Stack fingerprints for change detection.
//!
//! A fingerprint is the SHA-256 digest of a stack's canonical JSON form.
//! Maps are ordered and rendered durations are integers, so equal stacks
//! always produce equal fingerprints.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, StackError};
use crate::stack::{RenderedStack, RenderedService, Stack};

/// Hasher for computing stack fingerprints.
#[derive(Debug, Default)]
pub struct StackHasher;

impl StackHasher {
    /// Creates a new stack hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the fingerprint of a rendered stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack cannot be serialized.
    pub fn hash_rendered(&self, stack: &RenderedStack) -> Result<String> {
        digest(stack)
    }

    /// Computes the fingerprint of a templated stack, placeholders included.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack cannot be serialized.
    pub fn hash_template(&self, stack: &Stack) -> Result<String> {
        digest(stack)
    }

    /// Computes the fingerprint of one rendered service.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be serialized.
    pub fn hash_service(&self, service: &RenderedService) -> Result<String> {
        digest(service)
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

fn digest<T: Serialize>(value: &T) -> Result<String> {
    let canonical = serde_json::to_vec(value)
        .map_err(|e| StackError::internal(format!("Failed to serialize for hashing: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

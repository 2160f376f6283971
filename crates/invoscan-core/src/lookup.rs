//! Batched blacklist lookup.
//!
//! The scanner only ever asks one question of the blacklist store: which of
//! these IBANs are barred. Implementations must be safe to call from many
//! pipelines at once.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};

/// Read-only, batched existence lookup against the blacklist.
#[async_trait]
pub trait BlacklistLookup: Send + Sync {
    /// Return the subset of `candidates` that is blacklisted.
    ///
    /// Implementations answer with one round trip for the whole batch.
    async fn lookup_any(&self, candidates: &[String]) -> Result<HashSet<String>>;
}

#[async_trait]
impl BlacklistLookup for HashSet<String> {
    async fn lookup_any(&self, candidates: &[String]) -> Result<HashSet<String>> {
        Ok(candidates
            .iter()
            .filter(|candidate| self.contains(candidate.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BlacklistLookup for BTreeSet<String> {
    async fn lookup_any(&self, candidates: &[String]) -> Result<HashSet<String>> {
        Ok(candidates
            .iter()
            .filter(|candidate| self.contains(candidate.as_str()))
            .cloned()
            .collect())
    }
}

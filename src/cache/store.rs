//! Cache store abstraction
//!
//! Any backend that can persist a set of paths under a string key and later
//! restore the best match for a primary key plus fallbacks.

use crate::error::VcpkgResult;
use async_trait::async_trait;

/// Outcome of a single store save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSaveResult {
    /// Entry written
    Saved,
    /// Request was malformed (bad key, no usable paths)
    Invalid(String),
    /// Another writer already reserved or created this key
    Conflict,
    /// Any other backend failure
    Other(String),
}

/// Key-addressed cache backend
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Persist `paths` under `key`
    async fn save(&self, paths: &[String], key: &str) -> StoreSaveResult;

    /// Restore the best entry for `primary`, falling back to `restore_keys`
    ///
    /// Returns the key of the entry that was restored, if any.
    async fn restore(&self, primary: &str, restore_keys: &[String]) -> VcpkgResult<Option<String>>;

    /// Human-readable backend name for display
    fn store_name(&self) -> &'static str;
}

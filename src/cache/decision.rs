//! Save decision and save-outcome routing
//!
//! Deciding whether to save is pure. Performing the save goes through a
//! [`CacheStore`] and classifies its result: a malformed request is fatal, a
//! reservation conflict is expected, anything else is a warning.

use crate::cache::key::{is_exact_match, KeySet};
use crate::cache::paths::normalize_paths;
use crate::cache::store::{CacheStore, StoreSaveResult};
use crate::error::{VcpkgError, VcpkgResult};
use std::fmt;
use tracing::{info, warn, Level};

/// Whether to save, and what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDecision {
    pub should_save: bool,
    pub paths_to_cache: Vec<String>,
}

/// Decide whether a new entry should be written under `keys.primary`
///
/// Only an exact hit on the primary key skips the save; a hit on a restore
/// key means the restored state is older and a fresh entry is still wanted.
pub fn decide_save<S: AsRef<str>>(
    keys: &KeySet,
    hit_key: Option<&str>,
    candidate_paths: &[S],
) -> CacheDecision {
    if is_exact_match(&keys.primary, hit_key) {
        return CacheDecision {
            should_save: false,
            paths_to_cache: Vec::new(),
        };
    }

    CacheDecision {
        should_save: true,
        paths_to_cache: normalize_paths(candidate_paths.iter().map(AsRef::as_ref)),
    }
}

/// Why a save was not attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The restored entry already matches the primary key
    ExactHit(String),
    /// Caching is turned off in configuration
    Disabled,
}

/// Result of one save attempt that did not abort the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Skipped(SkipReason),
    Conflict,
    Other(String),
}

impl SaveOutcome {
    /// Log level this outcome is reported at
    pub fn level(&self) -> Level {
        match self {
            Self::Saved | Self::Skipped(_) | Self::Conflict => Level::INFO,
            Self::Other(_) => Level::WARN,
        }
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved => write!(f, "saved"),
            Self::Skipped(SkipReason::ExactHit(key)) => write!(f, "skipped (exact hit on {key})"),
            Self::Skipped(SkipReason::Disabled) => write!(f, "skipped (caching disabled)"),
            Self::Conflict => write!(f, "conflict (another writer owns the key)"),
            Self::Other(detail) => write!(f, "failed ({detail})"),
        }
    }
}

/// Decide and, if needed, save once through `store`
///
/// Only a validation failure is returned as an error.
pub async fn save_cache<S: AsRef<str>>(
    store: &dyn CacheStore,
    keys: &KeySet,
    hit_key: Option<&str>,
    candidate_paths: &[S],
) -> VcpkgResult<SaveOutcome> {
    let decision = decide_save(keys, hit_key, candidate_paths);

    if !decision.should_save {
        let hit = hit_key.unwrap_or_default().to_string();
        info!("Cache hit on '{}'; nothing to save", hit);
        return Ok(SaveOutcome::Skipped(SkipReason::ExactHit(hit)));
    }

    info!(
        "Saving {} path(s) to {} under '{}'",
        decision.paths_to_cache.len(),
        store.store_name(),
        keys.primary
    );

    let outcome = match store.save(&decision.paths_to_cache, &keys.primary).await {
        StoreSaveResult::Saved => SaveOutcome::Saved,
        StoreSaveResult::Invalid(reason) => return Err(VcpkgError::CacheValidation(reason)),
        StoreSaveResult::Conflict => SaveOutcome::Conflict,
        StoreSaveResult::Other(detail) => SaveOutcome::Other(detail),
    };

    match &outcome {
        SaveOutcome::Saved => info!("Cache saved under '{}'", keys.primary),
        SaveOutcome::Conflict => info!(
            "Cache entry '{}' is already reserved or created by another job",
            keys.primary
        ),
        SaveOutcome::Other(detail) => warn!("Failed to save cache '{}': {}", keys.primary, detail),
        SaveOutcome::Skipped(_) => {}
    }

    Ok(outcome)
}

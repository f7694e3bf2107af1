//! Cache key derivation
//!
//! A key is an ordered list of segments joined by [`KEY_SEGMENT_SEPARATOR`].
//! The first segment identifies the runner image and the vcpkg commit; any
//! further segments come from configuration. Restore keys are the primary
//! key with trailing segments dropped one at a time.

use crate::cache::identity::RepositoryIdentity;
use crate::env::EnvSignals;
use serde::Serialize;
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Separator placed between key segments
pub const KEY_SEGMENT_SEPARATOR: &str = "_";

/// Primary key plus progressively coarser fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySet {
    /// Most specific key
    pub primary: String,
    /// Prefixes of `primary`, most specific first
    pub restore_keys: Vec<String>,
}

impl KeySet {
    /// Build a key set from ordered segments
    ///
    /// For N segments this yields N-1 restore keys.
    pub fn from_segments(segments: &[String]) -> Self {
        let primary = segments.join(KEY_SEGMENT_SEPARATOR);
        let restore_keys = (1..segments.len())
            .rev()
            .map(|len| segments[..len].join(KEY_SEGMENT_SEPARATOR))
            .collect();

        Self {
            primary,
            restore_keys,
        }
    }
}

/// Where the commit id in the key came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSource {
    /// Detected from the checkout; an override supplied alongside is ignored
    Detected {
        commit_id: String,
        submodule: bool,
        ignored_override: Option<String>,
    },
    /// Supplied by the caller
    Override(String),
    /// No commit contributes to the key
    Unknown,
}

impl CommitSource {
    /// The commit id that ends up in the key
    pub fn commit_id(&self) -> Option<&str> {
        match self {
            Self::Detected { commit_id, .. } => Some(commit_id.as_str()),
            Self::Override(id) => Some(id.as_str()),
            Self::Unknown => None,
        }
    }
}

/// Pick the commit id for the key; a detected commit always beats an override
pub fn select_commit(identity: &RepositoryIdentity, user_override: Option<&str>) -> CommitSource {
    let user_override = user_override.filter(|c| !c.trim().is_empty());

    match (&identity.commit_id, user_override) {
        (Some(commit_id), ignored) => CommitSource::Detected {
            commit_id: commit_id.clone(),
            submodule: identity.is_submodule(),
            ignored_override: ignored.map(str::to_string),
        },
        (None, Some(id)) => CommitSource::Override(id.to_string()),
        (None, None) => CommitSource::Unknown,
    }
}

/// First key segment: runner image identity plus vcpkg commit
pub fn identity_segment(env: &EnvSignals, source: &CommitSource) -> String {
    let mut segment = format!(
        "runnerOS={}{}",
        env.os_identity(),
        env.image_version.as_deref().unwrap_or_default()
    );

    if let Some(commit) = source.commit_id() {
        segment.push_str("-vcpkgGitCommit=");
        segment.push_str(commit);
    }

    segment
}

/// Build the key set with the single identity segment
pub fn build_key_set(
    identity: &RepositoryIdentity,
    env: &EnvSignals,
    user_override: Option<&str>,
) -> KeySet {
    build_key_set_with_segments(identity, env, user_override, &[])
}

/// Build the key set with additional trailing segments
///
/// Blank extra segments are dropped.
pub fn build_key_set_with_segments(
    identity: &RepositoryIdentity,
    env: &EnvSignals,
    user_override: Option<&str>,
    extra_segments: &[String],
) -> KeySet {
    let source = select_commit(identity, user_override);
    log_commit_source(&source);

    let mut segments = vec![identity_segment(env, &source)];
    segments.extend(
        extra_segments
            .iter()
            .filter(|s| !s.trim().is_empty())
            .cloned(),
    );

    let keys = KeySet::from_segments(&segments);
    debug!(
        "Computed cache key '{}' with {} restore key(s)",
        keys.primary,
        keys.restore_keys.len()
    );
    keys
}

fn log_commit_source(source: &CommitSource) {
    match source {
        CommitSource::Detected {
            commit_id,
            submodule: true,
            ignored_override: Some(ignored),
        } => warn!(
            "vcpkg is a submodule at commit {}; the provided commit id '{}' is ignored",
            commit_id, ignored
        ),
        CommitSource::Detected {
            commit_id,
            ignored_override: Some(ignored),
            ..
        } => debug!(
            "Using checked-out vcpkg commit {} instead of provided '{}'",
            commit_id, ignored
        ),
        CommitSource::Detected { commit_id, .. } => {
            debug!("Using detected vcpkg commit {}", commit_id)
        }
        CommitSource::Override(id) => debug!("Using provided vcpkg commit {}", id),
        CommitSource::Unknown => {
            info!("No vcpkg commit id is known; the cache key will not include one")
        }
    }
}

/// Reduce a key to base letters: decompose, lowercase, drop combining marks
fn fold_key(key: &str) -> String {
    let mut folded = String::with_capacity(key.len());
    for c in key
        .nfd()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
    {
        match fold_letter(c) {
            Some(base) => folded.push_str(base),
            None => folded.push(c),
        }
    }
    folded
}

/// Letters with a stroke or ligature that have no canonical decomposition
fn fold_letter(c: char) -> Option<&'static str> {
    match c {
        'ø' => Some("o"),
        'ł' => Some("l"),
        'đ' => Some("d"),
        'ħ' => Some("h"),
        'ŧ' => Some("t"),
        'ß' => Some("ss"),
        _ => None,
    }
}

/// Whether `candidate` names the same entry as `key`, ignoring case and accents
pub fn is_exact_match(key: &str, candidate: Option<&str>) -> bool {
    match candidate {
        Some(candidate) => fold_key(key) == fold_key(candidate),
        None => false,
    }
}

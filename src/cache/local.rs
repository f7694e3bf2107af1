//! Directory-backed cache store
//!
//! Each entry lives in `<root>/<hash of key>/`. Creating that directory is
//! the reservation; `entry.json` is written last and marks the entry
//! complete. A directory without it is still building (or its writer
//! crashed) and is never restored.
//!
//! ```text
//! <root>/
//!   3f1c9a0e2b7d4c55/
//!     entry.json        key, created_at, recorded paths
//!     files/0           copy of the first cached path
//!     files/1/...       copy of a cached directory
//! ```

use crate::cache::store::{CacheStore, StoreSaveResult};
use crate::error::{VcpkgError, VcpkgResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Completion marker and metadata file inside an entry directory
pub const ENTRY_MANIFEST: &str = "entry.json";
/// Subdirectory holding copied paths
const FILES_DIR: &str = "files";
/// Longest accepted key
pub const MAX_KEY_LENGTH: usize = 512;

/// State of a cache entry directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No directory exists
    Miss,
    /// Reserved but not finalized
    Building,
    /// Finalized and restorable
    Complete,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Miss => "miss",
            Self::Building => "building",
            Self::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

/// Kind of a cached path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Dir,
}

/// A path recorded in an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPath {
    /// Index under `files/`
    pub index: usize,
    /// Original location, restored verbatim
    pub path: String,
    pub kind: PathKind,
}

/// Metadata of a complete entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub files: Vec<StoredPath>,
}

/// Cache store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalCacheStore {
    root: PathBuf,
}

impl LocalCacheStore {
    /// Create a store rooted at `root` (created lazily on first save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `key`: first 16 hex chars of its SHA256
    pub fn entry_dir(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root.join(hex::encode(&digest[..8]))
    }

    /// Current state of the entry for `key`
    pub fn entry_state(&self, key: &str) -> CacheState {
        let dir = self.entry_dir(key);
        if dir.join(ENTRY_MANIFEST).is_file() {
            CacheState::Complete
        } else if dir.is_dir() {
            CacheState::Building
        } else {
            CacheState::Miss
        }
    }

    /// Check a save request, returning the paths that exist with their kinds
    pub fn validate(&self, paths: &[String], key: &str) -> Result<Vec<(String, PathKind)>, String> {
        if key.trim().is_empty() {
            return Err("key is empty".to_string());
        }
        if key.chars().count() > MAX_KEY_LENGTH {
            return Err(format!(
                "key is longer than {} characters: {}",
                MAX_KEY_LENGTH, key
            ));
        }
        if key.contains(',') {
            return Err(format!("key must not contain commas: {}", key));
        }
        if paths.is_empty() {
            return Err("no paths to cache".to_string());
        }

        let mut existing = Vec::new();
        for path in paths {
            let p = Path::new(path);
            if p.is_dir() {
                existing.push((path.clone(), PathKind::Dir));
            } else if p.is_file() {
                existing.push((path.clone(), PathKind::File));
            } else {
                warn!("Path to cache does not exist, skipping: {}", path);
            }
        }

        if existing.is_empty() {
            return Err(format!("none of the paths exist: {}", paths.join(", ")));
        }

        Ok(existing)
    }

    /// Save with an explicit creation time
    pub fn save_entry(
        &self,
        paths: &[String],
        key: &str,
        created_at: DateTime<Utc>,
    ) -> StoreSaveResult {
        let existing = match self.validate(paths, key) {
            Ok(existing) => existing,
            Err(reason) => return StoreSaveResult::Invalid(reason),
        };

        if let Err(e) = fs::create_dir_all(&self.root) {
            return StoreSaveResult::Other(format!(
                "creating store root {}: {}",
                self.root.display(),
                e
            ));
        }

        let dir = self.entry_dir(key);
        match fs::create_dir(&dir) {
            Ok(()) => debug!("Reserved cache entry {}", dir.display()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return StoreSaveResult::Conflict;
            }
            Err(e) => {
                return StoreSaveResult::Other(format!("reserving {}: {}", dir.display(), e));
            }
        }

        match Self::write_entry(&dir, key, &existing, created_at) {
            Ok(()) => StoreSaveResult::Saved,
            Err(e) => {
                // Release the reservation so a later save can retry the key
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    warn!(
                        "Failed to remove incomplete cache entry {}: {}",
                        dir.display(),
                        cleanup
                    );
                }
                StoreSaveResult::Other(e.to_string())
            }
        }
    }

    fn write_entry(
        dir: &Path,
        key: &str,
        existing: &[(String, PathKind)],
        created_at: DateTime<Utc>,
    ) -> VcpkgResult<()> {
        let files_dir = dir.join(FILES_DIR);
        let mut files = Vec::with_capacity(existing.len());

        for (index, (path, kind)) in existing.iter().enumerate() {
            let dest = files_dir.join(index.to_string());
            copy_path(Path::new(path), &dest, *kind)?;
            files.push(StoredPath {
                index,
                path: path.clone(),
                kind: *kind,
            });
        }

        let entry = CacheEntry {
            key: key.to_string(),
            created_at,
            files,
        };

        let manifest = dir.join(ENTRY_MANIFEST);
        let tmp = dir.join(format!("{}.tmp", ENTRY_MANIFEST));
        fs::write(&tmp, serde_json::to_vec_pretty(&entry)?)
            .map_err(|e| VcpkgError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, &manifest)
            .map_err(|e| VcpkgError::io(format!("finalizing {}", manifest.display()), e))?;

        Ok(())
    }

    fn load_entry(dir: &Path) -> VcpkgResult<Option<CacheEntry>> {
        let manifest = dir.join(ENTRY_MANIFEST);
        if !manifest.is_file() {
            return Ok(None);
        }

        let content = fs::read(&manifest)
            .map_err(|e| VcpkgError::io(format!("reading {}", manifest.display()), e))?;
        let entry = serde_json::from_slice(&content).map_err(|e| VcpkgError::CacheEntryCorrupt {
            path: manifest.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(entry))
    }

    /// All complete entries; corrupt ones are skipped
    pub fn entries(&self) -> VcpkgResult<Vec<CacheEntry>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(&self.root)
            .map_err(|e| VcpkgError::io(format!("listing {}", self.root.display()), e))?;

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| VcpkgError::io("reading store entry", e))?;
            match Self::load_entry(&item.path()) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!("Ignoring cache entry: {}", e),
            }
        }

        Ok(entries)
    }

    /// Pick the entry to restore for `primary` and `restore_keys`
    pub fn find_entry(
        &self,
        primary: &str,
        restore_keys: &[String],
    ) -> VcpkgResult<Option<CacheEntry>> {
        if let Some(entry) = Self::load_entry(&self.entry_dir(primary))? {
            if entry.key == primary {
                return Ok(Some(entry));
            }
        }

        if restore_keys.is_empty() {
            return Ok(None);
        }

        let entries = self.entries()?;
        for prefix in restore_keys {
            let newest = entries
                .iter()
                .filter(|e| e.key.starts_with(prefix.as_str()))
                .max_by_key(|e| e.created_at);
            if let Some(entry) = newest {
                return Ok(Some(entry.clone()));
            }
        }

        Ok(None)
    }

    fn restore_entry(&self, entry: &CacheEntry) -> VcpkgResult<()> {
        let files_dir = self.entry_dir(&entry.key).join(FILES_DIR);
        for stored in &entry.files {
            let src = files_dir.join(stored.index.to_string());
            copy_path(&src, Path::new(&stored.path), stored.kind)?;
        }
        Ok(())
    }
}

/// Copy a file or a directory tree from `src` to `dest`
fn copy_path(src: &Path, dest: &Path, kind: PathKind) -> VcpkgResult<()> {
    match kind {
        PathKind::File => copy_file(src, dest),
        PathKind::Dir => {
            for entry in WalkDir::new(src).follow_links(false) {
                let entry = entry.map_err(|e| VcpkgError::Walk {
                    path: src.to_path_buf(),
                    reason: e.to_string(),
                })?;
                let Ok(rel) = entry.path().strip_prefix(src) else {
                    continue;
                };
                let target = dest.join(rel);

                let file_type = entry.file_type();
                if file_type.is_dir() {
                    fs::create_dir_all(&target).map_err(|e| {
                        VcpkgError::io(format!("creating {}", target.display()), e)
                    })?;
                } else if file_type.is_symlink() {
                    copy_symlink(entry.path(), &target)?;
                } else {
                    copy_file(entry.path(), &target)?;
                }
            }
            Ok(())
        }
    }
}

fn copy_file(src: &Path, dest: &Path) -> VcpkgResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| VcpkgError::io(format!("creating {}", parent.display()), e))?;
    }
    fs::copy(src, dest).map_err(|e| {
        VcpkgError::io(format!("copying {} to {}", src.display(), dest.display()), e)
    })?;
    Ok(())
}

/// Recreate the symlink at `src` as `dest`, pointing at the same target
#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> VcpkgResult<()> {
    let target = fs::read_link(src)
        .map_err(|e| VcpkgError::io(format!("reading link {}", src.display()), e))?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| VcpkgError::io(format!("creating {}", parent.display()), e))?;
    }
    if dest.symlink_metadata().is_ok() {
        fs::remove_file(dest)
            .map_err(|e| VcpkgError::io(format!("replacing {}", dest.display()), e))?;
    }
    std::os::unix::fs::symlink(&target, dest).map_err(|e| {
        VcpkgError::io(
            format!("linking {} to {}", dest.display(), target.display()),
            e,
        )
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dest: &Path) -> VcpkgResult<()> {
    warn!("Skipping symlink in cached tree: {}", src.display());
    Ok(())
}

#[async_trait]
impl CacheStore for LocalCacheStore {
    async fn save(&self, paths: &[String], key: &str) -> StoreSaveResult {
        self.save_entry(paths, key, Utc::now())
    }

    async fn restore(&self, primary: &str, restore_keys: &[String]) -> VcpkgResult<Option<String>> {
        let entry = match self.find_entry(primary, restore_keys) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                info!("No cache entry found for '{}'", primary);
                return Ok(None);
            }
            Err(e) => {
                warn!("Cache lookup failed, treating as a miss: {}", e);
                return Ok(None);
            }
        };

        if let Err(e) = self.restore_entry(&entry) {
            warn!("Failed to restore cache '{}', treating as a miss: {}", entry.key, e);
            return Ok(None);
        }

        info!("Restored cache entry '{}'", entry.key);
        Ok(Some(entry.key))
    }

    fn store_name(&self) -> &'static str {
        "local cache"
    }
}

//! Manifest lookup
//!
//! Locates the `vcpkg.json` manifest under the workspace. This is a quality
//! gate only: an ambiguous or empty result is reported, never fatal.

use crate::error::VcpkgResult;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default manifest pattern
pub const DEFAULT_MANIFEST_GLOB: &str = "**/vcpkg.json";

/// Default patterns excluded from the manifest search
///
/// The bare directory forms prune the walk; the `/**` forms exclude matches.
pub const DEFAULT_MANIFEST_IGNORE: &[&str] = &[
    "**/.git",
    "**/.git/**",
    "**/vcpkg",
    "**/vcpkg/**",
    "**/node_modules",
    "**/node_modules/**",
    "**/build",
    "**/build/**",
];

fn compile_globset(patterns: &[String]) -> VcpkgResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Find every file under `root` matching `pattern` and none of `ignore`
///
/// Matching is done on paths relative to `root`. Directories matching
/// `ignore` are not descended into. Unreadable entries are skipped with a
/// warning. Results are sorted.
pub fn find_files(root: &Path, pattern: &str, ignore: &[String]) -> VcpkgResult<Vec<PathBuf>> {
    let include = compile_globset(&[pattern.to_string()])?;
    let exclude = compile_globset(ignore)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().strip_prefix(root) {
                Ok(rel_path) => !exclude.is_match(rel_path),
                Err(_) => true,
            }
        });

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };

        if exclude.is_match(rel_path) {
            continue;
        }

        if include.is_match(rel_path) {
            matches.push(entry.path().to_path_buf());
        }
    }

    Ok(matches)
}

/// Locate exactly one manifest, or `None` with a warning
pub fn find_manifest(
    root: &Path,
    pattern: &str,
    ignore: &[String],
) -> VcpkgResult<Option<PathBuf>> {
    let mut matches = find_files(root, pattern, ignore)?;

    match matches.len() {
        0 => {
            warn!(
                "No file matched '{}' under {}; continuing without a manifest",
                pattern,
                root.display()
            );
            Ok(None)
        }
        1 => {
            let found = matches.remove(0);
            debug!("Found manifest: {}", found.display());
            Ok(Some(found))
        }
        n => {
            warn!(
                "{} files matched '{}', expected one: {}",
                n,
                pattern,
                matches
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(None)
        }
    }
}

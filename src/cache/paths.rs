//! Cacheable path normalization

use std::collections::HashSet;

/// Drop blank entries and duplicates, keeping first-occurrence order
pub fn normalize_paths<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|p| p.as_ref().to_string())
        .filter(|p| !p.trim().is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

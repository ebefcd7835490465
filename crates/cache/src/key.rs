// SPDX-License-Identifier: MIT

//! `compute_cache_key` (spec.md §4.9): a custom cache's key is derived by
//! hashing the concatenated bytes of every file its `key.files` globs
//! expand to, in sorted expansion order.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::CacheError;

/// A cache whose archive filename is suffixed with a content hash. Caches
/// without a `key` block use their bare name as the archive stem.
#[derive(Debug, Clone)]
pub struct CacheKey {
    pub files: Vec<String>,
}

/// Expands `key.files` against `root` and returns the matched paths in
/// sorted order. A glob that matches nothing is simply absent from the
/// result; callers decide whether an empty result makes the whole key
/// invalid.
pub fn expand_key_files(root: &Path, key: &CacheKey) -> Result<Vec<PathBuf>, CacheError> {
    let mut matched = Vec::new();
    for pattern in &key.files {
        let full_pattern = root.join(pattern);
        let pattern_str = full_pattern.to_string_lossy().into_owned();
        for entry in glob::glob(&pattern_str).map_err(|e| CacheError::InvalidCacheKey(e.to_string()))? {
            let path = entry.map_err(|e| CacheError::InvalidCacheKey(e.to_string()))?;
            if path.is_file() {
                matched.push(path);
            }
        }
    }
    matched.sort();
    Ok(matched)
}

/// `compute_cache_key(name, paths)`: concatenates file contents in sorted
/// glob-expansion order, hashes SHA-256, returns the first 64 hex chars
/// (the whole digest, since SHA-256 hex-encodes to exactly 64 chars).
pub fn compute_cache_key(paths: &[PathBuf]) -> Result<String, CacheError> {
    let mut hasher = Sha256::new();
    for path in paths {
        let bytes = std::fs::read(path)?;
        hasher.update(&bytes);
    }
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

/// The local archive filename stem for a cache, given its optional key
/// suffix: `<name>` or `<name>-<hash>`.
pub fn archive_stem(name: &str, key_suffix: Option<&str>) -> String {
    match key_suffix {
        Some(hash) => format!("{name}-{hash}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;

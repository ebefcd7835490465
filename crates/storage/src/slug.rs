// SPDX-License-Identifier: MIT

//! Derives a project's slug, key, and path_slug from its directory.

use sha2::{Digest, Sha256};

/// Lowercases and replaces runs of non-alphanumeric characters with a
/// single hyphen, trimming leading/trailing hyphens.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_sep = true;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('-');
            last_was_sep = true;
        }
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}

/// Uppercase initials of each hyphen-separated slug segment, e.g.
/// `"my-repo"` -> `"MR"`.
pub fn key_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter_map(|part| part.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// A short, stable hash of an absolute path, used to disambiguate two
/// projects that share a basename.
pub fn stable_hash(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    hex::encode(digest)[..12].to_string()
}

/// `slugify(basename) + "-" + stable_hash(path)`.
pub fn path_slug(repo_path: &std::path::Path) -> String {
    let basename = repo_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let path_str = repo_path.to_string_lossy();
    format!("{}-{}", slugify(&basename), stable_hash(&path_str))
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Per-project identity, persisted as a JSON sidecar by `cirun-storage`.

use crate::id::{ProjectUuid, RepoUuid};
use serde::{Deserialize, Serialize};

/// Stable per-project identity, loaded from or synthesized into
/// `<data-dir>/<path_slug>/meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Human-readable project name (the repo directory's basename).
    pub name: String,
    /// URL/env-safe slug derived from `name`.
    pub slug: String,
    /// Short uppercase key, conventionally the slug's initials.
    pub key: String,
    /// `slugify(basename) + "-" + stable_hash(repo_path)`, stable across
    /// renames-in-place but distinct per filesystem location.
    pub path_slug: String,
    pub project_uuid: ProjectUuid,
    pub repo_uuid: RepoUuid,
    /// Incremented once per run; exposed as `BITBUCKET_BUILD_NUMBER`.
    pub build_number: u64,
}

impl ProjectMetadata {
    /// Builds a fresh record for a project that has never run before.
    /// `slug` and `key` are derived the same way `cirun-storage` derives
    /// them from the directory basename so both can be unit-tested in
    /// isolation.
    pub fn fresh(name: &str, slug: &str, key: &str, path_slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            key: key.to_string(),
            path_slug: path_slug.to_string(),
            project_uuid: ProjectUuid(uuid::Uuid::new_v4()),
            repo_uuid: RepoUuid(uuid::Uuid::new_v4()),
            build_number: 0,
        }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;

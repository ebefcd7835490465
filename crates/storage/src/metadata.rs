// SPDX-License-Identifier: MIT

//! Loads and persists the project and workspace metadata sidecars.
//!
//! Both are written with a temp-file-then-rename so a crash mid-write
//! never leaves a truncated `meta.json` behind.

use std::fs;
use std::path::{Path, PathBuf};

use cirun_core::id::{OwnerUuid, WorkspaceUuid};
use cirun_core::{ProjectMetadata, WorkspaceMetadata};

use crate::error::StorageError;
use crate::slug::{key_from_slug, path_slug, slugify};

const PROJECT_META_FILE: &str = "meta.json";
const WORKSPACE_META_FILE: &str = "workspace.json";

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    ));
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn project_dir(data_dir: &Path, path_slug: &str) -> PathBuf {
    data_dir.join("projects").join(path_slug)
}

/// Loads a project's sidecar from `<data_dir>/projects/<path_slug>/meta.json`,
/// synthesizing a fresh record on first run. Does not itself bump
/// `build_number`; see [`next_build_number`].
pub fn load_project_metadata(repo_path: &Path, data_dir: &Path) -> Result<ProjectMetadata, StorageError> {
    let slug_for_path = path_slug(repo_path);
    let meta_path = project_dir(data_dir, &slug_for_path).join(PROJECT_META_FILE);

    if meta_path.exists() {
        let raw = fs::read(&meta_path)?;
        return Ok(serde_json::from_slice(&raw)?);
    }

    let basename = repo_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string());
    let slug = slugify(&basename);
    let key = key_from_slug(&slug);
    let fresh = ProjectMetadata::fresh(&basename, &slug, &key, &slug_for_path);
    save_project_metadata(repo_path, data_dir, &fresh)?;
    Ok(fresh)
}

pub fn save_project_metadata(
    repo_path: &Path,
    data_dir: &Path,
    metadata: &ProjectMetadata,
) -> Result<(), StorageError> {
    let slug_for_path = path_slug(repo_path);
    let meta_path = project_dir(data_dir, &slug_for_path).join(PROJECT_META_FILE);
    let contents = serde_json::to_vec_pretty(metadata)?;
    write_atomic(&meta_path, &contents)
}

/// Loads a project's metadata and atomically increments `build_number`,
/// persisting the result before returning it. Two successive calls on the
/// same `repo_path` yield `build_number` values `n` and `n + 1`.
pub fn next_build_number(repo_path: &Path, data_dir: &Path) -> Result<ProjectMetadata, StorageError> {
    let mut metadata = load_project_metadata(repo_path, data_dir)?;
    metadata.build_number += 1;
    save_project_metadata(repo_path, data_dir, &metadata)?;
    Ok(metadata)
}

/// Loads the once-per-user workspace record from `<data_dir>/workspace.json`,
/// generating a fresh RSA keypair and identity on first use.
pub fn load_or_create_workspace_metadata(data_dir: &Path) -> Result<WorkspaceMetadata, StorageError> {
    let meta_path = data_dir.join(WORKSPACE_META_FILE);

    if meta_path.exists() {
        let raw = fs::read(&meta_path)?;
        return Ok(serde_json::from_slice(&raw)?);
    }

    let keypair = cirun_oidc::generate_keypair()?;
    let metadata = WorkspaceMetadata::new(
        OwnerUuid(uuid::Uuid::new_v4()),
        WorkspaceUuid(uuid::Uuid::new_v4()),
        keypair.private_key_pem,
    );
    save_workspace_metadata(data_dir, &metadata)?;
    Ok(metadata)
}

pub fn save_workspace_metadata(data_dir: &Path, metadata: &WorkspaceMetadata) -> Result<(), StorageError> {
    let meta_path = data_dir.join(WORKSPACE_META_FILE);
    let contents = serde_json::to_vec_pretty(metadata)?;
    write_atomic(&meta_path, &contents)
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;

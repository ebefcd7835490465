// SPDX-License-Identifier: MIT

//! `safe_extract_tar` (spec.md §4.10, §3 invariant): extracts a tar
//! stream into a target directory, refusing any member whose resolved
//! path would land outside it.

use std::path::{Component, Path, PathBuf};

use crate::error::ArtifactError;

fn resolves_within(target_dir: &Path, member_name: &Path) -> bool {
    let mut resolved = target_dir.to_path_buf();
    for component in member_name.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                if !resolved.pop() {
                    return false;
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    resolved.starts_with(target_dir)
}

/// Extracts `tar_bytes` into `target_dir`, creating it if needed. Every
/// member's resolved destination is checked against `target_dir` before
/// anything is written; the first violation aborts extraction with
/// [`ArtifactError::PathTraversal`], leaving prior members already
/// written in place.
pub fn safe_extract_tar(tar_bytes: &[u8], target_dir: &Path) -> Result<(), ArtifactError> {
    std::fs::create_dir_all(target_dir)?;
    let mut archive = tar::Archive::new(tar_bytes);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let member_name: PathBuf = entry.path()?.into_owned();
        if !resolves_within(target_dir, &member_name) {
            return Err(ArtifactError::PathTraversal(member_name));
        }
        entry.unpack_in(target_dir)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "safe_extract_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Artifact upload (spec.md §4.10): walks the host artifact directory
//! and streams every regular file into a tar, preserving relative paths,
//! mode, and size, then `put_archive`s it into the build container.

use std::path::{Path, PathBuf};

use cirun_container::{ContainerEngine, ContainerRunner};

use crate::error::ArtifactError;

fn walk_files(root: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn tar_directory(root: &Path) -> Result<Vec<u8>, ArtifactError> {
    let mut builder = tar::Builder::new(Vec::new());
    for path in walk_files(root)? {
        let relative = path.strip_prefix(root).unwrap_or(&path);
        builder.append_path_with_name(&path, relative)?;
    }
    builder.into_inner().map_err(ArtifactError::from)
}

/// Tars `host_dir`'s contents and uploads them into the build container
/// at `remote_build_dir`. Surfaces failures as [`ArtifactError`].
pub async fn upload<E: ContainerEngine>(
    runner: &ContainerRunner<E>,
    host_dir: &Path,
    remote_build_dir: &str,
) -> Result<(), ArtifactError> {
    if !host_dir.exists() {
        tracing::debug!(dir = %host_dir.display(), "artifact directory absent, nothing to upload");
        return Ok(());
    }
    let tar_bytes = tar_directory(host_dir)?;
    tracing::debug!(dir = %host_dir.display(), bytes = tar_bytes.len(), "uploading artifact archive");
    runner.put_archive(remote_build_dir, tar_bytes).await?;
    Ok(())
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Artifact download (spec.md §4.10): finds every artifact-pattern match
//! inside the build container, tars them in place, pulls the tar back to
//! the host, and extracts it with the path-traversal guard from
//! [`crate::safe_extract`].

use cirun_container::{ContainerEngine, ContainerRunner};

use crate::error::ArtifactError;
use crate::safe_extract::safe_extract_tar;

fn find_and_tar_script(patterns: &[String], archive_name: &str) -> String {
    let find_clauses = patterns
        .iter()
        .map(|pattern| format!("-path './{pattern}'"))
        .collect::<Vec<_>>()
        .join(" -o ");
    format!("find . -type f \\( {find_clauses} \\) | tar cf {archive_name} -T -")
}

/// Collects every file under `remote_build_dir` matching one of
/// `patterns` into `<remote_build_dir>/artifacts-<step_uuid>.tar`, pulls
/// it back, and safely extracts it into `host_artifacts_dir`. A no-op if
/// `patterns` is empty or the resulting tar was never created (no match).
pub async fn download<E: ContainerEngine>(
    runner: &ContainerRunner<E>,
    patterns: &[String],
    remote_build_dir: &str,
    step_uuid: &str,
    host_artifacts_dir: &std::path::Path,
) -> Result<(), ArtifactError> {
    if patterns.is_empty() {
        return Ok(());
    }
    tracing::debug!(?patterns, "collecting artifacts from build container");

    let archive_name = format!("artifacts-{step_uuid}.tar");
    let script = find_and_tar_script(patterns, &archive_name);
    let mut discard = |_: &[u8]| {};
    runner
        .run_command(&cirun_shell::wrap_command(&script), None, &mut discard)
        .await?;

    let remote_archive = format!("{remote_build_dir}/{archive_name}");
    if !runner.path_exists(&remote_archive).await? {
        tracing::debug!("no artifacts matched the declared patterns");
        return Ok(());
    }

    let tar_bytes = runner.get_archive(&remote_archive).await?;
    safe_extract_tar(&tar_bytes, host_artifacts_dir)
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;

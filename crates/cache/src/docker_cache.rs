// SPDX-License-Identifier: MIT

//! The `docker` cache's specialization (spec.md §4.9): image load/save
//! instead of a plain directory move. The cache named `docker` is
//! excluded from the regular cache enumeration entirely.

use cirun_container::ContainerEngine;
use cirun_container::ContainerRunner;

use crate::error::CacheError;

pub const DOCKER_CACHE_NAME: &str = "docker";

/// Upload-side restore: loads the staged `images.tar` into the daemon
/// and removes the staged copy.
pub async fn upload_restore<E: ContainerEngine>(
    runner: &ContainerRunner<E>,
    remote_caches_dir: &str,
) -> Result<(), CacheError> {
    let script = format!(
        "docker image load < \"{remote_caches_dir}/images.tar\"; rm \"{remote_caches_dir}/images.tar\"\n"
    );
    let mut discard = |_: &[u8]| {};
    runner.run_command(&cirun_shell::wrap_command(&script), None, &mut discard).await?;
    Ok(())
}

/// Download-side prepare: collects `docker image ls -a -q` ids and
/// non-`<none>` repository names; if any exist, saves them to
/// `<caches_dir>/images.tar` on the container so the regular cache
/// archive step can pick it up. Returns whether a save was performed.
pub async fn download_prepare<E: ContainerEngine>(
    runner: &ContainerRunner<E>,
    remote_caches_dir: &str,
) -> Result<bool, CacheError> {
    let mut ids_buf = Vec::new();
    {
        let mut sink = |chunk: &[u8]| ids_buf.extend_from_slice(chunk);
        runner
            .run_command(&cirun_shell::wrap_command("docker image ls -a -q"), None, &mut sink)
            .await?;
    }
    let has_images = !String::from_utf8_lossy(&ids_buf).trim().is_empty();

    let mut repos_buf = Vec::new();
    {
        let mut sink = |chunk: &[u8]| repos_buf.extend_from_slice(chunk);
        runner
            .run_command(
                &cirun_shell::wrap_command("docker image ls --format '{{.Repository}}'"),
                None,
                &mut sink,
            )
            .await?;
    }
    let has_named_repos = String::from_utf8_lossy(&repos_buf)
        .lines()
        .any(|line| !line.trim().is_empty() && line.trim() != "<none>");

    if !has_images && !has_named_repos {
        return Ok(false);
    }

    let save_script = format!("docker image save $(docker image ls -a -q) -o \"{remote_caches_dir}/images.tar\"\n");
    let mut discard = |_: &[u8]| {};
    runner
        .run_command(&cirun_shell::wrap_command(&save_script), None, &mut discard)
        .await?;
    Ok(true)
}

#[cfg(test)]
#[path = "docker_cache_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Repository Cloner (spec.md §4.8): a one-shot `alpine/git` side
//! container that clones the read-only host bind into the shared
//! workspace volume before the build container starts.

use cirun_container::{ContainerEngine, ContainerSpec, Mount};
use cirun_spec::{CloneDepth, EffectiveCloneSettings};

use crate::context::{REMOTE_ORIGIN_DIR, REMOTE_WORKSPACE_DIR};
use crate::error::EngineError;

const CLONE_IMAGE: &str = "alpine/git";
/// This runner has no remote git host, so the clone identity is a fixed
/// local placeholder rather than an actual committer.
const CLONE_USER_NAME: &str = "pipeline";
const CLONE_USER_EMAIL: &str = "pipeline@local";

fn origin_url() -> String {
    format!("file://{REMOTE_ORIGIN_DIR}")
}

pub fn build_clone_script(effective: &EffectiveCloneSettings, branch: &str, commit: &str) -> String {
    let mut clone_cmd = String::from("git clone");
    if !effective.lfs {
        clone_cmd = format!("GIT_LFS_SKIP_SMUDGE=1 {clone_cmd}");
    }
    clone_cmd.push_str(&format!(" --branch '{branch}'"));
    if let CloneDepth::N(n) = effective.depth {
        clone_cmd.push_str(&format!(" --depth {n}"));
    }
    clone_cmd.push_str(&format!(" '{}' '{REMOTE_WORKSPACE_DIR}'", origin_url()));

    format!(
        "git config --system --add safe.directory '{REMOTE_WORKSPACE_DIR}/.git' && \
         {clone_cmd} && \
         cd '{REMOTE_WORKSPACE_DIR}' && \
         git reset --hard '{commit}' && \
         git config user.name '{CLONE_USER_NAME}' && \
         git config user.email '{CLONE_USER_EMAIL}' && \
         git config push.default current && \
         git remote set-url origin '{origin}' && \
         git reflog expire --all --expire=now && \
         echo '.bitbucket/pipelines/generated' >> .git/info/exclude",
        origin = origin_url(),
    )
}

fn clone_container_spec(name: &str, build_container_name: &str, repo_path: &str, workspace_volume: &str) -> ContainerSpec {
    ContainerSpec {
        name: name.to_string(),
        image: CLONE_IMAGE.to_string(),
        entrypoint: Some(vec!["sh".to_string()]),
        command: None,
        tty: false,
        working_dir: None,
        env: std::collections::HashMap::new(),
        mounts: vec![
            Mount {
                source: repo_path.to_string(),
                target: REMOTE_ORIGIN_DIR.to_string(),
                read_only: true,
            },
            Mount {
                source: workspace_volume.to_string(),
                target: REMOTE_WORKSPACE_DIR.to_string(),
                read_only: false,
            },
        ],
        network_mode: Some(format!("container:{build_container_name}")),
        privileged: false,
        cpu_limits: None,
        mem_limit_bytes: None,
    }
}

/// Skips entirely when `effective.enabled` is false.
#[tracing::instrument(skip(engine))]
pub async fn clone<E: ContainerEngine>(
    engine: &E,
    effective: &EffectiveCloneSettings,
    branch: &str,
    commit: &str,
    build_container_name: &str,
    repo_path: &str,
    workspace_volume: &str,
) -> Result<(), EngineError> {
    if !effective.enabled {
        tracing::debug!("clone disabled for this step, skipping");
        return Ok(());
    }

    let name = format!("{build_container_name}-clone");
    let spec = clone_container_spec(&name, build_container_name, repo_path, workspace_volume);
    engine.pull_image(&spec.image, None).await?;
    let id = engine.create_container(&spec).await?;
    engine.start_container(&id).await?;

    let script = build_clone_script(effective, branch, commit);
    let mut discard = |_: &[u8]| {};
    let outcome = engine
        .exec(&id, &["sh".to_string(), "-c".to_string(), script], None, &mut discard)
        .await?;
    engine.stop_container(&id, true).await?;

    if outcome.exit_code != 0 {
        return Err(EngineError::Repository(format!(
            "clone container exited with status {}",
            outcome.exit_code
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "clone_tests.rs"]
mod tests;

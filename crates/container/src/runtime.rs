// SPDX-License-Identifier: MIT

//! `ContainerRunner` (spec.md §4.6): owns the one build container a
//! pipeline run's steps execute inside, composing a [`ContainerEngine`]
//! with `cirun-shell`'s script rendering.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cirun_spec::{Line, StepSize};
use parking_lot::Mutex;

use crate::engine::{
    ContainerEngine, ContainerSpec, CpuLimits, ExecOutcome, Mount, OutputSink, RegistryCredentials,
};
use crate::error::ContainerError;

pub struct StartContainerParams {
    pub name: String,
    pub image: String,
    /// Named volume holding the cloned working tree (populated by the
    /// repository cloner before this container starts).
    pub workspace_volume: String,
    pub data_volume: String,
    pub remote_workspace_dir: String,
    pub remote_pipeline_dir: String,
    pub docker_sock_path: String,
    pub ssh_agent_sock: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub step_size: StepSize,
    pub cpu_limits_enabled: bool,
    pub total_memory_limit_bytes: i64,
    pub services_memory_bytes: i64,
    pub credentials: Option<RegistryCredentials>,
}

/// Owns one build container's lifecycle. Cheap to clone: the container id
/// is shared interior state behind a mutex, following the same
/// shared-adapter-handle shape the base workspace's adapters use.
#[derive(Clone)]
pub struct ContainerRunner<E: ContainerEngine> {
    engine: Arc<E>,
    container_id: Arc<Mutex<Option<String>>>,
}

impl<E: ContainerEngine> ContainerRunner<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            container_id: Arc::new(Mutex::new(None)),
        }
    }

    fn require_container_id(&self) -> Result<String, ContainerError> {
        self.container_id
            .lock()
            .clone()
            .ok_or(ContainerError::NotStarted)
    }

    pub async fn start_container(&self, params: StartContainerParams) -> Result<(), ContainerError> {
        self.engine.pull_image(&params.image, params.credentials).await?;

        let mut mounts = vec![
            Mount {
                source: params.workspace_volume,
                target: params.remote_workspace_dir.clone(),
                read_only: false,
            },
            Mount {
                source: params.data_volume,
                target: params.remote_pipeline_dir,
                read_only: false,
            },
            Mount {
                source: params.docker_sock_path,
                target: "/var/run/docker.sock".to_string(),
                read_only: false,
            },
        ];
        if let Some(sock) = &params.ssh_agent_sock {
            mounts.push(Mount {
                source: sock.to_string_lossy().to_string(),
                target: "/ssh-agent".to_string(),
                read_only: false,
            });
        }

        let multiplier = i64::from(params.step_size.multiplier());
        let cpu_limits = params.cpu_limits_enabled.then_some(CpuLimits {
            period: 100_000,
            quota: 100_000 * multiplier,
            shares: 1024 * multiplier,
        });
        let mem_limit_bytes = params.total_memory_limit_bytes * multiplier - params.services_memory_bytes;

        let spec = ContainerSpec {
            name: params.name,
            image: params.image,
            entrypoint: Some(vec!["sh".to_string()]),
            command: None,
            tty: true,
            working_dir: Some(params.remote_workspace_dir),
            env: params.env,
            mounts,
            network_mode: None,
            privileged: false,
            cpu_limits,
            mem_limit_bytes: Some(mem_limit_bytes),
        };

        let id = self.engine.create_container(&spec).await?;
        self.engine.start_container(&id).await?;
        *self.container_id.lock() = Some(id);
        Ok(())
    }

    /// Runs a step's `script`/`after-script` lines as one composed
    /// command, echoing each display line to `sink` first.
    #[tracing::instrument(skip(self, lines, sink))]
    pub async fn run_script(&self, lines: &[Line], sink: &mut dyn OutputSink) -> Result<i32, ContainerError> {
        let id = self.require_container_id()?;
        let plan = cirun_shell::compose(lines);
        for line in &plan.display_lines {
            sink.on_chunk(line.as_bytes());
            sink.on_chunk(b"\n");
        }
        let cmd = cirun_shell::wrap_command(&plan.joined);
        let outcome = self.engine.exec(&id, &cmd, None, sink).await?;
        Ok(outcome.exit_code)
    }

    pub async fn run_command(
        &self,
        cmd: &[String],
        user: Option<&str>,
        sink: &mut dyn OutputSink,
    ) -> Result<i32, ContainerError> {
        let id = self.require_container_id()?;
        let outcome = self.engine.exec(&id, cmd, user, sink).await?;
        Ok(outcome.exit_code)
    }

    pub async fn put_archive(&self, path: &str, tar_bytes: Vec<u8>) -> Result<(), ContainerError> {
        let id = self.require_container_id()?;
        self.engine.put_archive(&id, path, tar_bytes).await
    }

    pub async fn get_archive(&self, path: &str) -> Result<Vec<u8>, ContainerError> {
        let id = self.require_container_id()?;
        self.engine.get_archive(&id, path).await
    }

    pub async fn path_exists(&self, path: &str) -> Result<bool, ContainerError> {
        let id = self.require_container_id()?;
        let mut discard: Box<dyn OutputSink> = Box::new(|_: &[u8]| {});
        let outcome: ExecOutcome = self
            .engine
            .exec(
                &id,
                &["sh".to_string(), "-c".to_string(), format!("[ -e \"{path}\" ]")],
                None,
                discard.as_mut(),
            )
            .await?;
        Ok(outcome.exit_code == 0)
    }

    /// Copies a cached static `docker` binary into the build container
    /// when the `docker` service is requested but the image has no
    /// `docker` binary of its own.
    pub async fn install_docker_client_if_needed(
        &self,
        services: &[String],
        static_binary_path: &Path,
    ) -> Result<(), ContainerError> {
        if !services.iter().any(|s| s == "docker") {
            return Ok(());
        }
        if self.probe_has_docker_binary().await? {
            return Ok(());
        }
        let bytes = std::fs::read(static_binary_path)?;
        let tar_bytes = tar_single_executable("docker", &bytes)?;
        self.put_archive("/usr/bin", tar_bytes).await
    }

    async fn probe_has_docker_binary(&self) -> Result<bool, ContainerError> {
        let id = self.require_container_id()?;
        let mut discard: Box<dyn OutputSink> = Box::new(|_: &[u8]| {});
        let outcome = self
            .engine
            .exec(
                &id,
                &["sh".to_string(), "-c".to_string(), "command -v docker".to_string()],
                None,
                discard.as_mut(),
            )
            .await?;
        Ok(outcome.exit_code == 0)
    }

    pub async fn stop(&self) -> Result<(), ContainerError> {
        let id = self.require_container_id()?;
        self.engine.stop_container(&id, true).await?;
        *self.container_id.lock() = None;
        Ok(())
    }
}

fn tar_single_executable(name: &str, bytes: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, name, bytes)?;
    builder.into_inner().map_err(ContainerError::from)
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;

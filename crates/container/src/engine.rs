// SPDX-License-Identifier: MIT

//! The `ContainerEngine` trait: a pluggable container backend, the way the
//! base workspace's adapter traits pluggable agent/notify backends behind
//! a common interface. [`crate::docker::DockerEngine`] is the only
//! production implementation; tests substitute
//! [`crate::fake::FakeContainerEngine`].

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ContainerError;

#[derive(Debug, Clone, Default)]
pub struct Mount {
    pub source: String,
    pub target: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CpuLimits {
    pub period: i64,
    pub quota: i64,
    pub shares: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub entrypoint: Option<Vec<String>>,
    pub command: Option<Vec<String>>,
    pub tty: bool,
    pub working_dir: Option<String>,
    pub env: HashMap<String, String>,
    pub mounts: Vec<Mount>,
    pub network_mode: Option<String>,
    pub privileged: bool,
    pub cpu_limits: Option<CpuLimits>,
    pub mem_limit_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOutcome {
    pub exit_code: i32,
}

#[derive(Debug, Clone, Default)]
pub struct EngineVersion {
    pub platform_name: Option<String>,
}

/// Receives exec output as it streams off the container, one chunk at a
/// time, so a run never has to buffer a whole script's output in memory.
pub trait OutputSink: Send {
    fn on_chunk(&mut self, chunk: &[u8]);
}

impl<F: FnMut(&[u8]) + Send> OutputSink for F {
    fn on_chunk(&mut self, chunk: &[u8]) {
        (self)(chunk)
    }
}

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn version(&self) -> Result<EngineVersion, ContainerError>;

    async fn pull_image(
        &self,
        image: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<(), ContainerError>;

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ContainerError>;

    async fn start_container(&self, id: &str) -> Result<(), ContainerError>;

    async fn exec(
        &self,
        id: &str,
        cmd: &[String],
        user: Option<&str>,
        sink: &mut dyn OutputSink,
    ) -> Result<ExecOutcome, ContainerError>;

    async fn put_archive(&self, id: &str, path: &str, tar_bytes: Vec<u8>) -> Result<(), ContainerError>;

    async fn get_archive(&self, id: &str, path: &str) -> Result<Vec<u8>, ContainerError>;

    async fn create_network(&self, name: &str) -> Result<(), ContainerError>;

    async fn remove_network(&self, name: &str) -> Result<(), ContainerError>;

    async fn create_volume(&self, name: &str) -> Result<(), ContainerError>;

    async fn stop_container(&self, id: &str, remove_volumes: bool) -> Result<(), ContainerError>;
}

// SPDX-License-Identifier: MIT

//! In-memory `ContainerEngine` for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::{
    ContainerEngine, ContainerSpec, EngineVersion, ExecOutcome, OutputSink, RegistryCredentials,
};
use crate::error::ContainerError;

#[derive(Debug, Clone)]
pub struct ExecCall {
    pub container_id: String,
    pub cmd: Vec<String>,
}

struct FakeState {
    next_container_id: u64,
    containers: HashMap<String, ContainerSpec>,
    archives: HashMap<(String, String), Vec<u8>>,
    exec_calls: Vec<ExecCall>,
    exit_code: i32,
    pulled_images: Vec<String>,
    platform_name: Option<String>,
    exec_output: Vec<u8>,
}

/// Fake container engine for testing. Every container is created and
/// "started" in memory; `exec` records the call and returns the
/// configured exit code without touching a real daemon.
#[derive(Clone)]
pub struct FakeContainerEngine {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeContainerEngine {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                next_container_id: 0,
                containers: HashMap::new(),
                archives: HashMap::new(),
                exec_calls: Vec::new(),
                exit_code: 0,
                pulled_images: Vec::new(),
                platform_name: None,
                exec_output: Vec::new(),
            })),
        }
    }
}

impl FakeContainerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform_name(self, name: &str) -> Self {
        self.inner.lock().platform_name = Some(name.to_string());
        self
    }

    pub fn set_exit_code(&self, code: i32) {
        self.inner.lock().exit_code = code;
    }

    /// Queues bytes to be written to the next `exec` call's sink, e.g. to
    /// simulate a probe command's stdout.
    pub fn queue_exec_output(&self, bytes: &[u8]) {
        self.inner.lock().exec_output = bytes.to_vec();
    }

    pub fn exec_calls(&self) -> Vec<ExecCall> {
        self.inner.lock().exec_calls.clone()
    }

    pub fn pulled_images(&self) -> Vec<String> {
        self.inner.lock().pulled_images.clone()
    }

    pub fn container_spec(&self, id: &str) -> Option<ContainerSpec> {
        self.inner.lock().containers.get(id).cloned()
    }
}

#[async_trait]
impl ContainerEngine for FakeContainerEngine {
    async fn version(&self) -> Result<EngineVersion, ContainerError> {
        Ok(EngineVersion {
            platform_name: self.inner.lock().platform_name.clone(),
        })
    }

    async fn pull_image(
        &self,
        image: &str,
        _credentials: Option<RegistryCredentials>,
    ) -> Result<(), ContainerError> {
        self.inner.lock().pulled_images.push(image.to_string());
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ContainerError> {
        let mut state = self.inner.lock();
        state.next_container_id += 1;
        let id = format!("fake-container-{}", state.next_container_id);
        state.containers.insert(id.clone(), spec.clone());
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> Result<(), ContainerError> {
        if self.inner.lock().containers.contains_key(id) {
            Ok(())
        } else {
            Err(ContainerError::NotStarted)
        }
    }

    async fn exec(
        &self,
        id: &str,
        cmd: &[String],
        _user: Option<&str>,
        sink: &mut dyn OutputSink,
    ) -> Result<ExecOutcome, ContainerError> {
        let (exit_code, output) = {
            let mut state = self.inner.lock();
            state.exec_calls.push(ExecCall {
                container_id: id.to_string(),
                cmd: cmd.to_vec(),
            });
            (state.exit_code, std::mem::take(&mut state.exec_output))
        };
        if !output.is_empty() {
            sink.on_chunk(&output);
        }
        Ok(ExecOutcome { exit_code })
    }

    async fn put_archive(&self, id: &str, path: &str, tar_bytes: Vec<u8>) -> Result<(), ContainerError> {
        self.inner
            .lock()
            .archives
            .insert((id.to_string(), path.to_string()), tar_bytes);
        Ok(())
    }

    async fn get_archive(&self, id: &str, path: &str) -> Result<Vec<u8>, ContainerError> {
        Ok(self
            .inner
            .lock()
            .archives
            .get(&(id.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_network(&self, _name: &str) -> Result<(), ContainerError> {
        Ok(())
    }

    async fn remove_network(&self, _name: &str) -> Result<(), ContainerError> {
        Ok(())
    }

    async fn create_volume(&self, _name: &str) -> Result<(), ContainerError> {
        Ok(())
    }

    async fn stop_container(&self, id: &str, _remove_volumes: bool) -> Result<(), ContainerError> {
        self.inner.lock().containers.remove(id);
        Ok(())
    }
}

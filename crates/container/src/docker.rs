// SPDX-License-Identifier: MIT

//! The Docker Engine API implementation of [`ContainerEngine`], via
//! `bollard`.

use bollard::auth::DockerCredentials;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, RemoveContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::network::CreateNetworkOptions;
use bollard::service::{HostConfig, Mount as BollardMount, MountTypeEnum};
use bollard::volume::CreateVolumeOptions;
use bollard::Docker;
use futures_util::StreamExt;

use crate::engine::{
    ContainerEngine, ContainerSpec, EngineVersion, ExecOutcome, OutputSink, RegistryCredentials,
};
use crate::error::ContainerError;

pub struct DockerEngine {
    client: Docker,
}

impl DockerEngine {
    pub fn connect_with_local_defaults() -> Result<Self, ContainerError> {
        Ok(Self {
            client: Docker::connect_with_local_defaults()?,
        })
    }
}

#[async_trait::async_trait]
impl ContainerEngine for DockerEngine {
    async fn version(&self) -> Result<EngineVersion, ContainerError> {
        let version = self.client.version().await?;
        let platform_name = version.platform.map(|p| p.name);
        Ok(EngineVersion { platform_name })
    }

    async fn pull_image(
        &self,
        image: &str,
        credentials: Option<RegistryCredentials>,
    ) -> Result<(), ContainerError> {
        let docker_credentials = credentials.map(|c| DockerCredentials {
            username: Some(c.username),
            password: Some(c.password),
            ..DockerCredentials::default()
        });

        let options = CreateImageOptions::<String> {
            from_image: image.to_string(),
            ..CreateImageOptions::default()
        };

        let mut stream = self.client.create_image(Some(options), None, docker_credentials);
        while let Some(update) = stream.next().await {
            let info = update?;
            if let Some(error) = info.error {
                return Err(ContainerError::Exec(format!(
                    "failed to pull image `{image}`: {error}"
                )));
            }
        }
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<String, ContainerError> {
        let mut mounts = Vec::with_capacity(spec.mounts.len());
        for mount in &spec.mounts {
            mounts.push(BollardMount {
                source: Some(mount.source.clone()),
                target: Some(mount.target.clone()),
                typ: Some(MountTypeEnum::BIND),
                read_only: Some(mount.read_only),
                ..BollardMount::default()
            });
        }

        let host_config = HostConfig {
            mounts: Some(mounts),
            network_mode: spec.network_mode.clone(),
            privileged: Some(spec.privileged),
            memory: spec.mem_limit_bytes,
            cpu_period: spec.cpu_limits.map(|l| l.period),
            cpu_quota: spec.cpu_limits.map(|l| l.quota),
            cpu_shares: spec.cpu_limits.map(|l| l.shares),
            ..HostConfig::default()
        };

        let env: Vec<String> = spec
            .env
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        let config = Config {
            image: Some(spec.image.clone()),
            entrypoint: spec.entrypoint.clone(),
            cmd: spec.command.clone(),
            tty: Some(spec.tty),
            working_dir: spec.working_dir.clone(),
            env: Some(env),
            host_config: Some(host_config),
            ..Config::default()
        };

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let response = self.client.create_container(Some(options), config).await?;
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> Result<(), ContainerError> {
        self.client
            .start_container::<String>(id, None)
            .await
            .map_err(ContainerError::from)
    }

    async fn exec(
        &self,
        id: &str,
        cmd: &[String],
        user: Option<&str>,
        sink: &mut dyn OutputSink,
    ) -> Result<ExecOutcome, ContainerError> {
        let exec = self
            .client
            .create_exec(
                id,
                CreateExecOptions {
                    cmd: Some(cmd.to_vec()),
                    user: user.map(str::to_string),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..CreateExecOptions::default()
                },
            )
            .await?;

        if let StartExecResults::Attached { mut output, .. } =
            self.client.start_exec(&exec.id, None).await?
        {
            while let Some(chunk) = output.next().await {
                match chunk? {
                    LogOutput::StdOut { message } | LogOutput::StdErr { message } => {
                        sink.on_chunk(&message);
                    }
                    _ => {}
                }
            }
        }

        let inspect = self.client.inspect_exec(&exec.id).await?;
        Ok(ExecOutcome {
            exit_code: inspect.exit_code.unwrap_or(-1) as i32,
        })
    }

    async fn put_archive(&self, id: &str, path: &str, tar_bytes: Vec<u8>) -> Result<(), ContainerError> {
        let options = bollard::container::UploadToContainerOptions {
            path: path.to_string(),
            ..Default::default()
        };
        self.client
            .upload_to_container(id, Some(options), tar_bytes.into())
            .await
            .map_err(ContainerError::from)
    }

    async fn get_archive(&self, id: &str, path: &str) -> Result<Vec<u8>, ContainerError> {
        let options = bollard::container::DownloadFromContainerOptions { path: path.to_string() };
        let mut stream = self.client.download_from_container(id, Some(options));
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(bytes)
    }

    async fn create_network(&self, name: &str) -> Result<(), ContainerError> {
        let options = CreateNetworkOptions {
            name: name.to_string(),
            ..Default::default()
        };
        self.client.create_network(options).await?;
        Ok(())
    }

    async fn remove_network(&self, name: &str) -> Result<(), ContainerError> {
        self.client.remove_network(name).await.map_err(ContainerError::from)
    }

    async fn create_volume(&self, name: &str) -> Result<(), ContainerError> {
        let options = CreateVolumeOptions {
            name: name.to_string(),
            ..Default::default()
        };
        self.client.create_volume(options).await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str, remove_volumes: bool) -> Result<(), ContainerError> {
        let _ = self.client.stop_container(id, None).await;
        let options = RemoveContainerOptions {
            force: true,
            v: remove_volumes,
            ..Default::default()
        };
        self.client
            .remove_container(id, Some(options))
            .await
            .map_err(ContainerError::from)
    }
}

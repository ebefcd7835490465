// SPDX-License-Identifier: MIT

//! Services Manager (spec.md §4.7): side-car service containers sharing
//! a step's bridge network, with the `docker` service specialized for
//! docker-in-docker builds.

use std::collections::HashMap;
use std::path::Path;

use cirun_container::{ContainerEngine, ContainerSpec, Mount};
use cirun_spec::Service;
use indexmap::IndexMap;

use crate::error::EngineError;

const DOCKER_TEARDOWN_SCRIPT: &str = "docker kill $(docker ps -q) 2>/dev/null; \
     docker container prune -f; docker volume prune -f";

pub struct StartedService {
    pub name: String,
    pub container_id: String,
}

pub(crate) fn container_name(project_slug: &str, service_name: &str) -> String {
    format!("{project_slug}-service-{service_name}")
}

fn memory_mib(service: &Service, default_memory_mib: u64) -> u64 {
    service.memory.unwrap_or(default_memory_mib)
}

/// Fails if the sum of requested service memory exceeds the budget
/// `total_memory_limit_mib * step_multiplier - build_container_minimum_memory_mib`.
pub fn check_memory_budget(
    services: &[&Service],
    default_memory_mib: u64,
    total_memory_limit_mib: u64,
    step_multiplier: u32,
    build_container_minimum_memory_mib: u64,
) -> Result<(), EngineError> {
    let requested: u64 = services.iter().map(|s| memory_mib(s, default_memory_mib)).sum();
    let available = total_memory_limit_mib
        .saturating_mul(u64::from(step_multiplier))
        .saturating_sub(build_container_minimum_memory_mib);
    if requested > available {
        return Err(EngineError::ServiceMemoryBudget { requested, available });
    }
    Ok(())
}

fn docker_spec(
    name: &str,
    service: &Service,
    project_slug: &str,
    network: &str,
    pipeline_cache_dir: &Path,
    data_volume: &str,
    remote_pipeline_dir: &str,
    default_memory_mib: u64,
) -> ContainerSpec {
    let image = service.image.clone().unwrap_or_default();
    let mut env: HashMap<String, String> = service.variables.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    env.insert("DOCKER_TLS_CERTDIR".to_string(), String::new());

    ContainerSpec {
        name: container_name(project_slug, name),
        image: image.name,
        entrypoint: None,
        command: Some(vec!["--tls=false".to_string()]),
        tty: false,
        working_dir: None,
        env,
        mounts: vec![
            Mount {
                source: pipeline_cache_dir.join("docker").to_string_lossy().to_string(),
                target: "/var/lib/docker".to_string(),
                read_only: false,
            },
            Mount {
                source: data_volume.to_string(),
                target: remote_pipeline_dir.to_string(),
                read_only: false,
            },
        ],
        network_mode: Some(network.to_string()),
        privileged: true,
        cpu_limits: None,
        mem_limit_bytes: Some((memory_mib(service, default_memory_mib) * 1024 * 1024) as i64),
    }
}

fn plain_spec(name: &str, service: &Service, project_slug: &str, network: &str, default_memory_mib: u64) -> ContainerSpec {
    let image = service.image.clone().unwrap_or_default();
    ContainerSpec {
        name: container_name(project_slug, name),
        image: image.name,
        entrypoint: None,
        command: service.command.clone().map(|c| vec!["sh".to_string(), "-c".to_string(), c]),
        tty: false,
        working_dir: None,
        env: service.variables.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        mounts: Vec::new(),
        network_mode: Some(network.to_string()),
        privileged: false,
        cpu_limits: None,
        mem_limit_bytes: Some((memory_mib(service, default_memory_mib) * 1024 * 1024) as i64),
    }
}

/// Starts every `requested` service looked up in `effective_services`,
/// checking the memory budget first. Fails with
/// [`EngineError::InvalidService`] for a name absent from the merged map.
#[tracing::instrument(skip(engine, effective_services, pipeline_cache_dir))]
pub async fn start_services<E: ContainerEngine>(
    engine: &E,
    requested: &[String],
    effective_services: &IndexMap<String, Service>,
    project_slug: &str,
    network: &str,
    pipeline_cache_dir: &Path,
    data_volume: &str,
    remote_pipeline_dir: &str,
    default_memory_mib: u64,
    total_memory_limit_mib: u64,
    step_multiplier: u32,
    build_container_minimum_memory_mib: u64,
) -> Result<Vec<StartedService>, EngineError> {
    let mut resolved = Vec::with_capacity(requested.len());
    for name in requested {
        let service = effective_services
            .get(name)
            .ok_or_else(|| EngineError::InvalidService(name.clone()))?;
        resolved.push((name, service));
    }

    check_memory_budget(
        &resolved.iter().map(|(_, s)| *s).collect::<Vec<_>>(),
        default_memory_mib,
        total_memory_limit_mib,
        step_multiplier,
        build_container_minimum_memory_mib,
    )?;

    let mut started = Vec::with_capacity(resolved.len());
    for (name, service) in resolved {
        let spec = if name == "docker" {
            docker_spec(
                name,
                service,
                project_slug,
                network,
                pipeline_cache_dir,
                data_volume,
                remote_pipeline_dir,
                default_memory_mib,
            )
        } else {
            plain_spec(name, service, project_slug, network, default_memory_mib)
        };
        engine.pull_image(&spec.image, None).await?;
        let id = engine.create_container(&spec).await?;
        engine.start_container(&id).await?;
        tracing::info!(service = %name, container = %id, "service started");
        started.push(StartedService {
            name: name.clone(),
            container_id: id,
        });
    }
    Ok(started)
}

/// Stops every started service, running the docker-specific teardown
/// script first for the `docker` service.
pub async fn stop_services<E: ContainerEngine>(engine: &E, started: &[StartedService]) -> Result<(), EngineError> {
    for service in started {
        if service.name == "docker" {
            let mut discard = |_: &[u8]| {};
            let _ = engine
                .exec(
                    &service.container_id,
                    &["sh".to_string(), "-c".to_string(), DOCKER_TEARDOWN_SCRIPT.to_string()],
                    None,
                    &mut discard,
                )
                .await;
        }
        engine.stop_container(&service.container_id, true).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;

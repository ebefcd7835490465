// SPDX-License-Identifier: MIT

use super::*;
use cirun_container::fake::FakeContainerEngine;
use cirun_spec::Image;

fn service(image: &str, memory: Option<u64>) -> Service {
    Service {
        image: Some(Image {
            name: image.to_string(),
            ..Default::default()
        }),
        variables: IndexMap::new(),
        memory,
        command: None,
    }
}

fn effective_services() -> IndexMap<String, Service> {
    let mut map = IndexMap::new();
    map.insert("redis".to_string(), service("redis:7", Some(256)));
    map.insert("docker".to_string(), service("docker:dind", Some(1024)));
    map
}

#[test]
fn memory_budget_passes_when_within_limit() {
    let redis = service("redis:7", Some(256));
    let result = check_memory_budget(&[&redis], 1024, 4096, 1, 1024);
    assert!(result.is_ok());
}

#[test]
fn memory_budget_fails_when_requested_exceeds_available() {
    let big = service("redis:7", Some(4096));
    let result = check_memory_budget(&[&big], 1024, 4096, 1, 1024);
    assert!(matches!(
        result,
        Err(EngineError::ServiceMemoryBudget { requested: 4096, available: 3072 })
    ));
}

#[tokio::test]
async fn starting_unknown_service_fails() {
    let engine = FakeContainerEngine::new();
    let result = start_services(
        &engine,
        &["missing".to_string()],
        &IndexMap::new(),
        "demo",
        "demo-net",
        std::path::Path::new("/cache/demo"),
        "demo-data",
        "/pipeline",
        1024,
        4096,
        1,
        1024,
    )
    .await;
    assert!(matches!(result, Err(EngineError::InvalidService(name)) if name == "missing"));
}

#[tokio::test]
async fn docker_service_gets_privileged_spec_and_mounts() {
    let engine = FakeContainerEngine::new();
    let started = start_services(
        &engine,
        &["docker".to_string()],
        &effective_services(),
        "demo",
        "demo-net",
        std::path::Path::new("/cache/demo"),
        "demo-data",
        "/pipeline",
        1024,
        4096,
        1,
        1024,
    )
    .await
    .expect("start");

    assert_eq!(started.len(), 1);
    let spec = engine.container_spec(&started[0].container_id).expect("spec");
    assert!(spec.privileged);
    assert_eq!(spec.command, Some(vec!["--tls=false".to_string()]));
    assert_eq!(spec.env.get("DOCKER_TLS_CERTDIR"), Some(&String::new()));
    assert_eq!(spec.mounts.len(), 2);
    assert_eq!(spec.mounts[1].source, "demo-data");
    assert_eq!(spec.mounts[1].target, "/pipeline");
    assert_eq!(spec.name, "demo-service-docker");
}

#[tokio::test]
async fn plain_service_is_not_privileged() {
    let engine = FakeContainerEngine::new();
    let started = start_services(
        &engine,
        &["redis".to_string()],
        &effective_services(),
        "demo",
        "demo-net",
        std::path::Path::new("/cache/demo"),
        "demo-data",
        "/pipeline",
        1024,
        4096,
        1,
        1024,
    )
    .await
    .expect("start");

    let spec = engine.container_spec(&started[0].container_id).expect("spec");
    assert!(!spec.privileged);
    assert_eq!(spec.mem_limit_bytes, Some(256 * 1024 * 1024));
}

#[tokio::test]
async fn stopping_docker_service_runs_teardown_script_first() {
    let engine = FakeContainerEngine::new();
    let started = start_services(
        &engine,
        &["docker".to_string()],
        &effective_services(),
        "demo",
        "demo-net",
        std::path::Path::new("/cache/demo"),
        "demo-data",
        "/pipeline",
        1024,
        4096,
        1,
        1024,
    )
    .await
    .expect("start");

    stop_services(&engine, &started).await.expect("stop");
    let calls = engine.exec_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].container_id, started[0].container_id);
}

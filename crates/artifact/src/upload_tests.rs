// SPDX-License-Identifier: MIT

use super::*;
use cirun_container::fake::FakeContainerEngine;
use cirun_container::{ContainerRunner, StartContainerParams};
use std::sync::Arc;
use tempfile::tempdir;

async fn started_runner() -> (ContainerRunner<FakeContainerEngine>, FakeContainerEngine) {
    let engine = FakeContainerEngine::new();
    let runner = ContainerRunner::new(Arc::new(engine.clone()));
    runner
        .start_container(StartContainerParams {
            name: "build".to_string(),
            image: "alpine".to_string(),
            workspace_volume: "pipeline-workspace".to_string(),
            data_volume: "data".to_string(),
            remote_workspace_dir: "/ws".to_string(),
            remote_pipeline_dir: "/pipeline".to_string(),
            docker_sock_path: "/var/run/docker.sock".to_string(),
            ssh_agent_sock: None,
            env: Default::default(),
            step_size: cirun_spec::StepSize::X1,
            cpu_limits_enabled: false,
            total_memory_limit_bytes: 1,
            services_memory_bytes: 0,
            credentials: None,
        })
        .await
        .expect("start");
    (runner, engine)
}

#[test]
fn tar_directory_preserves_relative_paths() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("top.txt"), b"top").expect("write top");
    std::fs::create_dir(dir.path().join("nested")).expect("mkdir nested");
    std::fs::write(dir.path().join("nested/inner.txt"), b"inner").expect("write inner");

    let bytes = tar_directory(dir.path()).expect("tar");
    let mut archive = tar::Archive::new(bytes.as_slice());
    let mut names: Vec<String> = archive
        .entries()
        .expect("entries")
        .map(|e| e.expect("entry").path().expect("path").to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["nested/inner.txt", "top.txt"]);
}

#[tokio::test]
async fn upload_skips_missing_host_dir() {
    let (runner, _engine) = started_runner().await;
    let missing = Path::new("/nonexistent/artifact-dir-xyz");
    upload(&runner, missing, "/pipeline/artifacts").await.expect("no-op");

    let fetched = runner.get_archive("/pipeline/artifacts").await.expect("get");
    assert!(fetched.is_empty());
}

#[tokio::test]
async fn upload_puts_tarred_directory_into_container() {
    let (runner, _engine) = started_runner().await;
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("report.xml"), b"<results/>").expect("write");

    upload(&runner, dir.path(), "/pipeline/artifacts").await.expect("upload");

    let fetched = runner.get_archive("/pipeline/artifacts").await.expect("get");
    let mut archive = tar::Archive::new(fetched.as_slice());
    let names: Vec<String> = archive
        .entries()
        .expect("entries")
        .map(|e| e.expect("entry").path().expect("path").to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["report.xml"]);
}

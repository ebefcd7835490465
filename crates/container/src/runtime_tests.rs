// SPDX-License-Identifier: MIT

use super::*;
use crate::fake::FakeContainerEngine;
use cirun_spec::Line;

fn runner() -> (ContainerRunner<FakeContainerEngine>, FakeContainerEngine) {
    let engine = FakeContainerEngine::new();
    (ContainerRunner::new(Arc::new(engine.clone())), engine)
}

fn base_params(engine_fake: &FakeContainerEngine) -> StartContainerParams {
    let _ = engine_fake;
    StartContainerParams {
        name: "build".to_string(),
        image: "alpine".to_string(),
        workspace_volume: "pipeline-workspace".to_string(),
        data_volume: "pipeline-data".to_string(),
        remote_workspace_dir: "/opt/workspace".to_string(),
        remote_pipeline_dir: "/opt/pipeline".to_string(),
        docker_sock_path: "/var/run/docker.sock".to_string(),
        ssh_agent_sock: None,
        env: HashMap::new(),
        step_size: StepSize::X1,
        cpu_limits_enabled: true,
        total_memory_limit_bytes: 4_000_000_000,
        services_memory_bytes: 0,
        credentials: None,
    }
}

#[tokio::test]
async fn start_container_applies_cpu_and_memory_limits() {
    let (runner, engine) = runner();
    let mut params = base_params(&engine);
    params.step_size = StepSize::X2;
    runner.start_container(params).await.expect("start");

    let id = runner.require_container_id().expect("id");
    let spec = engine.container_spec(&id).expect("spec");
    let limits = spec.cpu_limits.expect("cpu limits");
    assert_eq!(limits.period, 100_000);
    assert_eq!(limits.quota, 200_000);
    assert_eq!(limits.shares, 2048);
    assert_eq!(spec.mem_limit_bytes, Some(8_000_000_000));
}

#[tokio::test]
async fn start_container_omits_cpu_limits_when_disabled() {
    let (runner, engine) = runner();
    let mut params = base_params(&engine);
    params.cpu_limits_enabled = false;
    runner.start_container(params).await.expect("start");

    let id = runner.require_container_id().expect("id");
    let spec = engine.container_spec(&id).expect("spec");
    assert!(spec.cpu_limits.is_none());
}

#[tokio::test]
async fn start_container_mounts_ssh_agent_when_resolved() {
    let (runner, engine) = runner();
    let mut params = base_params(&engine);
    params.ssh_agent_sock = Some(PathBuf::from("/tmp/ssh-agent.sock"));
    runner.start_container(params).await.expect("start");

    let id = runner.require_container_id().expect("id");
    let spec = engine.container_spec(&id).expect("spec");
    assert!(spec.mounts.iter().any(|m| m.target == "/ssh-agent"));
}

#[tokio::test]
async fn run_script_echoes_display_lines_then_execs_joined_command() {
    let (runner, engine) = runner();
    runner.start_container(base_params(&engine)).await.expect("start");

    let lines = vec![Line::Raw("echo hi".to_string())];
    let mut output = Vec::new();
    let mut sink = |chunk: &[u8]| output.extend_from_slice(chunk);
    let exit_code = runner.run_script(&lines, &mut sink).await.expect("run");

    assert_eq!(exit_code, 0);
    let logged = String::from_utf8(output).expect("utf8");
    assert!(logged.contains("+ echo hi"));

    let calls = engine.exec_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].cmd, vec!["sh", "-e", "-c", "echo hi"]);
}

#[tokio::test]
async fn run_script_before_start_fails() {
    let (runner, _engine) = runner();
    let lines = vec![Line::Raw("echo hi".to_string())];
    let mut sink = |_: &[u8]| {};
    let result = runner.run_script(&lines, &mut sink).await;
    assert!(matches!(result, Err(ContainerError::NotStarted)));
}

#[tokio::test]
async fn install_docker_client_skips_when_service_not_requested() {
    let (runner, engine) = runner();
    runner.start_container(base_params(&engine)).await.expect("start");
    let path = Path::new("/nonexistent/docker-binary");
    runner
        .install_docker_client_if_needed(&[], path)
        .await
        .expect("no-op");
    assert!(engine.exec_calls().is_empty());
}

#[tokio::test]
async fn install_docker_client_skips_when_binary_already_present() {
    let (runner, engine) = runner();
    runner.start_container(base_params(&engine)).await.expect("start");
    engine.set_exit_code(0);
    let path = Path::new("/nonexistent/docker-binary");
    runner
        .install_docker_client_if_needed(&["docker".to_string()], path)
        .await
        .expect("probe succeeds");
    assert_eq!(engine.exec_calls().len(), 1);
}

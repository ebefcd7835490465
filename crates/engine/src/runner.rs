// SPDX-License-Identifier: MIT

//! Pipeline/Step/Parallel/Stage runners (spec.md §4.11, §5, §6): turns a
//! parsed [`PipelineRunContext`] into the container lifecycle it
//! describes.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use cirun_cache::{CacheDef, CacheManager};
use cirun_container::auth::{get_image_authentication, OidcMintContext};
use cirun_container::{ContainerEngine, ContainerRunner, StartContainerParams};
use cirun_core::id::StepUuid;
use cirun_oidc::MintParams;
use cirun_spec::{Image, ParallelStep, PipelineElement, Stage, Step, Trigger, Variable};

use crate::clone;
use crate::context::{
    PipelineRunContext, PipelineResult, StepRunContext, REMOTE_CACHES_DIR, REMOTE_PIPELINE_DIR, REMOTE_WORKSPACE_DIR,
};
use crate::env::{base_step_env, with_docker_host, with_oidc_token, with_pipeline_env};
use crate::error::EngineError;
use crate::services::{self, StartedService};

/// Exit code a step reports when interrupted before it could finish.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepState {
    Skipped,
    WaitingForInput,
    SettingUp,
    Running,
    TearingDown,
    Done,
}

fn is_selected(name: Option<&str>, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    matches!(name, Some(n) if selected.iter().any(|s| s == n))
}

/// Prompt shown for a `trigger: manual` step. A non-`"n"` response,
/// including an empty line, proceeds.
pub fn prompt_manual_trigger(name: &str, input: &mut dyn BufRead, output: &mut dyn Write) -> Result<bool, EngineError> {
    write!(output, "Step \"{name}\" requires manual triggering. Continue? [Y/n] ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_ascii_lowercase() != "n")
}

/// Resolves every declared pipeline `Variable` against `input`, retrying
/// until an answer satisfies `allowed_values` (when present).
pub fn prompt_pipeline_variables(
    variables: &[Variable],
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<HashMap<String, String>, EngineError> {
    let mut resolved = HashMap::new();
    for variable in variables {
        loop {
            let default_display = variable.default.as_deref().unwrap_or("");
            write!(output, "Variable \"{}\" ... Value [{default_display}]: ", variable.name)?;
            output.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            let trimmed = line.trim();
            let value = if trimmed.is_empty() {
                match &variable.default {
                    Some(default) => default.clone(),
                    None => continue,
                }
            } else {
                trimmed.to_string()
            };
            if let Some(allowed) = &variable.allowed_values {
                if !allowed.iter().any(|a| a == &value) {
                    writeln!(output, "Value must be one of: {}", allowed.join(", "))?;
                    continue;
                }
            }
            resolved.insert(variable.name.clone(), value);
            break;
        }
    }
    Ok(resolved)
}

fn resolve_step_image(step: &Step, pipeline: &PipelineRunContext) -> Image {
    step.image
        .clone()
        .or_else(|| pipeline.default_image.clone())
        .unwrap_or_else(|| Image {
            name: pipeline.config.default_image.clone(),
            ..Image::default()
        })
}

fn docker_active(services: &[String]) -> bool {
    services.iter().any(|s| s == "docker")
}

fn now_unix() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

fn step_mint_params(ctx: &StepRunContext, step_uuid: StepUuid) -> MintParams {
    MintParams {
        issuer: ctx.pipeline.config.oidc.issuer.clone(),
        audience: ctx.pipeline.config.oidc.audience.clone(),
        now: now_unix(),
        account_uuid: ctx.pipeline.workspace.owner_uuid.as_uuid(),
        workspace_uuid: ctx.pipeline.workspace.workspace_uuid.as_uuid(),
        repository_uuid: ctx.pipeline.project.repo_uuid.as_uuid(),
        pipeline_uuid: ctx.pipeline.pipeline_uuid.as_uuid(),
        step_uuid: step_uuid.as_uuid(),
        branch_name: ctx.pipeline.current_branch.clone(),
        deployment_name: ctx.step.deployment.as_ref().map(|d| d.environment.clone()),
    }
}

/// `BITBUCKET_STEP_OIDC_TOKEN`, minted only when the step opts in and the
/// runner's OIDC provider is configured.
fn mint_step_oidc_token(ctx: &StepRunContext, step_uuid: StepUuid) -> Result<Option<String>, EngineError> {
    if !ctx.step.oidc || !ctx.pipeline.config.oidc.enabled {
        return Ok(None);
    }
    let params = step_mint_params(ctx, step_uuid);
    let token = cirun_oidc::mint(&params, &ctx.pipeline.workspace.oidc_private_key_pem)?;
    Ok(Some(token))
}

/// Registry-authentication OIDC context, built whenever the runner's
/// OIDC provider is configured so `aws.oidc-role` images can assume a
/// role regardless of whether the step also exports a token of its own.
fn image_oidc_context<'a>(ctx: &StepRunContext, step_uuid: StepUuid, private_key_pem: &'a str) -> Option<OidcMintContext<'a>> {
    if !ctx.pipeline.config.oidc.enabled {
        return None;
    }
    Some(OidcMintContext {
        mint_params: step_mint_params(ctx, step_uuid),
        private_key_pem,
    })
}

/// Every fixed-size input a single step run needs beyond the pipeline
/// and step specs themselves.
pub struct StepExecution<'a, E: ContainerEngine> {
    pub engine: Arc<E>,
    pub cache_manager: &'a CacheManager,
    pub artifacts_staging_dir: &'a Path,
    pub pipeline_cache_dir: &'a Path,
    pub docker_static_binary: &'a Path,
    pub logger: &'a mut (dyn Write + Send),
}

pub struct StepOutcome {
    pub name: String,
    pub exit_code: i32,
}

/// Runs one step end to end: manual-trigger prompt, setup, script,
/// after-script, and teardown, in that order. Teardown always runs, even
/// when setup or the script itself fails.
pub async fn run_step<E: ContainerEngine>(exec: &mut StepExecution<'_, E>, ctx: &StepRunContext<'_>) -> Result<StepOutcome, EngineError> {
    let name = ctx.step.name.clone().unwrap_or_else(|| "step".to_string());

    if ctx.step.trigger == Trigger::Manual {
        let mut stdin = std::io::BufReader::new(std::io::stdin());
        if !prompt_manual_trigger(&name, &mut stdin, exec.logger)? {
            tracing::info!(step = %name, state = ?StepState::Skipped, "step declined at manual trigger");
            return Ok(StepOutcome { name, exit_code: 0 });
        }
    }
    tracing::info!(step = %name, state = ?StepState::SettingUp, "step setting up");

    let container_name = ctx.container_name();
    let network_name = ctx.network_name();
    let workspace_volume = format!("{container_name}-workspace");
    let data_volume = format!("{container_name}-data");
    exec.engine.create_network(&network_name).await?;
    exec.engine.create_volume(&workspace_volume).await?;
    exec.engine.create_volume(&data_volume).await?;

    // Setup and the script phase share one fallible scope so that a
    // failure anywhere past this point still reaches the teardown below,
    // which runs unconditionally on whatever state was actually reached.
    let mut started_services = Vec::new();
    let runner = ContainerRunner::new(Arc::clone(&exec.engine));
    let result: Result<i32, EngineError> = async {
        let image = resolve_step_image(ctx.step, ctx.pipeline);
        let oidc_ctx = image_oidc_context(ctx, ctx.step_uuid, &ctx.pipeline.workspace.oidc_private_key_pem);
        let credentials = get_image_authentication(&image, oidc_ctx.as_ref()).await?;

        let docker_requested = docker_active(&ctx.step.services);
        let oidc_token = mint_step_oidc_token(ctx, ctx.step_uuid)?;
        let docker_container = docker_requested.then(|| services::container_name(ctx.pipeline.project_slug(), "docker"));
        let mut env = with_pipeline_env(base_step_env(ctx), ctx);
        env = with_docker_host(env, docker_container.as_deref());
        env = with_oidc_token(env, oidc_token.as_deref());

        let effective_clone = ctx.pipeline.effective_clone_for_step(ctx.step);
        clone::clone(
            exec.engine.as_ref(),
            &effective_clone,
            &ctx.pipeline.current_branch,
            &ctx.pipeline.current_commit,
            &container_name,
            &ctx.pipeline.repo_path.to_string_lossy(),
            &workspace_volume,
        )
        .await?;

        started_services = services::start_services(
            exec.engine.as_ref(),
            &ctx.step.services,
            &ctx.pipeline.effective_services,
            ctx.pipeline.project_slug(),
            &network_name,
            exec.pipeline_cache_dir,
            &data_volume,
            REMOTE_PIPELINE_DIR,
            ctx.pipeline.config.service_container_default_memory_limit_mib,
            ctx.pipeline.config.total_memory_limit_mib,
            ctx.step.size.multiplier(),
            ctx.pipeline.config.build_container_minimum_memory_mib,
        )
        .await?;

        let services_memory_bytes: i64 = started_services
            .iter()
            .filter_map(|s| ctx.pipeline.effective_services.get(&s.name))
            .map(|s| s.memory.unwrap_or(ctx.pipeline.config.service_container_default_memory_limit_mib) as i64 * 1024 * 1024)
            .sum();

        runner
            .start_container(StartContainerParams {
                name: container_name.clone(),
                image: image.name.clone(),
                workspace_volume: workspace_volume.clone(),
                data_volume: data_volume.clone(),
                remote_workspace_dir: REMOTE_WORKSPACE_DIR.to_string(),
                remote_pipeline_dir: REMOTE_PIPELINE_DIR.to_string(),
                docker_sock_path: "/var/run/docker.sock".to_string(),
                ssh_agent_sock: None,
                env,
                step_size: ctx.step.size,
                cpu_limits_enabled: ctx.pipeline.config.cpu_limits,
                total_memory_limit_bytes: ctx.pipeline.config.total_memory_limit_mib as i64 * 1024 * 1024,
                services_memory_bytes,
                credentials,
            })
            .await?;

        run_step_body(exec, ctx, &runner).await
    }
    .await;

    tracing::info!(step = %name, state = ?StepState::TearingDown, "step tearing down");
    let _ = runner.stop().await;
    let _ = services::stop_services(exec.engine.as_ref(), &started_services).await;
    let _ = exec.engine.remove_network(&network_name).await;

    let exit_code = match result {
        Ok(code) => code,
        Err(err) if err.is_pipeline_fatal() => {
            tracing::error!(step = %name, error = %err, "step failed");
            1
        }
        Err(err) => return Err(err),
    };

    tracing::info!(step = %name, state = ?StepState::Done, exit_code, "step finished");
    Ok(StepOutcome { name, exit_code })
}

async fn run_step_body<E: ContainerEngine>(
    exec: &mut StepExecution<'_, E>,
    ctx: &StepRunContext<'_>,
    runner: &ContainerRunner<E>,
) -> Result<i32, EngineError> {
    runner
        .install_docker_client_if_needed(&ctx.step.services, exec.docker_static_binary)
        .await?;

    cirun_artifact::upload(runner, exec.artifacts_staging_dir, REMOTE_WORKSPACE_DIR).await?;

    let cache_defs: Vec<CacheDef> = ctx
        .step
        .caches
        .iter()
        .filter_map(|name| {
            ctx.pipeline.effective_caches.get(name).map(|path| CacheDef {
                name: name.clone(),
                container_path: path.clone(),
                key: None,
            })
        })
        .collect();
    for def in &cache_defs {
        exec.cache_manager.upload_before_step(runner, def, REMOTE_CACHES_DIR).await?;
    }

    let exit_code = run_script_with_timeout(runner, ctx, exec.logger).await?;

    if !ctx.step.after_script.is_empty() {
        let mut env = HashMap::new();
        env.insert("BITBUCKET_EXIT_CODE".to_string(), exit_code.to_string());
        let mut sink = |chunk: &[u8]| {
            let _ = exec.logger.write_all(chunk);
        };
        let plan = cirun_shell::compose(&ctx.step.after_script);
        for line in &plan.display_lines {
            sink(line.as_bytes());
            sink(b"\n");
        }
        let _ = runner.run_command(&cirun_shell::wrap_command(&plan.joined), None, &mut sink).await;
    }

    if exit_code == 0 {
        for def in &cache_defs {
            exec.cache_manager.download_after_step(runner, def, REMOTE_CACHES_DIR, exit_code).await?;
        }
    }
    cirun_artifact::download(
        runner,
        &ctx.step.artifacts,
        REMOTE_WORKSPACE_DIR,
        &ctx.step_uuid.to_string(),
        exec.artifacts_staging_dir,
    )
    .await?;

    Ok(exit_code)
}

async fn run_script_with_timeout<E: ContainerEngine>(
    runner: &ContainerRunner<E>,
    ctx: &StepRunContext<'_>,
    logger: &mut (dyn Write + Send),
) -> Result<i32, EngineError> {
    let mut sink = |chunk: &[u8]| {
        let _ = logger.write_all(chunk);
    };
    let run = runner.run_script(&ctx.step.script, &mut sink);
    match ctx.step.max_time {
        Some(minutes) => match tokio::time::timeout(Duration::from_secs(u64::from(minutes) * 60), run).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                let _ = runner.stop().await;
                Ok(1)
            }
        },
        None => Ok(run.await?),
    }
}

/// Sequential parallel-step runner: last non-zero exit code wins, every
/// branch still runs even after an earlier one fails.
pub async fn run_parallel_steps<E: ContainerEngine>(
    exec: &mut StepExecution<'_, E>,
    pipeline: &PipelineRunContext,
    parallel: &ParallelStep,
) -> Result<i32, EngineError> {
    let count = parallel.steps.len() as u32;
    let mut last_failure = 0;
    for (index, wrapper) in parallel.steps.iter().enumerate() {
        let step_uuid = pipeline.id_gen.new_step_uuid();
        let ctx = StepRunContext {
            step: &wrapper.step,
            pipeline,
            step_uuid,
            parallel_step_index: Some(index as u32 + 1),
            parallel_step_count: Some(count),
        };
        let outcome = run_step(exec, &ctx).await?;
        if outcome.exit_code != 0 {
            last_failure = outcome.exit_code;
            if parallel.fail_fast {
                break;
            }
        }
    }
    Ok(last_failure)
}

/// Stage runner: selection, manual trigger, stop on first step failure.
pub async fn run_stage<E: ContainerEngine>(
    exec: &mut StepExecution<'_, E>,
    pipeline: &PipelineRunContext,
    stage: &Stage,
) -> Result<i32, EngineError> {
    if !is_selected(stage.name.as_deref(), &pipeline.selected_stages) {
        return Ok(0);
    }
    if stage.trigger == Trigger::Manual {
        let mut stdin = std::io::BufReader::new(std::io::stdin());
        let name = stage.name.as_deref().unwrap_or("stage");
        if !prompt_manual_trigger(name, &mut stdin, exec.logger)? {
            return Ok(0);
        }
    }

    for wrapper in &stage.steps {
        if !is_selected(wrapper.step.name.as_deref(), &pipeline.selected_steps) {
            continue;
        }
        let step_uuid = pipeline.id_gen.new_step_uuid();
        let ctx = StepRunContext {
            step: &wrapper.step,
            pipeline,
            step_uuid,
            parallel_step_index: None,
            parallel_step_count: None,
        };
        let outcome = run_step(exec, &ctx).await?;
        if outcome.exit_code != 0 {
            return Ok(outcome.exit_code);
        }
    }
    Ok(0)
}

/// Dispatches every element of a pipeline in order, stopping at the
/// first non-zero exit code.
pub async fn run_pipeline_elements<E: ContainerEngine>(
    exec: &mut StepExecution<'_, E>,
    pipeline: &PipelineRunContext,
) -> Result<i32, EngineError> {
    for element in &pipeline.elements {
        let exit_code = match element {
            PipelineElement::Variables { .. } => 0,
            PipelineElement::Stage { stage } => run_stage(exec, pipeline, stage).await?,
            PipelineElement::Parallel { parallel } => run_parallel_steps(exec, pipeline, parallel).await?,
            PipelineElement::Step { step } => {
                if !is_selected(step.name.as_deref(), &pipeline.selected_steps) {
                    continue;
                }
                let step_uuid = pipeline.id_gen.new_step_uuid();
                let ctx = StepRunContext {
                    step,
                    pipeline,
                    step_uuid,
                    parallel_step_index: None,
                    parallel_step_count: None,
                };
                run_step(exec, &ctx).await?.exit_code
            }
        };
        if exit_code != 0 {
            return Ok(exit_code);
        }
    }
    Ok(0)
}

/// Top-level pipeline runner: dispatches every element, installing a
/// ctrl-c handler that reports an interrupted exit code instead of
/// leaving the terminal in an ambiguous state. A step that completes or
/// errors on its own always tears down its container/services/network
/// from inside `run_step`; a ctrl-c that lands while a step is mid-flight
/// drops that step's future at the `select!` below instead, which does
/// not run `run_step`'s teardown path, so the interrupted step's
/// container, services, network, and volumes are left behind for a
/// future run (or manual cleanup) to reclaim.
pub async fn run_pipeline<E: ContainerEngine>(exec: &mut StepExecution<'_, E>, pipeline: &PipelineRunContext) -> Result<PipelineResult, EngineError> {
    let exit_code = tokio::select! {
        result = run_pipeline_elements(exec, pipeline) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, aborting pipeline run");
            INTERRUPTED_EXIT_CODE
        }
    };

    Ok(PipelineResult {
        exit_code,
        build_number: pipeline.project.build_number,
        pipeline_uuid: pipeline.pipeline_uuid,
    })
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

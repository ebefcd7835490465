// SPDX-License-Identifier: MIT

//! `cirun run <pipeline>` (spec.md §6).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use cirun_container::DockerEngine;
use cirun_core::id::{IdGen, PipelineUuid, UuidIdGen};
use cirun_engine::{resolve_clone_settings, PipelineRunContext, StepExecution};
use cirun_spec::{effective_caches, effective_services, env_expand::expand_env_vars, get_pipeline, EffectiveCloneSettings, PipelineElement};
use clap::Args;
use uuid::Uuid;

use crate::envfile::load_env_files;
use crate::log_writer::RunLogWriter;
use crate::{config, paths};

/// Default filename of a pipeline specification, matching the schema
/// this runner models (Bitbucket Pipelines).
pub(crate) const DEFAULT_PIPELINE_FILE: &str = "bitbucket-pipelines.yml";

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Dotted pipeline path (e.g. `default`, `custom.deploy`, `branches.main`)
    pub pipeline: String,

    /// Project directory to run in
    #[arg(short = 'p', long = "project-dir", default_value = ".")]
    pub project_dir: PathBuf,

    /// Pipeline specification file, relative to the project directory
    #[arg(short = 'f', long = "pipeline-file", default_value = DEFAULT_PIPELINE_FILE)]
    pub pipeline_file: PathBuf,

    /// Restrict the run to named steps; repeatable
    #[arg(short = 's', long = "step")]
    pub step: Vec<String>,

    /// `.env`-style file to layer into the step environment; repeatable,
    /// later files win
    #[arg(short = 'e', long = "env-file")]
    pub env_file: Vec<PathBuf>,

    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    #[arg(long = "no-color")]
    pub no_color: bool,
}

pub async fn handle(args: RunArgs) -> anyhow::Result<i32> {
    let project_dir = args.project_dir.canonicalize().unwrap_or(args.project_dir.clone());
    let pipeline_path = project_dir.join(&args.pipeline_file);
    let yaml = std::fs::read_to_string(&pipeline_path)
        .map_err(|e| anyhow::anyhow!("failed to read pipeline file {}: {e}", pipeline_path.display()))?;

    let mut spec = cirun_spec::parse_str(&yaml)?;

    let mut env_files = Vec::new();
    let default_env = project_dir.join(".env");
    if default_env.exists() {
        env_files.push(default_env);
    }
    env_files.extend(args.env_file.iter().cloned());
    let env_vars = load_env_files(&env_files)?;

    expand_env_vars(&mut spec, &env_vars)?;

    let pipeline_def = get_pipeline(&spec.pipelines, &args.pipeline)?;
    let elements: Vec<PipelineElement> = pipeline_def.elements().to_vec();

    let pipeline_variables = match elements.first() {
        Some(PipelineElement::Variables { variables }) => {
            let mut stdin = std::io::BufReader::new(std::io::stdin());
            cirun_engine::prompt_pipeline_variables(variables, &mut stdin, &mut std::io::stdout())?
        }
        _ => HashMap::new(),
    };

    let data_dir = paths::data_dir();
    let cache_dir = paths::cache_dir();
    let mut config = config::load(&paths::config_file())?;
    if args.no_color {
        config.color = false;
    } else if args.color {
        config.color = true;
    }

    let project_metadata = cirun_storage::next_build_number(&project_dir, &data_dir)?;
    let workspace_metadata = cirun_storage::load_or_create_workspace_metadata(&data_dir)?;
    let current_branch = cirun_engine::get_current_branch(&project_dir)?;
    let current_commit = cirun_engine::get_current_commit(&project_dir)?;

    let pipeline_uuid = PipelineUuid(Uuid::new_v4());
    let effective_clone = resolve_clone_settings(Some(&spec.clone), None, EffectiveCloneSettings::default());

    let run_dir = data_dir
        .join("projects")
        .join(&project_metadata.path_slug)
        .join("pipelines")
        .join(format!("{}-{}", project_metadata.build_number, pipeline_uuid));
    let pipeline_cache_dir = cache_dir.join(&project_metadata.path_slug).join("caches");
    let artifacts_dir = run_dir.join("artifacts");
    let logs_dir = run_dir.join("logs");
    let docker_static_binary = data_dir.join("bin").join("docker");
    std::fs::create_dir_all(&artifacts_dir)?;

    let pipeline_ctx = PipelineRunContext {
        pipeline_name: args.pipeline.clone(),
        elements,
        effective_caches: effective_caches(&spec.definitions.caches),
        effective_services: effective_services(&spec.definitions),
        effective_clone,
        default_image: spec.image.clone(),
        workspace: workspace_metadata,
        project: project_metadata,
        repo_path: project_dir.clone(),
        env_vars,
        selected_steps: args.step,
        selected_stages: Vec::new(),
        pipeline_uuid,
        pipeline_variables,
        config,
        current_branch,
        current_commit,
        id_gen: Arc::new(UuidIdGen) as Arc<dyn IdGen>,
    };

    let engine = Arc::new(DockerEngine::connect_with_local_defaults()?);
    let cache_manager = cirun_cache::CacheManager::new(project_dir.clone(), pipeline_cache_dir.clone());
    let mut logger = RunLogWriter::create(&logs_dir)?;

    let mut exec = StepExecution {
        engine,
        cache_manager: &cache_manager,
        artifacts_staging_dir: &artifacts_dir,
        pipeline_cache_dir: &pipeline_cache_dir,
        docker_static_binary: &docker_static_binary,
        logger: &mut logger,
    };

    let result = cirun_engine::run_pipeline(&mut exec, &pipeline_ctx).await?;
    Ok(result.exit_code)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

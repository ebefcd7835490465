// SPDX-License-Identifier: MIT

//! Run contexts and configuration (spec.md §3, §6).
//!
//! These live here rather than in `cirun-core` because they embed
//! `cirun-spec`'s parsed model, and `cirun-core` must stay free of a
//! dependency on `cirun-spec` to avoid a cycle through `cirun-storage`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use cirun_core::id::IdGen;
use cirun_core::{PipelineUuid, ProjectMetadata, StepUuid, WorkspaceMetadata};
use cirun_spec::{CloneSettings, EffectiveCloneSettings, Image, Service, Step};
use indexmap::IndexMap;

/// The container image mounted in the build/side containers at this
/// fixed path; also the literal value of `BUILD_DIR` (spec.md §8's
/// `test_environment_variables` scenario).
pub const REMOTE_WORKSPACE_DIR: &str = "/opt/atlassian/pipelines/agent/build";
/// Shared data volume mount point in every container of a step.
pub const REMOTE_PIPELINE_DIR: &str = "/opt/atlassian/pipelines/agent/data";
/// Read-only bind of the host project directory, mounted only in the
/// clone side container as the `git clone` origin.
pub const REMOTE_ORIGIN_DIR: &str = "/opt/atlassian/pipelines/agent/origin";
pub const REMOTE_CACHES_DIR: &str = "/opt/atlassian/pipelines/agent/data/caches";
pub const REMOTE_ARTIFACTS_DIR: &str = "/opt/atlassian/pipelines/agent/data/artifacts";

#[derive(Debug, Clone)]
pub struct OidcConfig {
    pub enabled: bool,
    pub issuer: String,
    pub audience: String,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            issuer: "https://cirun.local".to_string(),
            audience: "cirun".to_string(),
        }
    }
}

/// Recognized options of spec.md §6, loaded by `cirun-cli` from a TOML
/// file plus environment overrides and handed to the runner unchanged.
#[derive(Debug, Clone)]
pub struct Config {
    pub volumes: Vec<String>,
    pub total_memory_limit_mib: u64,
    pub service_container_default_memory_limit_mib: u64,
    pub build_container_minimum_memory_mib: u64,
    pub cpu_limits: bool,
    pub default_image: String,
    pub default_services: Vec<String>,
    pub default_caches: Vec<String>,
    pub oidc: OidcConfig,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volumes: Vec::new(),
            total_memory_limit_mib: 4096,
            service_container_default_memory_limit_mib: 1024,
            build_container_minimum_memory_mib: 1024,
            cpu_limits: true,
            default_image: "atlassian/default-image:latest".to_string(),
            default_services: Vec::new(),
            default_caches: Vec::new(),
            oidc: OidcConfig::default(),
            color: true,
        }
    }
}

/// The root of one pipeline execution.
pub struct PipelineRunContext {
    pub pipeline_name: String,
    pub elements: Vec<cirun_spec::PipelineElement>,
    pub effective_caches: IndexMap<String, String>,
    pub effective_services: IndexMap<String, Service>,
    pub effective_clone: EffectiveCloneSettings,
    pub default_image: Option<Image>,
    pub workspace: WorkspaceMetadata,
    pub project: ProjectMetadata,
    pub repo_path: PathBuf,
    pub env_vars: HashMap<String, String>,
    pub selected_steps: Vec<String>,
    pub selected_stages: Vec<String>,
    pub pipeline_uuid: PipelineUuid,
    pub pipeline_variables: HashMap<String, String>,
    pub config: Config,
    pub current_branch: String,
    pub current_commit: String,
    pub id_gen: Arc<dyn IdGen>,
}

impl PipelineRunContext {
    pub fn project_slug(&self) -> &str {
        &self.project.slug
    }

    /// `effective.clone` resolution order for a step: step > pipeline >
    /// default (spec.md §4.8).
    pub fn effective_clone_for_step(&self, step: &Step) -> EffectiveCloneSettings {
        resolve_clone_settings(step.clone.as_ref(), Some(&self.effective_clone), self.effective_clone)
    }
}

/// Resolves `{depth, lfs, enabled}` independently: the first non-nil of
/// (step, pipeline, default) wins for each field.
pub fn resolve_clone_settings(
    step: Option<&CloneSettings>,
    pipeline: Option<&EffectiveCloneSettings>,
    default: EffectiveCloneSettings,
) -> EffectiveCloneSettings {
    let depth = step
        .and_then(|s| s.depth)
        .or(pipeline.map(|p| p.depth))
        .unwrap_or(default.depth);
    let lfs = step.and_then(|s| s.lfs).or(pipeline.map(|p| p.lfs)).unwrap_or(default.lfs);
    let enabled = step
        .and_then(|s| s.enabled)
        .or(pipeline.map(|p| p.enabled))
        .unwrap_or(default.enabled);
    EffectiveCloneSettings { depth, lfs, enabled }
}

/// A single step's execution context, carrying a reference to the owning
/// pipeline run and its own identity.
pub struct StepRunContext<'a> {
    pub step: &'a Step,
    pub pipeline: &'a PipelineRunContext,
    pub step_uuid: StepUuid,
    pub parallel_step_index: Option<u32>,
    pub parallel_step_count: Option<u32>,
}

impl<'a> StepRunContext<'a> {
    pub fn slug(&self) -> String {
        let name = self.step.name.as_deref().unwrap_or("step");
        format!("{}-step-{}", self.pipeline.project_slug(), slugify(name))
    }

    pub fn container_name(&self) -> String {
        self.slug()
    }

    pub fn network_name(&self) -> String {
        format!("{}-network", self.pipeline.project_slug())
    }
}

fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineResult {
    pub exit_code: i32,
    pub build_number: u64,
    pub pipeline_uuid: PipelineUuid,
}

impl PipelineResult {
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

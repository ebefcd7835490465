// SPDX-License-Identifier: MIT

//! Orchestration engine: turns a parsed pipeline spec into container
//! lifecycle calls against a [`cirun_container::ContainerEngine`].

pub mod clone;
pub mod context;
pub mod env;
pub mod error;
pub mod repository;
pub mod runner;
pub mod services;

#[cfg(test)]
mod test_support;

pub use context::{
    resolve_clone_settings, Config, OidcConfig, PipelineResult, PipelineRunContext, StepRunContext, REMOTE_ARTIFACTS_DIR,
    REMOTE_CACHES_DIR, REMOTE_ORIGIN_DIR, REMOTE_PIPELINE_DIR, REMOTE_WORKSPACE_DIR,
};
pub use error::EngineError;
pub use repository::{get_current_branch, get_current_commit};
pub use runner::{
    prompt_manual_trigger, prompt_pipeline_variables, run_parallel_steps, run_pipeline, run_pipeline_elements, run_stage,
    run_step, StepExecution, StepOutcome, INTERRUPTED_EXIT_CODE,
};
pub use services::{check_memory_budget, StartedService};

// SPDX-License-Identifier: MIT

//! Step environment assembly (spec.md §4.11 step 5, §6's env table).

use std::collections::HashMap;

use crate::context::{StepRunContext, REMOTE_WORKSPACE_DIR};

/// This runner has no remote git host, so `BITBUCKET_REPO_OWNER` and
/// `_FULL_NAME` are derived from the local project slug rather than an
/// actual account; `_IS_PRIVATE` is always `"true"` since a local working
/// copy has no public/private distinction.
const LOCAL_OWNER: &str = "local";

/// Builds the base `BITBUCKET_*`/`CI` map common to every step, before
/// the caller layers in pipeline env, pipeline variables, and the
/// conditional entries (`DOCKER_HOST`, `BITBUCKET_PARALLEL_STEP*`,
/// `BITBUCKET_DEPLOYMENT_ENVIRONMENT`, `BITBUCKET_STEP_OIDC_TOKEN`).
pub fn base_step_env(ctx: &StepRunContext) -> HashMap<String, String> {
    let project = &ctx.pipeline.project;
    let full_name = format!("{LOCAL_OWNER}/{}", project.slug);

    let mut env = HashMap::new();
    env.insert("CI".to_string(), "true".to_string());
    env.insert("BUILD_DIR".to_string(), REMOTE_WORKSPACE_DIR.to_string());
    env.insert("BITBUCKET_CLONE_DIR".to_string(), REMOTE_WORKSPACE_DIR.to_string());
    env.insert("BITBUCKET_BRANCH".to_string(), ctx.pipeline.current_branch.clone());
    env.insert("BITBUCKET_COMMIT".to_string(), ctx.pipeline.current_commit.clone());
    env.insert("BITBUCKET_BUILD_NUMBER".to_string(), project.build_number.to_string());
    env.insert("BITBUCKET_PIPELINE_UUID".to_string(), ctx.pipeline.pipeline_uuid.to_string());
    env.insert("BITBUCKET_STEP_UUID".to_string(), ctx.step_uuid.to_string());
    env.insert("BITBUCKET_PROJECT_KEY".to_string(), project.key.clone());
    env.insert("BITBUCKET_PROJECT_UUID".to_string(), project.project_uuid.to_string());
    env.insert("BITBUCKET_REPO_SLUG".to_string(), project.slug.clone());
    env.insert("BITBUCKET_REPO_UUID".to_string(), project.repo_uuid.to_string());
    env.insert("BITBUCKET_REPO_FULL_NAME".to_string(), full_name);
    env.insert("BITBUCKET_REPO_OWNER".to_string(), LOCAL_OWNER.to_string());
    env.insert("BITBUCKET_REPO_OWNER_UUID".to_string(), project.project_uuid.to_string());
    env.insert("BITBUCKET_REPO_IS_PRIVATE".to_string(), "true".to_string());
    env.insert("BITBUCKET_WORKSPACE".to_string(), project.slug.clone());

    if let (Some(index), Some(count)) = (ctx.parallel_step_index, ctx.parallel_step_count) {
        env.insert("BITBUCKET_PARALLEL_STEP".to_string(), index.to_string());
        env.insert("BITBUCKET_PARALLEL_STEP_COUNT".to_string(), count.to_string());
    }

    if let Some(deployment) = &ctx.step.deployment {
        env.insert(
            "BITBUCKET_DEPLOYMENT_ENVIRONMENT".to_string(),
            deployment.environment.clone(),
        );
    }

    env
}

/// Layers pipeline-level env and resolved pipeline variables on top of
/// the base map, pipeline env taking precedence over variables' own
/// defaults but yielding to explicit `-e` overrides already folded into
/// `pipeline.env_vars` by the caller.
pub fn with_pipeline_env(mut env: HashMap<String, String>, ctx: &StepRunContext) -> HashMap<String, String> {
    for (key, value) in &ctx.pipeline.pipeline_variables {
        env.insert(key.clone(), value.clone());
    }
    for (key, value) in &ctx.pipeline.env_vars {
        env.insert(key.clone(), value.clone());
    }
    env
}

/// Present only while the `docker` service is active for this step,
/// pointing at the sidecar's unencrypted daemon socket. The `docker`
/// service runs on the step's bridge network rather than sharing the
/// build container's network namespace, so this resolves the sidecar by
/// its container name rather than `localhost`.
pub fn with_docker_host(mut env: HashMap<String, String>, docker_service_container: Option<&str>) -> HashMap<String, String> {
    if let Some(name) = docker_service_container {
        env.insert("DOCKER_HOST".to_string(), format!("tcp://{name}:2375"));
    }
    env
}

/// Present only when the step declares `oidc: true`.
pub fn with_oidc_token(mut env: HashMap<String, String>, token: Option<&str>) -> HashMap<String, String> {
    if let Some(token) = token {
        env.insert("BITBUCKET_STEP_OIDC_TOKEN".to_string(), token.to_string());
    }
    env
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

use super::*;
use crate::context::StepRunContext;
use crate::test_support::{pipeline_context, step};
use cirun_core::id::StepUuid;
use uuid::Uuid;

#[test]
fn base_env_carries_fixed_bitbucket_variables() {
    let pipeline = pipeline_context();
    let step = step("build", &["true"]);
    let ctx = StepRunContext {
        step: &step,
        pipeline: &pipeline,
        step_uuid: StepUuid(Uuid::nil()),
        parallel_step_index: None,
        parallel_step_count: None,
    };

    let env = base_step_env(&ctx);
    assert_eq!(env.get("CI"), Some(&"true".to_string()));
    assert_eq!(env.get("BUILD_DIR"), Some(&REMOTE_WORKSPACE_DIR.to_string()));
    assert_eq!(env.get("BITBUCKET_BRANCH"), Some(&"main".to_string()));
    assert_eq!(env.get("BITBUCKET_BUILD_NUMBER"), Some(&"7".to_string()));
    assert_eq!(env.get("BITBUCKET_WORKSPACE"), Some(&"demo".to_string()));
    assert!(!env.contains_key("BITBUCKET_PARALLEL_STEP"));
    assert!(!env.contains_key("BITBUCKET_DEPLOYMENT_ENVIRONMENT"));
}

#[test]
fn parallel_index_and_count_present_only_when_set() {
    let pipeline = pipeline_context();
    let step = step("build", &["true"]);
    let ctx = StepRunContext {
        step: &step,
        pipeline: &pipeline,
        step_uuid: StepUuid(Uuid::nil()),
        parallel_step_index: Some(1),
        parallel_step_count: Some(3),
    };

    let env = base_step_env(&ctx);
    assert_eq!(env.get("BITBUCKET_PARALLEL_STEP"), Some(&"1".to_string()));
    assert_eq!(env.get("BITBUCKET_PARALLEL_STEP_COUNT"), Some(&"3".to_string()));
}

#[test]
fn deployment_environment_present_only_when_step_declares_it() {
    let pipeline = pipeline_context();
    let mut step = step("deploy", &["true"]);
    step.deployment = Some(cirun_spec::Deployment {
        environment: "production".to_string(),
    });
    let ctx = StepRunContext {
        step: &step,
        pipeline: &pipeline,
        step_uuid: StepUuid(Uuid::nil()),
        parallel_step_index: None,
        parallel_step_count: None,
    };

    let env = base_step_env(&ctx);
    assert_eq!(env.get("BITBUCKET_DEPLOYMENT_ENVIRONMENT"), Some(&"production".to_string()));
}

#[test]
fn pipeline_env_and_variables_layer_on_top_of_base() {
    let mut pipeline = pipeline_context();
    pipeline.pipeline_variables.insert("GREETING".to_string(), "hi".to_string());
    pipeline.env_vars.insert("GREETING".to_string(), "overridden".to_string());
    let step = step("build", &["true"]);
    let ctx = StepRunContext {
        step: &step,
        pipeline: &pipeline,
        step_uuid: StepUuid(Uuid::nil()),
        parallel_step_index: None,
        parallel_step_count: None,
    };

    let env = with_pipeline_env(base_step_env(&ctx), &ctx);
    assert_eq!(env.get("GREETING"), Some(&"overridden".to_string()));
}

#[test]
fn docker_host_present_only_when_service_active() {
    let absent = with_docker_host(HashMap::new(), None);
    assert!(!absent.contains_key("DOCKER_HOST"));

    let present = with_docker_host(HashMap::new(), Some("demo-service-docker"));
    assert_eq!(present.get("DOCKER_HOST"), Some(&"tcp://demo-service-docker:2375".to_string()));
}

#[test]
fn oidc_token_present_only_when_minted() {
    let absent = with_oidc_token(HashMap::new(), None);
    assert!(!absent.contains_key("BITBUCKET_STEP_OIDC_TOKEN"));

    let present = with_oidc_token(HashMap::new(), Some("signed.jwt.token"));
    assert_eq!(present.get("BITBUCKET_STEP_OIDC_TOKEN"), Some(&"signed.jwt.token".to_string()));
}

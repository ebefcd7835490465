// SPDX-License-Identifier: MIT

//! YAML loading and structural validation (spec.md §4.1).
//!
//! `serde_yaml` resolves anchors natively, so [`parse_str`] gets that for
//! free. What's left here is the validation serde can't express: the
//! `Variables may only appear first` invariant, `allowed-values` requiring
//! a member `default`, and the `parallel.steps.length >= 2` invariant.

use crate::error::SpecError;
use crate::model::{AwsCredentials, Pipeline, PipelineElement, PipelineSpec};

/// Parses and structurally validates a pipeline specification document.
/// Does not check the OIDC/AWS interaction — that depends on the runtime
/// `Config`, and is checked separately by [`validate_oidc_usage`].
pub fn parse_str(yaml: &str) -> Result<PipelineSpec, SpecError> {
    let spec: PipelineSpec = serde_yaml::from_str(yaml)?;
    validate(&spec)?;
    Ok(spec)
}

fn validate(spec: &PipelineSpec) -> Result<(), SpecError> {
    for pipeline in all_pipelines(spec) {
        validate_pipeline(pipeline)?;
    }
    Ok(())
}

fn all_pipelines(spec: &PipelineSpec) -> impl Iterator<Item = &Pipeline> {
    spec.pipelines
        .default
        .iter()
        .chain(spec.pipelines.custom.values())
        .chain(spec.pipelines.branches.values())
        .chain(spec.pipelines.pull_requests.values())
        .chain(spec.pipelines.tags.values())
        .chain(spec.pipelines.bookmarks.values())
}

fn validate_pipeline(pipeline: &Pipeline) -> Result<(), SpecError> {
    for (idx, element) in pipeline.0.iter().enumerate() {
        match element {
            PipelineElement::Variables { variables } => {
                if idx != 0 {
                    return Err(SpecError::VariablesNotFirst);
                }
                for variable in variables {
                    validate_variable(variable)?;
                }
            }
            PipelineElement::Parallel { parallel } => {
                if parallel.steps.len() < 2 {
                    return Err(SpecError::ParallelTooFew {
                        found: parallel.steps.len(),
                    });
                }
            }
            PipelineElement::Stage { .. } | PipelineElement::Step { .. } => {}
        }
    }
    Ok(())
}

fn validate_variable(variable: &crate::model::Variable) -> Result<(), SpecError> {
    let Some(allowed) = &variable.allowed_values else {
        return Ok(());
    };
    let Some(default) = &variable.default else {
        return Err(SpecError::VariableMissingDefault {
            name: variable.name.clone(),
        });
    };
    if !allowed.contains(default) {
        return Err(SpecError::VariableDefaultNotAllowed {
            name: variable.name.clone(),
            default: default.clone(),
        });
    }
    Ok(())
}

/// Checks that every `aws.oidc-role` reference in the spec is backed by
/// `oidc_enabled` in the runtime config, per spec.md §3's
/// `AwsCredentials` invariant.
pub fn validate_oidc_usage(spec: &PipelineSpec, oidc_enabled: bool) -> Result<(), SpecError> {
    if oidc_enabled {
        return Ok(());
    }
    for pipeline in all_pipelines(spec) {
        for element in &pipeline.0 {
            if let PipelineElement::Step { step } = element {
                if step_uses_oidc_role(step) {
                    return Err(SpecError::OidcRoleNotSupported);
                }
            }
        }
    }
    for service in spec.definitions.services.values() {
        if let Some(image) = &service.image {
            if matches!(image.aws, Some(AwsCredentials::OidcRole { .. })) {
                return Err(SpecError::OidcRoleNotSupported);
            }
        }
    }
    Ok(())
}

fn step_uses_oidc_role(step: &crate::model::Step) -> bool {
    step.image
        .as_ref()
        .map(|i| matches!(i.aws, Some(AwsCredentials::OidcRole { .. })))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

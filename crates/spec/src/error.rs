// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while parsing, validating, or expanding a pipeline
/// specification. These map onto spec.md §7's "Validation" error kind:
/// user-visible, location-reported, halting before any container runs.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing envvars: {0}")]
    MissingEnvVars(String),

    #[error("variable {name:?} has allowed-values but no default")]
    VariableMissingDefault { name: String },

    #[error("variable {name:?} default {default:?} is not among its allowed-values")]
    VariableDefaultNotAllowed { name: String, default: String },

    #[error("parallel step must declare at least 2 steps, found {found}")]
    ParallelTooFew { found: usize },

    #[error("variables may only appear as the first element of a pipeline")]
    VariablesNotFirst,

    #[error("aws oidc-role not supported")]
    OidcRoleNotSupported,

    #[error("service {name:?} has no image (not found in the spec or in default services)")]
    ServiceMissingImage { name: String },

    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),
}

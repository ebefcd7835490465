// SPDX-License-Identifier: MIT

//! Error taxonomy for the orchestration engine (spec.md §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("usage error: {0}")]
    Usage(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("repository error: {0}")]
    Repository(String),
    #[error("spec error: {0}")]
    Spec(#[from] cirun_spec::SpecError),
    #[error("storage error: {0}")]
    Storage(#[from] cirun_storage::StorageError),
    #[error("container error: {0}")]
    Container(#[from] cirun_container::ContainerError),
    #[error("cache error: {0}")]
    Cache(#[from] cirun_cache::CacheError),
    #[error("artifact error: {0}")]
    Artifact(#[from] cirun_artifact::ArtifactError),
    #[error("oidc error: {0}")]
    Oidc(#[from] cirun_oidc::OidcError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid service: {0}")]
    InvalidService(String),
    #[error("service memory budget exceeded: requested {requested} MiB, available {available} MiB")]
    ServiceMemoryBudget { requested: u64, available: u64 },
}

impl EngineError {
    /// True for the "runtime, pipeline-fatal" taxonomy entry of spec.md §7:
    /// errors that should still attempt best-effort teardown before
    /// propagating, as opposed to usage/validation errors that precede any
    /// container having been created.
    pub fn is_pipeline_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Container(_) | EngineError::Artifact(_) | EngineError::InvalidService(_) | EngineError::ServiceMemoryBudget { .. }
        )
    }
}

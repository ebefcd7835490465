// SPDX-License-Identifier: MIT

//! Shared test fixtures for the engine crate.

#![cfg(test)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use cirun_core::id::{IdGen, OwnerUuid, ProjectUuid, RepoUuid, UuidIdGen, WorkspaceUuid};
use cirun_core::{PipelineUuid, ProjectMetadata, WorkspaceMetadata};
use cirun_spec::{EffectiveCloneSettings, Step};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::context::{Config, PipelineRunContext};

pub fn project_metadata() -> ProjectMetadata {
    ProjectMetadata {
        name: "demo".to_string(),
        slug: "demo".to_string(),
        key: "DEM".to_string(),
        path_slug: "demo-abc123".to_string(),
        project_uuid: ProjectUuid(Uuid::nil()),
        repo_uuid: RepoUuid(Uuid::nil()),
        build_number: 7,
    }
}

pub fn workspace_metadata() -> WorkspaceMetadata {
    WorkspaceMetadata::new(
        OwnerUuid(Uuid::nil()),
        WorkspaceUuid(Uuid::nil()),
        "unused-in-these-tests".to_string(),
    )
}

pub fn pipeline_context() -> PipelineRunContext {
    PipelineRunContext {
        pipeline_name: "custom.test".to_string(),
        elements: Vec::new(),
        effective_caches: IndexMap::new(),
        effective_services: IndexMap::new(),
        // Disabled so generic runner tests don't also exercise the
        // repository cloner, which has its own dedicated tests.
        effective_clone: EffectiveCloneSettings {
            enabled: false,
            ..EffectiveCloneSettings::default()
        },
        default_image: None,
        workspace: workspace_metadata(),
        project: project_metadata(),
        repo_path: PathBuf::from("/tmp/demo"),
        env_vars: HashMap::new(),
        selected_steps: Vec::new(),
        selected_stages: Vec::new(),
        pipeline_uuid: PipelineUuid(Uuid::nil()),
        pipeline_variables: HashMap::new(),
        config: Config::default(),
        current_branch: "main".to_string(),
        current_commit: "a".repeat(40),
        id_gen: Arc::new(UuidIdGen) as Arc<dyn IdGen>,
    }
}

pub fn step(name: &str, script: &[&str]) -> Step {
    Step {
        name: Some(name.to_string()),
        script: script.iter().map(|s| cirun_spec::Line::Raw(s.to_string())).collect(),
        image: None,
        caches: Vec::new(),
        services: Vec::new(),
        artifacts: Vec::new(),
        after_script: Vec::new(),
        size: cirun_spec::StepSize::X1,
        clone: None,
        deployment: None,
        trigger: cirun_spec::Trigger::Automatic,
        max_time: None,
        condition: None,
        oidc: false,
    }
}

// SPDX-License-Identifier: MIT

//! Dotted-path pipeline addressing (spec.md §4.1): `default`,
//! `custom.<name>`, and glob-matched `branches.<name>` /
//! `pull_requests.<name>` / `tags.<name>` / `bookmarks.<name>` groups.

use crate::error::SpecError;
use crate::model::{Pipeline, PipelineSpec, Pipelines};
use glob::Pattern;

fn glob_lookup<'a>(group: &'a indexmap::IndexMap<String, Pipeline>, needle: &str) -> Option<&'a Pipeline> {
    let mut candidates: Vec<&String> = group
        .keys()
        .filter(|pattern| Pattern::new(pattern).map(|p| p.matches(needle)).unwrap_or(false))
        .collect();
    candidates.sort();
    candidates.first().and_then(|key| group.get(*key))
}

/// Resolves a dotted pipeline path to its [`Pipeline`].
pub fn get_pipeline<'a>(pipelines: &'a Pipelines, path: &str) -> Result<&'a Pipeline, SpecError> {
    if path == "default" {
        return pipelines
            .default
            .as_ref()
            .ok_or_else(|| SpecError::PipelineNotFound(path.to_string()));
    }

    let (group, rest) = path
        .split_once('.')
        .ok_or_else(|| SpecError::PipelineNotFound(path.to_string()))?;

    let result = match group {
        "custom" => pipelines.custom.get(rest),
        "branches" => glob_lookup(&pipelines.branches, rest),
        "pull_requests" | "pull-requests" => glob_lookup(&pipelines.pull_requests, rest),
        "tags" => glob_lookup(&pipelines.tags, rest),
        "bookmarks" => glob_lookup(&pipelines.bookmarks, rest),
        _ => None,
    };

    result.ok_or_else(|| SpecError::PipelineNotFound(path.to_string()))
}

/// Enumerates every concrete dotted path the spec declares.
pub fn get_available_pipelines(pipelines: &Pipelines) -> Vec<String> {
    let mut out = Vec::new();
    if pipelines.default.is_some() {
        out.push("default".to_string());
    }
    for name in pipelines.custom.keys() {
        out.push(format!("custom.{name}"));
    }
    for name in pipelines.branches.keys() {
        out.push(format!("branches.{name}"));
    }
    for name in pipelines.pull_requests.keys() {
        out.push(format!("pull-requests.{name}"));
    }
    for name in pipelines.tags.keys() {
        out.push(format!("tags.{name}"));
    }
    for name in pipelines.bookmarks.keys() {
        out.push(format!("bookmarks.{name}"));
    }
    out
}

/// Convenience wrapper resolving against a full [`PipelineSpec`].
pub fn get_pipeline_in_spec<'a>(spec: &'a PipelineSpec, path: &str) -> Result<&'a Pipeline, SpecError> {
    get_pipeline(&spec.pipelines, path)
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;

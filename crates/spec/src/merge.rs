// SPDX-License-Identifier: MIT

//! Default-merging operations (spec.md §8: "effective.caches = default_caches
//! ⊎ spec.caches (spec wins on conflict); docker always appears in
//! effective services").

use crate::model::{Definitions, Service};
use indexmap::IndexMap;

pub const DEFAULT_CACHE_NAMES: &[&str] = &[
    "composer",
    "dotnetcore",
    "gradle",
    "ivy2",
    "maven",
    "node",
    "pip",
    "sbt",
];

pub const DOCKER_SERVICE_NAME: &str = "docker";
pub const DOCKER_FALLBACK_IMAGE: &str = "docker:dind";
pub const SERVICE_DEFAULT_MEMORY_MIB: u64 = 1024;

fn default_cache_path(name: &str) -> String {
    match name {
        "composer" => "~/.composer/cache".to_string(),
        "dotnetcore" => "~/.nuget/packages".to_string(),
        "gradle" => "~/.gradle/caches".to_string(),
        "ivy2" => "~/.ivy2/cache".to_string(),
        "maven" => "~/.m2/repository".to_string(),
        "node" => "node_modules".to_string(),
        "pip" => "~/.cache/pip".to_string(),
        "sbt" => "~/.sbt".to_string(),
        other => format!("~/.cache/{other}"),
    }
}

/// Builds the effective cache map: every [`DEFAULT_CACHE_NAMES`] entry,
/// overridden by anything the spec declares under `definitions.caches`.
pub fn effective_caches(spec_caches: &IndexMap<String, String>) -> IndexMap<String, String> {
    let mut effective: IndexMap<String, String> = DEFAULT_CACHE_NAMES
        .iter()
        .map(|name| (name.to_string(), default_cache_path(name)))
        .collect();
    for (name, path) in spec_caches {
        effective.insert(name.clone(), path.clone());
    }
    effective
}

/// Builds the effective service map: whatever the spec declares under
/// `definitions.services`, plus a `docker` entry — using the spec's
/// declaration if present, otherwise a fallback `docker:dind` service.
pub fn effective_services(spec_services: &Definitions) -> IndexMap<String, Service> {
    let mut effective = spec_services.services.clone();
    effective.entry(DOCKER_SERVICE_NAME.to_string()).or_insert_with(|| Service {
        image: Some(crate::model::Image {
            name: DOCKER_FALLBACK_IMAGE.to_string(),
            ..Default::default()
        }),
        variables: IndexMap::new(),
        memory: Some(SERVICE_DEFAULT_MEMORY_MIB),
        command: None,
    });
    effective
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;

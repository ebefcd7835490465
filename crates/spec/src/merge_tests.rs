// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn default_caches_are_all_present() {
    let effective = effective_caches(&IndexMap::new());
    for name in DEFAULT_CACHE_NAMES {
        assert!(effective.contains_key(*name), "missing default cache {name}");
    }
}

#[test]
fn spec_caches_override_defaults() {
    let mut spec_caches = IndexMap::new();
    spec_caches.insert("node".to_string(), "custom/node_modules".to_string());
    let effective = effective_caches(&spec_caches);
    assert_eq!(effective["node"], "custom/node_modules");
}

#[test]
fn spec_caches_add_custom_entries() {
    let mut spec_caches = IndexMap::new();
    spec_caches.insert("custom".to_string(), "/tmp/custom".to_string());
    let effective = effective_caches(&spec_caches);
    assert_eq!(effective["custom"], "/tmp/custom");
    assert_eq!(effective.len(), DEFAULT_CACHE_NAMES.len() + 1);
}

#[test]
fn docker_service_always_present_with_fallback() {
    let defs = Definitions::default();
    let effective = effective_services(&defs);
    let docker = effective.get(DOCKER_SERVICE_NAME).expect("docker present");
    assert_eq!(docker.image.as_ref().unwrap().name, DOCKER_FALLBACK_IMAGE);
}

#[test]
fn declared_docker_service_is_not_overridden() {
    let mut defs = Definitions::default();
    defs.services.insert(
        "docker".to_string(),
        Service {
            image: Some(crate::model::Image {
                name: "docker:24-dind".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        },
    );
    let effective = effective_services(&defs);
    assert_eq!(effective["docker"].image.as_ref().unwrap().name, "docker:24-dind");
}

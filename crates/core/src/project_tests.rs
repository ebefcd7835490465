// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn fresh_record_starts_at_build_zero() {
    let meta = ProjectMetadata::fresh("my-repo", "my-repo", "MR", "my-repo-abc123");
    assert_eq!(meta.build_number, 0);
    assert_eq!(meta.name, "my-repo");
    assert_eq!(meta.path_slug, "my-repo-abc123");
}

#[test]
fn fresh_record_has_distinct_uuids() {
    let meta = ProjectMetadata::fresh("p", "p", "P", "p-x");
    assert_ne!(meta.project_uuid.as_uuid(), meta.repo_uuid.as_uuid());
}

#[test]
fn roundtrips_through_json() {
    let meta = ProjectMetadata::fresh("p", "p", "P", "p-x");
    let json = serde_json::to_string(&meta).expect("serialize");
    let back: ProjectMetadata = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(meta, back);
}

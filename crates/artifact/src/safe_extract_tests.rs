// SPDX-License-Identifier: MIT

use super::*;
use tempfile::tempdir;

fn tar_with_entry(name: &str, contents: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, contents).expect("append");
    builder.into_inner().expect("finish")
}

#[test]
fn resolves_within_allows_plain_nested_path() {
    let target = Path::new("/tmp/build/artifacts");
    assert!(resolves_within(target, Path::new("reports/result.xml")));
}

#[test]
fn resolves_within_rejects_parent_dir_escape() {
    let target = Path::new("/tmp/build/artifacts");
    assert!(!resolves_within(target, Path::new("../../etc/passwd")));
}

#[test]
fn resolves_within_allows_harmless_internal_parent_dir() {
    let target = Path::new("/tmp/build/artifacts");
    assert!(resolves_within(target, Path::new("a/../b.txt")));
}

#[test]
fn resolves_within_rejects_absolute_member_path() {
    let target = Path::new("/tmp/build/artifacts");
    assert!(!resolves_within(target, Path::new("/etc/passwd")));
}

#[test]
fn safe_extract_tar_writes_member_under_target() {
    let dir = tempdir().expect("tempdir");
    let tar_bytes = tar_with_entry("result.xml", b"<ok/>");
    safe_extract_tar(&tar_bytes, dir.path()).expect("extract");
    let contents = std::fs::read(dir.path().join("result.xml")).expect("read");
    assert_eq!(contents, b"<ok/>");
}

#[test]
fn safe_extract_tar_rejects_traversal_member() {
    let dir = tempdir().expect("tempdir");
    let tar_bytes = tar_with_entry("../escape.txt", b"bad");
    let result = safe_extract_tar(&tar_bytes, dir.path());
    assert!(matches!(result, Err(ArtifactError::PathTraversal(_))));
}

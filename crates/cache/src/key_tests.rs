// SPDX-License-Identifier: MIT

use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn compute_cache_key_is_deterministic_and_order_independent_in_input_order() {
    let dir = tempdir().expect("tempdir");
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"hello").expect("write a");
    fs::write(&b, b"world").expect("write b");

    let key1 = compute_cache_key(&[a.clone(), b.clone()]).expect("key1");
    let key2 = compute_cache_key(&[a, b]).expect("key2");
    assert_eq!(key1, key2);
    assert_eq!(key1.len(), 64);
}

#[test]
fn compute_cache_key_changes_with_content() {
    let dir = tempdir().expect("tempdir");
    let a = dir.path().join("a.txt");
    fs::write(&a, b"hello").expect("write");
    let before = compute_cache_key(&[a.clone()]).expect("before");

    fs::write(&a, b"goodbye").expect("rewrite");
    let after = compute_cache_key(&[a]).expect("after");
    assert_ne!(before, after);
}

#[test]
fn expand_key_files_returns_sorted_matches() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("b.lock"), b"b").expect("write b");
    fs::write(dir.path().join("a.lock"), b"a").expect("write a");

    let key = CacheKey {
        files: vec!["*.lock".to_string()],
    };
    let matched = expand_key_files(dir.path(), &key).expect("expand");
    assert_eq!(matched.len(), 2);
    assert!(matched[0].ends_with("a.lock"));
    assert!(matched[1].ends_with("b.lock"));
}

#[test]
fn expand_key_files_empty_when_glob_matches_nothing() {
    let dir = tempdir().expect("tempdir");
    let key = CacheKey {
        files: vec!["nonexistent-*.lock".to_string()],
    };
    let matched = expand_key_files(dir.path(), &key).expect("expand");
    assert!(matched.is_empty());
}

#[test]
fn archive_stem_appends_hash_when_present() {
    assert_eq!(archive_stem("node", None), "node");
    assert_eq!(archive_stem("node", Some("abc123")), "node-abc123");
}

proptest::proptest! {
    #[test]
    fn cache_key_is_stable_for_identical_content(bytes: Vec<u8>) {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("key-file");
        fs::write(&path, &bytes).expect("write");

        let key1 = compute_cache_key(&[path.clone()]).expect("key1");
        let key2 = compute_cache_key(&[path]).expect("key2");
        proptest::prop_assert_eq!(key1, key2);
    }
}

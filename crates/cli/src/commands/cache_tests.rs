use super::*;

#[test]
fn list_and_clear_on_missing_dir_are_no_ops() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    list(&missing).expect("list on missing dir");
    clear(&missing).expect("clear on missing dir");
}

#[test]
fn clear_removes_every_archive() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("node.tar"), b"data").expect("write");
    std::fs::write(dir.path().join("pip-abc123.tar"), b"data").expect("write");

    clear(dir.path()).expect("clear");
    let remaining: Vec<_> = std::fs::read_dir(dir.path()).expect("read_dir").collect();
    assert!(remaining.is_empty());
}

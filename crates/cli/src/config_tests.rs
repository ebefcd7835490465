use super::*;
use std::io::Write;

#[test]
fn missing_file_yields_defaults() {
    let path = std::path::Path::new("/nonexistent/cirun/config.toml");
    let config = load(path).expect("missing file is not an error");
    assert_eq!(config.total_memory_limit_mib, Config::default().total_memory_limit_mib);
}

#[test]
fn toml_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).expect("create");
    writeln!(file, "total_memory_limit = 8192\ncpu_limits = false\ndefault_image = \"alpine:latest\"").expect("write");

    let config = load(&path).expect("load");
    assert_eq!(config.total_memory_limit_mib, 8192);
    assert!(!config.cpu_limits);
    assert_eq!(config.default_image, "alpine:latest");
}

#[test]
fn env_override_wins_over_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "total_memory_limit = 8192").expect("write");

    std::env::set_var("CIRUN_TOTAL_MEMORY_LIMIT", "2048");
    let config = load(&path).expect("load");
    std::env::remove_var("CIRUN_TOTAL_MEMORY_LIMIT");

    assert_eq!(config.total_memory_limit_mib, 2048);
}

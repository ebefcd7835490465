// SPDX-License-Identifier: MIT

//! `.env` file loading (spec.md §1, §6's `-e ENV_FILE` flag). Minimal
//! `KEY=VALUE` parsing: one pair per line, blank lines and `#`-prefixed
//! comments ignored, no quoting or multi-line values.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("failed to read env file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("malformed line in {path}: {line:?}")]
    Malformed { path: String, line: String },
}

/// Parses `path` into a `KEY=VALUE` map.
pub fn load_env_file(path: &Path) -> Result<HashMap<String, String>, EnvFileError> {
    let contents = std::fs::read_to_string(path).map_err(|source| EnvFileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut vars = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.trim_start_matches("export ").split_once('=').ok_or_else(|| EnvFileError::Malformed {
            path: path.display().to_string(),
            line: line.to_string(),
        })?;
        let value = value.trim().trim_matches('"').trim_matches('\'');
        vars.insert(key.trim().to_string(), value.to_string());
    }
    Ok(vars)
}

/// Layers a sequence of `.env` files in order, each overriding keys set
/// by earlier ones, so later `-e` flags win over the project default.
pub fn load_env_files(paths: &[std::path::PathBuf]) -> Result<HashMap<String, String>, EnvFileError> {
    let mut merged = HashMap::new();
    for path in paths {
        merged.extend(load_env_file(path)?);
    }
    Ok(merged)
}

#[cfg(test)]
#[path = "envfile_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Repository Inspector (spec.md §4.3): current branch and commit of the
//! host working copy, via the local `git` binary. Failure is fatal.

use std::path::Path;
use std::process::Command;

use crate::error::EngineError;

fn run_git(repo_path: &Path, args: &[&str]) -> Result<String, EngineError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(args)
        .output()
        .map_err(|e| EngineError::Repository(format!("failed to run git {args:?}: {e}")))?;
    if !output.status.success() {
        return Err(EngineError::Repository(format!(
            "git {args:?} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Current branch name of the working copy rooted at `repo_path`.
pub fn get_current_branch(repo_path: &Path) -> Result<String, EngineError> {
    run_git(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// Current commit hash of the working copy rooted at `repo_path`.
pub fn get_current_commit(repo_path: &Path) -> Result<String, EngineError> {
    run_git(repo_path, &["rev-parse", "HEAD"])
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

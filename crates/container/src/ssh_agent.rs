// SPDX-License-Identifier: MIT

//! `get_ssh_agent_socket_path` (spec.md §4.6): resolves the host
//! ssh-agent socket to bind-mount into the build container as
//! `/ssh-agent`.

use std::path::PathBuf;

use crate::engine::EngineVersion;

pub fn get_ssh_agent_socket_path(version: &EngineVersion) -> Option<PathBuf> {
    let is_docker_desktop = version
        .platform_name
        .as_deref()
        .map(|name| name.starts_with("Docker Desktop"))
        .unwrap_or(false);

    if is_docker_desktop {
        if cfg!(target_os = "windows") {
            tracing::warn!("ssh-agent forwarding is not supported on Docker Desktop for Windows");
            return None;
        }
        return Some(PathBuf::from("/run/host-services/ssh-auth.sock"));
    }

    let raw = std::env::var("SSH_AUTH_SOCK").ok()?;
    let expanded = shellexpand::tilde(&raw).into_owned();
    std::fs::canonicalize(&expanded).ok()
}

#[cfg(test)]
#[path = "ssh_agent_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-container: the `ContainerEngine` trait and its Docker
//! implementation, the image authenticator, and ssh-agent resolution
//! (spec.md §4.5, §4.6).

pub mod auth;
pub mod docker;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod ssh_agent;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use auth::{get_image_authentication, OidcMintContext};
pub use docker::DockerEngine;
pub use engine::{
    ContainerEngine, ContainerSpec, CpuLimits, EngineVersion, ExecOutcome, Mount, OutputSink,
    RegistryCredentials,
};
pub use error::ContainerError;
pub use runtime::{ContainerRunner, StartContainerParams};
pub use ssh_agent::get_ssh_agent_socket_path;

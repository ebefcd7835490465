// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("container exec failed: {0}")]
    Exec(String),
    #[error("image authentication failed: {0}")]
    Auth(String),
    #[error("no build container has been started")]
    NotStarted,
    #[error("path traversal detected while extracting {0:?}")]
    PathTraversal(std::path::PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

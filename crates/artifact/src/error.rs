// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("container error: {0}")]
    Container(#[from] cirun_container::ContainerError),
    #[error("path traversal detected while extracting {0:?}")]
    PathTraversal(std::path::PathBuf),
}

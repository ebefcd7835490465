// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cache key: {0}")]
    InvalidCacheKey(String),
    #[error("container error: {0}")]
    Container(#[from] cirun_container::ContainerError),
}

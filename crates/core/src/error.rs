// SPDX-License-Identifier: MIT

//! Error taxonomy shared across crates.
//!
//! Individual crates define their own error enums for the specifics of
//! their domain and wrap this one via `#[from]` for the cases that bottom
//! out in generic I/O or (de)serialization failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invariant violated: {0}")]
    Invariant(String),
}

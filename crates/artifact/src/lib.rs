// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-artifact: artifact upload/download around a step run, with
//! path-traversal-safe tar extraction (spec.md §4.10).

pub mod download;
pub mod error;
pub mod safe_extract;
pub mod upload;

pub use download::download;
pub use error::ArtifactError;
pub use safe_extract::safe_extract_tar;
pub use upload::upload;

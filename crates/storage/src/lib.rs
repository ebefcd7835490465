// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-storage: the project and workspace metadata sidecars (spec.md
//! §4.2), persisted as JSON with a temp-file-then-rename write discipline.

pub mod error;
pub mod metadata;
pub mod slug;

pub use error::StorageError;
pub use metadata::{
    load_or_create_workspace_metadata, load_project_metadata, next_build_number,
    save_project_metadata, save_workspace_metadata,
};
pub use slug::{key_from_slug, path_slug, slugify, stable_hash};

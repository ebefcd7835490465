// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-spec: the YAML pipeline specification, its typed model, and the
//! parsing/validation/env-expansion pipeline that turns a raw document
//! into something `cirun-engine` can run.

pub mod env_expand;
pub mod error;
pub mod merge;
pub mod model;
pub mod parser;
pub mod path;

pub use error::SpecError;
pub use merge::{effective_caches, effective_services};
pub use model::*;
pub use parser::parse_str;
pub use path::{get_available_pipelines, get_pipeline};

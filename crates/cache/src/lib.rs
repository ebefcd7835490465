// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-cache: cache key computation and the upload/download lifecycle
//! for declared caches, including the `docker` cache specialization
//! (spec.md §4.9).

pub mod docker_cache;
pub mod error;
pub mod key;
pub mod manager;

pub use docker_cache::DOCKER_CACHE_NAME;
pub use error::CacheError;
pub use key::{archive_stem, compute_cache_key, expand_key_files, CacheKey};
pub use manager::{rewrite_home, CacheDef, CacheManager};

// SPDX-License-Identifier: MIT

//! Subscriber bootstrap. Lives only here, matching spec.md §1's exclusion
//! of "logger bootstrap" as a library-crate concern.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

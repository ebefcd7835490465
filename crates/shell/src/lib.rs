// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cirun-shell: turns a step's `script`/`after_script` lines into the
//! command the build container actually executes (spec.md §4.6), and the
//! `+ `-prefixed form the step logger echoes before each line runs.

pub mod escape;
pub mod pipe;
pub mod script;

pub use escape::shell_escape_value;
pub use script::{compose, display_line, render_line, wrap_command, ScriptPlan};

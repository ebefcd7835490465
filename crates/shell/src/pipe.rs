// SPDX-License-Identifier: MIT

//! Rewrites a `{pipe, variables}` script line into the `docker run`
//! invocation that executes it (spec.md §3, §4.6).

use crate::escape::shell_escape_value;
use cirun_spec::Pipe;

/// Renders `pipe` as `docker run --rm -e K="V" ... <image>`, with each
/// variable value passed through [`shell_escape_value`].
pub fn render_pipe(pipe: &Pipe) -> String {
    let mut parts = vec!["docker".to_string(), "run".to_string(), "--rm".to_string()];
    for (key, value) in &pipe.variables {
        parts.push("-e".to_string());
        parts.push(format!("{key}=\"{}\"", shell_escape_value(value)));
    }
    parts.push(pipe.resolved_image());
    parts.join(" ")
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! Joins a step's script lines into the single command the container
//! runner executes, and the `+ `-prefixed text it echoes to the step log
//! before running it (spec.md §4.6).

use crate::pipe::render_pipe;
use cirun_spec::Line;

/// The executable form of a single line: a raw line verbatim, or a pipe
/// rewritten to its `docker run` invocation.
pub fn render_line(line: &Line) -> String {
    match line {
        Line::Raw(s) => s.clone(),
        Line::Pipe(p) => render_pipe(p),
    }
}

/// The `+ `-prefixed form logged before a line executes.
pub fn display_line(line: &Line) -> String {
    format!("+ {}", render_line(line))
}

/// A fully composed script: the joined executable body, and the
/// display lines to echo (in the same order) as each one runs.
pub struct ScriptPlan {
    pub display_lines: Vec<String>,
    pub joined: String,
}

/// Builds a [`ScriptPlan`] from a step's `script` or `after_script` lines.
pub fn compose(lines: &[Line]) -> ScriptPlan {
    let display_lines = lines.iter().map(display_line).collect();
    let joined = lines.iter().map(render_line).collect::<Vec<_>>().join("\n");
    ScriptPlan { display_lines, joined }
}

/// Wraps a composed script body as `sh -e -c "<cmd>"`, the form actually
/// passed to the container's exec API.
pub fn wrap_command(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-e".to_string(), "-c".to_string(), script.to_string()]
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;

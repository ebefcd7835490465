// SPDX-License-Identifier: MIT

use super::*;
use indexmap::IndexMap;

#[test]
fn compose_joins_raw_lines_with_newlines() {
    let lines = vec![Line::Raw("echo a".to_string()), Line::Raw("echo b".to_string())];
    let plan = compose(&lines);
    assert_eq!(plan.joined, "echo a\necho b");
    assert_eq!(plan.display_lines, vec!["+ echo a", "+ echo b"]);
}

#[test]
fn compose_rewrites_pipe_lines() {
    let pipe = cirun_spec::Pipe {
        pipe: "my-org/my-pipe:1.0".to_string(),
        variables: IndexMap::new(),
    };
    let lines = vec![Line::Pipe(pipe)];
    let plan = compose(&lines);
    assert_eq!(plan.joined, "docker run --rm my-org/my-pipe:1.0");
}

#[test]
fn wrap_command_uses_sh_e_c() {
    let wrapped = wrap_command("echo hi");
    assert_eq!(wrapped, vec!["sh", "-e", "-c", "echo hi"]);
}

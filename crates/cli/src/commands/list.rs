// SPDX-License-Identifier: MIT

//! `cirun list` (spec.md §6, supplemented by `original_source/pipeline_runner/cli.py`'s
//! `get_available_pipelines` grouping).

use std::path::PathBuf;

use clap::Args;

use super::run::DEFAULT_PIPELINE_FILE;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Project directory to read the pipeline file from
    #[arg(short = 'p', long = "project-dir", default_value = ".")]
    pub project_dir: PathBuf,

    /// Pipeline specification file, relative to the project directory
    #[arg(short = 'f', long = "pipeline-file")]
    pub pipeline_file: Option<PathBuf>,

    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    #[arg(long = "no-color")]
    pub no_color: bool,
}

const GROUPS: &[&str] = &["default", "custom", "branches", "pull-requests", "tags", "bookmarks"];

pub fn handle(args: ListArgs) -> anyhow::Result<()> {
    let project_dir = args.project_dir.canonicalize().unwrap_or(args.project_dir);
    let pipeline_file = args.pipeline_file.unwrap_or_else(|| PathBuf::from(DEFAULT_PIPELINE_FILE));
    let path = project_dir.join(&pipeline_file);
    let yaml = std::fs::read_to_string(&path).map_err(|e| anyhow::anyhow!("failed to read pipeline file {}: {e}", path.display()))?;

    let spec = cirun_spec::parse_str(&yaml)?;
    let available = cirun_spec::get_available_pipelines(&spec.pipelines);

    for group in GROUPS {
        let matches: Vec<&String> = available
            .iter()
            .filter(|path| if *group == "default" { *path == "default" } else { path.starts_with(&format!("{group}.")) })
            .collect();
        if matches.is_empty() {
            continue;
        }
        println!("{group}:");
        for path in matches {
            println!("  {path}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! `cirun cache {clear|list}` (spec.md §6): stub commands operating on
//! the same per-project cache directory `cirun-cache` writes archives
//! to, since full cache-management UX is a non-goal.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::paths;

#[derive(Debug, Args)]
pub struct CacheArgs {
    /// Project directory whose cache archives to operate on
    #[arg(short = 'p', long = "project-dir", default_value = ".", global = true)]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// List cache archives and their sizes
    List,
    /// Remove every cache archive
    Clear,
}

fn project_cache_dir(project_dir: &std::path::Path) -> anyhow::Result<PathBuf> {
    let project_dir = project_dir.canonicalize().unwrap_or_else(|_| project_dir.to_path_buf());
    let path_slug = cirun_storage::path_slug(&project_dir);
    Ok(paths::cache_dir().join(path_slug).join("caches"))
}

pub fn handle(args: CacheArgs) -> anyhow::Result<()> {
    let dir = project_cache_dir(&args.project_dir)?;
    match args.command {
        CacheCommand::List => list(&dir),
        CacheCommand::Clear => clear(&dir),
    }
}

fn list(dir: &std::path::Path) -> anyhow::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let size = entry.metadata()?.len();
        println!("{}\t{size}", entry.file_name().to_string_lossy());
    }
    Ok(())
}

fn clear(dir: &std::path::Path) -> anyhow::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        std::fs::remove_file(entry.path())?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT

//! cirun - a local CI pipeline runner modeled on the Bitbucket Pipelines
//! schema (spec.md §1, §6).

mod commands;
mod config;
mod envfile;
mod log_writer;
mod logging;
mod paths;

use clap::{Parser, Subcommand};
use commands::{cache, list, run};

#[derive(Parser)]
#[command(name = "cirun", version, about = "A local CI pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline
    Run(run::RunArgs),
    /// List the pipelines declared by a pipeline file
    List(list::ListArgs),
    /// Manage cache archives
    Cache(cache::CacheArgs),
}

#[tokio::main]
async fn main() {
    logging::init();

    let exit_code = match run_cli().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run_cli() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run::handle(args).await,
        Commands::List(args) => {
            list::handle(args)?;
            Ok(0)
        }
        Commands::Cache(args) => {
            cache::handle(args)?;
            Ok(0)
        }
    }
}

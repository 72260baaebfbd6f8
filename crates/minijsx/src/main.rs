//! minijsx: rewrites JSX tags into plain function calls.

mod cli;
mod config;
mod orchestrator;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let summary = orchestrator::run(&args)?;
    if summary.error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

//! The `gham` command line: wires configuration, credentials and logging
//! into the capture and ingest crates.
#![deny(clippy::print_stdout)]

mod cli;
mod config;
mod fetch_cmd;
mod github;
mod index_cmd;

pub use crate::cli::Cli;
pub use crate::cli::Command;
pub use crate::cli::FetchCommand;
pub use crate::cli::FetchJobsArgs;
pub use crate::cli::FetchRunsArgs;
pub use crate::cli::IndexArgs;
pub use crate::cli::IndexKind;
pub use crate::cli::WorkflowArgs;
pub use crate::config::ElasticsearchConfig;
pub use crate::config::GhamConfig;
pub use crate::config::GithubConfig;

use anyhow::Context;
use gham_store::EntityStore;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Logs go to stderr; stdout carries only command summaries.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GhamConfig::load(cli.config.as_deref())?;
    let deadline = config.deadline();
    let work = dispatch(cli.command, config);
    match deadline {
        Some(deadline) => tokio::time::timeout(deadline, work)
            .await
            .with_context(|| format!("gham did not finish within {}s", deadline.as_secs()))?,
        None => work.await,
    }
}

async fn dispatch(command: Command, config: GhamConfig) -> anyhow::Result<()> {
    match command {
        Command::Fetch(fetch) => fetch_cmd::run_fetch(fetch, &config).await,
        Command::Index(args) => index_cmd::run_index(args, &config).await,
        Command::Version => {
            print_summary(&format!("gham {}", env!("CARGO_PKG_VERSION")));
            Ok(())
        }
    }
}

/// Opens the store at `dir`, which must already exist.
pub(crate) fn open_store(dir: &Path) -> anyhow::Result<EntityStore> {
    let dir = std::path::absolute(dir)
        .with_context(|| format!("failed to resolve {}", dir.display()))?;
    EntityStore::open(&dir).with_context(|| format!("invalid store directory {}", dir.display()))
}

#[allow(clippy::print_stdout)]
pub(crate) fn print_summary(line: &str) {
    println!("{line}");
}

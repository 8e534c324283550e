use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use gham_capture::CaptureTarget;
use std::path::PathBuf;

/// Capture GitHub Actions history to disk and index it into Elasticsearch.
#[derive(Debug, Parser)]
#[clap(author, version, bin_name = "gham")]
pub struct Cli {
    /// TOML file with tunables; every key is optional.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture runs or jobs from the GitHub API.
    #[clap(subcommand)]
    Fetch(FetchCommand),

    /// Stream captured entities into Elasticsearch.
    Index(IndexArgs),

    /// Print the version.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum FetchCommand {
    /// Capture completed pull-request runs of a workflow.
    Runs(FetchRunsArgs),

    /// Capture the job list of stored runs.
    Jobs(FetchJobsArgs),
}

#[derive(Debug, Args)]
pub struct WorkflowArgs {
    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub repo: String,

    #[arg(long, value_name = "ID")]
    pub workflow_id: u64,

    /// Store root; must be an existing directory.
    #[arg(long, value_name = "DIR")]
    pub destination: PathBuf,
}

impl WorkflowArgs {
    pub fn target(&self) -> CaptureTarget {
        CaptureTarget {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            workflow_id: self.workflow_id,
        }
    }
}

#[derive(Debug, Args)]
pub struct FetchRunsArgs {
    #[clap(flatten)]
    pub workflow: WorkflowArgs,

    /// Only runs created on or after this date (YYYY-MM-DD). Fetches a
    /// single page.
    #[arg(long, value_name = "DATE")]
    pub created: Option<String>,

    /// Also capture the jobs of every run captured by this invocation.
    #[arg(long)]
    pub with_jobs: bool,
}

#[derive(Debug, Args)]
pub struct FetchJobsArgs {
    #[clap(flatten)]
    pub workflow: WorkflowArgs,

    /// Runs to capture jobs for. Defaults to every stored run without jobs.
    #[arg(long = "run-id", value_name = "ID")]
    pub run_ids: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexKind {
    Runs,
    Jobs,
    Steps,
    All,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[arg(value_enum)]
    pub kind: IndexKind,

    /// Elasticsearch base URL.
    #[arg(long)]
    pub url: String,

    #[arg(long, value_name = "ID")]
    pub workflow_id: u64,

    /// Store root written by `gham fetch`.
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,
}

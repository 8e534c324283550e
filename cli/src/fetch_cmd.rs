use crate::cli::FetchCommand;
use crate::cli::FetchJobsArgs;
use crate::cli::FetchRunsArgs;
use crate::config::GhamConfig;
use crate::github::GithubClients;
use crate::open_store;
use crate::print_summary;
use anyhow::Context;
use gham_capture::CaptureError;
use gham_capture::CreatedFilter;
use gham_capture::JobCaptureSummary;
use gham_capture::JobSelection;
use gham_capture::RunMode;
use gham_capture::capture_jobs;
use gham_capture::capture_runs;

pub(crate) async fn run_fetch(command: FetchCommand, config: &GhamConfig) -> anyhow::Result<()> {
    match command {
        FetchCommand::Runs(args) => fetch_runs(args, config).await,
        FetchCommand::Jobs(args) => fetch_jobs(args, config).await,
    }
}

async fn fetch_runs(args: FetchRunsArgs, config: &GhamConfig) -> anyhow::Result<()> {
    // Validate before touching the network.
    let mode = match args.created.as_deref() {
        Some(created) => RunMode::CreatedOn(created.parse::<CreatedFilter>()?),
        None => RunMode::Latest,
    };
    let store = open_store(&args.workflow.destination)?;
    let target = args.workflow.target();
    let github = GithubClients::from_config(&config.github)?;

    let outcome = capture_runs(&github.runs(), &store, &target, mode).await;
    let (captured, skipped, failure) = match outcome {
        Ok(outcome) => (outcome.captured, outcome.skipped, None),
        // Runs stored before the failure are skipped by the next invocation,
        // so their jobs have to be captured now or never.
        Err(CaptureError::Upstream { captured, source }) => (captured, 0, Some(source)),
        Err(err) => return Err(err.into()),
    };
    if failure.is_some() {
        print_summary(&format!("runs: {} captured before failure", captured.len()));
    } else {
        print_summary(&format!("runs: {} captured, {skipped} skipped", captured.len()));
    }

    if args.with_jobs && !captured.is_empty() {
        let summary = capture_jobs(
            &github.jobs(),
            &store,
            &target,
            JobSelection::Runs(captured),
            config.github.job_concurrency,
        )
        .await?;
        print_job_summary(summary);
    }
    match failure {
        Some(source) => Err(source).context("listing workflow runs failed"),
        None => Ok(()),
    }
}

async fn fetch_jobs(args: FetchJobsArgs, config: &GhamConfig) -> anyhow::Result<()> {
    let store = open_store(&args.workflow.destination)?;
    let target = args.workflow.target();
    let github = GithubClients::from_config(&config.github)?;
    let selection = if args.run_ids.is_empty() {
        JobSelection::AllStored
    } else {
        JobSelection::Runs(args.run_ids)
    };

    let summary = capture_jobs(
        &github.jobs(),
        &store,
        &target,
        selection,
        config.github.job_concurrency,
    )
    .await?;
    print_job_summary(summary);
    Ok(())
}

fn print_job_summary(summary: JobCaptureSummary) {
    print_summary(&format!(
        "jobs: {} captured, {} skipped, {} failed",
        summary.captured, summary.skipped, summary.failed
    ));
}

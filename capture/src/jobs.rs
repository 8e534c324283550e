use crate::CaptureTarget;
use crate::error::CaptureError;
use futures::StreamExt;
use futures::stream;
use gham_github_api::AuthProvider;
use gham_github_api::HttpTransport;
use gham_github_api::JobsClient;
use gham_store::EntityKind;
use gham_store::EntityStore;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Upper bound on concurrently outstanding "list jobs" requests.
pub const DEFAULT_JOB_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSelection {
    /// Every stored run that has no job list yet.
    AllStored,
    /// Exactly these runs, e.g. the ones a run capture just persisted.
    Runs(Vec<u64>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobCaptureSummary {
    pub captured: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobOutcome {
    Captured,
    Skipped,
    Failed,
}

/// Captures the job list of each selected run, at most `concurrency`
/// requests at a time.
///
/// A failure for one run is logged and counted; the remaining runs are
/// still processed.
pub async fn capture_jobs<T, A>(
    client: &JobsClient<T, A>,
    store: &EntityStore,
    target: &CaptureTarget,
    selection: JobSelection,
    concurrency: usize,
) -> Result<JobCaptureSummary, CaptureError>
where
    T: HttpTransport,
    A: AuthProvider,
{
    let run_ids = match selection {
        JobSelection::AllStored => store.run_ids_without_jobs(target.workflow_id).await?,
        JobSelection::Runs(run_ids) => run_ids,
    };
    if run_ids.is_empty() {
        info!(workflow_id = target.workflow_id, "no runs without jobs found");
        return Ok(JobCaptureSummary::default());
    }
    info!(runs = run_ids.len(), concurrency, "fetching jobs");

    let summary = stream::iter(run_ids)
        .map(|run_id| capture_run_jobs(client, store, target, run_id))
        .buffer_unordered(concurrency.max(1))
        .fold(JobCaptureSummary::default(), |mut summary, outcome| async move {
            match outcome {
                JobOutcome::Captured => summary.captured += 1,
                JobOutcome::Skipped => summary.skipped += 1,
                JobOutcome::Failed => summary.failed += 1,
            }
            summary
        })
        .await;

    info!(
        workflow_id = target.workflow_id,
        captured = summary.captured,
        skipped = summary.skipped,
        failed = summary.failed,
        "captured jobs"
    );
    Ok(summary)
}

async fn capture_run_jobs<T, A>(
    client: &JobsClient<T, A>,
    store: &EntityStore,
    target: &CaptureTarget,
    run_id: u64,
) -> JobOutcome
where
    T: HttpTransport,
    A: AuthProvider,
{
    let workflow_id = target.workflow_id;
    let exists = match store.exists(workflow_id, EntityKind::Jobs, run_id).await {
        Ok(exists) => exists,
        Err(err) => {
            warn!(run_id, error = %err, "failed to check for stored jobs");
            return JobOutcome::Failed;
        }
    };
    if exists {
        debug!(
            run_id,
            path = %store.path(workflow_id, EntityKind::Jobs, run_id).display(),
            "jobs already exist"
        );
        return JobOutcome::Skipped;
    }

    let jobs = match client.list_jobs(&target.owner, &target.repo, run_id).await {
        Ok(jobs) => jobs,
        Err(err) => {
            warn!(run_id, error = %err, "failed to fetch jobs");
            return JobOutcome::Failed;
        }
    };

    match store.write(workflow_id, EntityKind::Jobs, run_id, jobs).await {
        Ok(path) => {
            debug!(run_id, path = %path.display(), "stored jobs");
            JobOutcome::Captured
        }
        Err(err) if err.is_already_exists() => JobOutcome::Skipped,
        Err(err) => {
            warn!(run_id, error = %err, "failed to save jobs");
            JobOutcome::Failed
        }
    }
}

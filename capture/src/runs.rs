use crate::CaptureTarget;
use crate::created::CreatedFilter;
use crate::error::CaptureError;
use gham_github_api::AuthProvider;
use gham_github_api::HttpTransport;
use gham_github_api::RawRun;
use gham_github_api::RunsClient;
use gham_github_api::RunsPage;
use gham_github_api::RunsQuery;
use gham_store::EntityKind;
use gham_store::EntityStore;
use tracing::debug;
use tracing::info;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Walk every page the upstream exposes, newest first. GitHub stops
    /// handing out `next` links after roughly ten pages.
    Latest,
    /// A single page of runs created on or after the given date.
    CreatedOn(CreatedFilter),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunCaptureOutcome {
    /// Run ids persisted by this invocation, in upstream order.
    pub captured: Vec<u64>,
    /// Runs that were already on disk (or belonged to another workflow).
    pub skipped: usize,
}

/// Captures completed pull-request runs of `target` into `store`.
///
/// Any upstream failure aborts the invocation; runs written before it stay
/// on disk and are skipped by the next invocation.
pub async fn capture_runs<T, A>(
    client: &RunsClient<T, A>,
    store: &EntityStore,
    target: &CaptureTarget,
    mode: RunMode,
) -> Result<RunCaptureOutcome, CaptureError>
where
    T: HttpTransport,
    A: AuthProvider,
{
    let created = match mode {
        RunMode::Latest => None,
        RunMode::CreatedOn(filter) => Some(filter.to_query()),
    };
    let query = RunsQuery::completed_pull_requests(&target.owner, &target.repo, target.workflow_id)
        .with_created(created);

    let mut outcome = RunCaptureOutcome::default();
    let mut page = match client.first_page(&query).await {
        Ok(page) => page,
        Err(source) => return Err(upstream(outcome, source)),
    };
    loop {
        let RunsPage { runs, next } = page;
        for run in runs {
            persist_run(store, target.workflow_id, run, &mut outcome).await;
        }

        let Some(next) = next else { break };
        if matches!(mode, RunMode::CreatedOn(_)) {
            debug!(next = %next, "created filter captures a single page");
            break;
        }
        page = match client.page_at(&next).await {
            Ok(page) => page,
            Err(source) => return Err(upstream(outcome, source)),
        };
    }

    info!(
        workflow_id = target.workflow_id,
        captured = outcome.captured.len(),
        skipped = outcome.skipped,
        "captured runs"
    );
    Ok(outcome)
}

async fn persist_run(
    store: &EntityStore,
    workflow_id: u64,
    run: RawRun,
    outcome: &mut RunCaptureOutcome,
) {
    let run_id = run.id;
    debug!(run_id, "processing run");

    if let Some(other) = run.workflow_id
        && other != workflow_id
    {
        warn!(run_id, workflow_id = other, "run belongs to another workflow");
        outcome.skipped += 1;
        return;
    }

    let exists = match store.exists(workflow_id, EntityKind::Run, run_id).await {
        Ok(exists) => exists,
        Err(err) => {
            warn!(run_id, error = %err, "failed to check for stored run");
            return;
        }
    };
    if exists {
        debug!(
            run_id,
            path = %store.path(workflow_id, EntityKind::Run, run_id).display(),
            "run already exists"
        );
        outcome.skipped += 1;
        return;
    }

    let payload = run.payload.get().as_bytes().to_vec();
    match store
        .write(workflow_id, EntityKind::Run, run_id, payload)
        .await
    {
        Ok(path) => {
            debug!(run_id, path = %path.display(), "stored run");
            outcome.captured.push(run_id);
        }
        Err(err) if err.is_already_exists() => {
            debug!(run_id, "run was stored concurrently");
            outcome.skipped += 1;
        }
        Err(err) => warn!(run_id, error = %err, "failed to save run"),
    }
}

fn upstream(outcome: RunCaptureOutcome, source: gham_github_api::ApiError) -> CaptureError {
    CaptureError::Upstream {
        captured: outcome.captured,
        source,
    }
}

//! Idempotent capture of workflow runs and their jobs into an
//! [`EntityStore`](gham_store::EntityStore).
//!
//! Re-running a capture after a partial failure is always safe: anything
//! already on disk is skipped, so repeated invocations converge.

mod created;
mod error;
mod jobs;
mod runs;

pub use crate::created::CreatedFilter;
pub use crate::error::CaptureError;
pub use crate::jobs::DEFAULT_JOB_CONCURRENCY;
pub use crate::jobs::JobCaptureSummary;
pub use crate::jobs::JobSelection;
pub use crate::jobs::capture_jobs;
pub use crate::runs::RunCaptureOutcome;
pub use crate::runs::RunMode;
pub use crate::runs::capture_runs;

/// The workflow whose history is being captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    pub owner: String,
    pub repo: String,
    pub workflow_id: u64,
}

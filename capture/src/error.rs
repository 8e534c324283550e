use gham_github_api::ApiError;
use gham_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid created filter {value:?}: expected a date in the form YYYY-MM-DD")]
    InvalidCreatedFilter { value: String },
    #[error("listing workflow runs failed after capturing {} new runs: {source}", captured.len())]
    Upstream {
        /// Runs persisted by this invocation before the failure.
        captured: Vec<u64>,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

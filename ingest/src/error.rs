use gham_client::TransportError;
use gham_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed payload in {}: {source}", path.display())]
    MalformedPayload {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("bulk request for index {index} failed: {source}")]
    Bulk {
        index: String,
        #[source]
        source: TransportError,
    },
    #[error("unexpected bulk response for index {index}: {message}")]
    BulkResponse { index: String, message: String },
}

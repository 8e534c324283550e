//! Streams the captured corpus into Elasticsearch.
//!
//! Three producers read the [`EntityStore`](gham_store::EntityStore) one file
//! at a time and yield run, job, and step documents. Run documents are
//! enriched with the [`TimingEnvelope`] of their jobs. Each document gets a
//! deterministic id so re-ingestion overwrites instead of duplicating.

mod documents;
mod elastic;
mod envelope;
mod error;
mod pipeline;

pub use crate::documents::Document;
pub use crate::documents::job_documents;
pub use crate::documents::run_documents;
pub use crate::documents::step_documents;
pub use crate::elastic::BulkResult;
pub use crate::elastic::DEFAULT_BATCH_SIZE;
pub use crate::elastic::ElasticClient;
pub use crate::envelope::EnvelopeEndpoint;
pub use crate::envelope::JobTiming;
pub use crate::envelope::TimingEnvelope;
pub use crate::envelope::aggregate;
pub use crate::error::IngestError;
pub use crate::pipeline::IndexTarget;
pub use crate::pipeline::ingest;
pub use crate::pipeline::ingest_all;

use crate::documents::Document;
use crate::documents::job_documents;
use crate::documents::run_documents;
use crate::documents::step_documents;
use crate::elastic::BulkResult;
use crate::elastic::ElasticClient;
use crate::error::IngestError;
use gham_client::HttpTransport;
use gham_store::EntityStore;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexTarget {
    Runs,
    Jobs,
    Steps,
}

impl IndexTarget {
    /// Ingestion order for `index all`.
    pub const ALL: [IndexTarget; 3] = [IndexTarget::Runs, IndexTarget::Jobs, IndexTarget::Steps];

    pub fn index_name(self) -> &'static str {
        match self {
            IndexTarget::Runs => "runs",
            IndexTarget::Jobs => "jobs",
            IndexTarget::Steps => "steps",
        }
    }

    /// Runs and jobs are keyed by their GitHub id; steps by
    /// `<job_id>-<step number>`.
    pub fn document_id(self, document: &Document) -> Option<String> {
        match self {
            IndexTarget::Runs | IndexTarget::Jobs => id_component(document.get("id")?),
            IndexTarget::Steps => {
                let job_id = id_component(document.get("job_id")?)?;
                let number = id_component(document.get("number")?)?;
                Some(format!("{job_id}-{number}"))
            }
        }
    }
}

impl std::fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.index_name())
    }
}

fn id_component(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => number.as_u64().map(|n| n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Streams one kind of stored entity for `workflow_id` into its index.
pub async fn ingest<T: HttpTransport>(
    client: &ElasticClient<T>,
    store: &EntityStore,
    workflow_id: u64,
    target: IndexTarget,
) -> Result<BulkResult, IngestError> {
    let index = target.index_name();
    let id_for = |document: &Document| target.document_id(document);
    let result = match target {
        IndexTarget::Runs => {
            client
                .bulk_index(index, run_documents(store, workflow_id), id_for)
                .await?
        }
        IndexTarget::Jobs => {
            client
                .bulk_index(index, job_documents(store, workflow_id), id_for)
                .await?
        }
        IndexTarget::Steps => {
            client
                .bulk_index(index, step_documents(store, workflow_id), id_for)
                .await?
        }
    };
    info!(
        index,
        workflow_id,
        total = result.total,
        indexed = result.indexed,
        failed = result.failed,
        "indexed documents"
    );
    Ok(result)
}

/// Runs, then jobs, then steps. Stops at the first target that fails
/// outright; `on_result` has already seen every target that completed.
pub async fn ingest_all<T, F>(
    client: &ElasticClient<T>,
    store: &EntityStore,
    workflow_id: u64,
    mut on_result: F,
) -> Result<Vec<(IndexTarget, BulkResult)>, IngestError>
where
    T: HttpTransport,
    F: FnMut(IndexTarget, BulkResult),
{
    let mut results = Vec::with_capacity(IndexTarget::ALL.len());
    for target in IndexTarget::ALL {
        let result = ingest(client, store, workflow_id, target).await?;
        on_result(target, result);
        results.push((target, result));
    }
    Ok(results)
}

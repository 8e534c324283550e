use crate::envelope::JobTiming;
use crate::envelope::aggregate;
use crate::error::IngestError;
use futures::Stream;
use futures::StreamExt;
use gham_store::EntityKind;
use gham_store::EntityStore;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use tracing::warn;

/// A JSON object ready to be indexed.
pub type Document = Map<String, Value>;

#[derive(Deserialize)]
struct JobsFile<J> {
    #[serde(default = "Vec::new")]
    jobs: Vec<J>,
}

/// Stored runs, each merged with the timing envelope of its jobs.
///
/// Runs whose job list is missing or unreadable are logged and skipped.
pub fn run_documents(
    store: &EntityStore,
    workflow_id: u64,
) -> impl Stream<Item = Document> + Send + 'static {
    let store = store.clone();
    async_stream::stream! {
        let ids = store.list(workflow_id, EntityKind::Run);
        futures::pin_mut!(ids);
        while let Some(run_id) = ids.next().await {
            let Some(run_id) = log_list_error(run_id, "runs") else {
                continue;
            };
            match load_run_document(&store, workflow_id, run_id).await {
                Ok(document) => yield document,
                Err(err) => warn!(workflow_id, run_id, error = %err, "skipping run"),
            }
        }
    }
}

/// Every job of every stored job list, verbatim.
pub fn job_documents(
    store: &EntityStore,
    workflow_id: u64,
) -> impl Stream<Item = Document> + Send + 'static {
    let store = store.clone();
    async_stream::stream! {
        let ids = store.list(workflow_id, EntityKind::Jobs);
        futures::pin_mut!(ids);
        while let Some(run_id) = ids.next().await {
            let Some(run_id) = log_list_error(run_id, "jobs") else {
                continue;
            };
            match load_jobs::<Document>(&store, workflow_id, run_id).await {
                Ok(jobs) => {
                    for job in jobs {
                        yield job;
                    }
                }
                Err(err) => warn!(workflow_id, run_id, error = %err, "skipping job list"),
            }
        }
    }
}

/// Every step of every stored job, annotated with its job and run context.
pub fn step_documents(
    store: &EntityStore,
    workflow_id: u64,
) -> impl Stream<Item = Document> + Send + 'static {
    let store = store.clone();
    async_stream::stream! {
        let ids = store.list(workflow_id, EntityKind::Jobs);
        futures::pin_mut!(ids);
        while let Some(run_id) = ids.next().await {
            let Some(run_id) = log_list_error(run_id, "jobs") else {
                continue;
            };
            match load_jobs::<Document>(&store, workflow_id, run_id).await {
                Ok(jobs) => {
                    for job in &jobs {
                        for step in steps_of(job) {
                            yield step;
                        }
                    }
                }
                Err(err) => warn!(workflow_id, run_id, error = %err, "skipping job list"),
            }
        }
    }
}

fn log_list_error<E: std::fmt::Display>(id: Result<u64, E>, kind: &str) -> Option<u64> {
    match id {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(kind, error = %err, "failed to list stored entities");
            None
        }
    }
}

async fn load_run_document(
    store: &EntityStore,
    workflow_id: u64,
    run_id: u64,
) -> Result<Document, IngestError> {
    let mut run: Document = load(store, workflow_id, EntityKind::Run, run_id).await?;
    let jobs = load_jobs::<JobTiming>(store, workflow_id, run_id).await?;
    run.extend(aggregate(&jobs).into_fields());
    Ok(run)
}

async fn load_jobs<J: DeserializeOwned>(
    store: &EntityStore,
    workflow_id: u64,
    run_id: u64,
) -> Result<Vec<J>, IngestError> {
    let file: JobsFile<J> = load(store, workflow_id, EntityKind::Jobs, run_id).await?;
    Ok(file.jobs)
}

async fn load<T: DeserializeOwned>(
    store: &EntityStore,
    workflow_id: u64,
    kind: EntityKind,
    id: u64,
) -> Result<T, IngestError> {
    let bytes = store.read(workflow_id, kind, id).await?;
    serde_json::from_slice(&bytes).map_err(|source| IngestError::MalformedPayload {
        path: store.path(workflow_id, kind, id),
        source,
    })
}

const STEP_CONTEXT: [(&str, &str); 8] = [
    ("job_id", "id"),
    ("job_name", "name"),
    ("job_url", "url"),
    ("job_html_url", "html_url"),
    ("run_id", "run_id"),
    ("run_url", "run_url"),
    ("run_attempt", "run_attempt"),
    ("head_sha", "head_sha"),
];

fn steps_of(job: &Document) -> Vec<Document> {
    let Some(Value::Array(steps)) = job.get("steps") else {
        return Vec::new();
    };
    let run_html_url = job
        .get("html_url")
        .and_then(Value::as_str)
        .map(|url| Value::from(run_html_url(url)))
        .unwrap_or(Value::Null);

    steps
        .iter()
        .filter_map(Value::as_object)
        .map(|step| {
            let mut document = step.clone();
            for (field, source) in STEP_CONTEXT {
                let value = job.get(source).cloned().unwrap_or(Value::Null);
                document.insert(field.to_string(), value);
            }
            document.insert("run_html_url".to_string(), run_html_url.clone());
            document
        })
        .collect()
}

/// `https://github.com/o/r/actions/runs/1/job/2` -> `https://github.com/o/r/actions/runs/1`.
///
/// URLs without a trailing `/job/<id>` segment are returned unchanged.
fn run_html_url(job_html_url: &str) -> &str {
    match job_html_url.rsplit_once("/job/") {
        Some((run, job_id))
            if !job_id.is_empty() && job_id.bytes().all(|b| b.is_ascii_digit()) =>
        {
            run
        }
        _ => job_html_url,
    }
}

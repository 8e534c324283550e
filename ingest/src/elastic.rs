use crate::documents::Document;
use crate::error::IngestError;
use base64::Engine;
use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use gham_client::HttpTransport;
use gham_client::Request;
use gham_client::RetryPolicy;
use gham_client::run_with_retry;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use tracing::warn;

pub const DEFAULT_BATCH_SIZE: usize = 500;

const NDJSON: &str = "application/x-ndjson";

/// Outcome of streaming documents into one index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkResult {
    pub total: usize,
    pub indexed: usize,
    pub failed: usize,
}

impl BulkResult {
    fn absorb(&mut self, other: BulkResult) {
        self.total += other.total;
        self.indexed += other.indexed;
        self.failed += other.failed;
    }
}

/// Bulk-API client for an Elasticsearch cluster.
pub struct ElasticClient<T: HttpTransport> {
    transport: T,
    base_url: String,
    headers: HeaderMap,
    batch_size: usize,
    request_timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl<T: HttpTransport> ElasticClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            request_timeout: None,
            retry: RetryPolicy::none(),
        }
    }

    /// Sends `Authorization: Basic ...` with every request. Credentials are
    /// only attached when a username is present.
    pub fn with_basic_auth(mut self, username: Option<&str>, password: Option<&str>) -> Self {
        let Some(username) = username.filter(|u| !u.is_empty()) else {
            return self;
        };
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{username}:{}", password.unwrap_or_default()));
        if let Ok(mut value) = HeaderValue::from_str(&format!("Basic {credentials}")) {
            value.set_sensitive(true);
            self.headers.insert(http::header::AUTHORIZATION, value);
        }
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Streams `documents` into `index`, `batch_size` documents per request.
    ///
    /// `id_for` supplies each document's `_id`; documents without one are
    /// counted as failed and never sent. Items rejected by the cluster are
    /// counted as failed. A request that fails outright aborts the call.
    pub async fn bulk_index<S, F>(
        &self,
        index: &str,
        documents: S,
        id_for: F,
    ) -> Result<BulkResult, IngestError>
    where
        S: Stream<Item = Document>,
        F: Fn(&Document) -> Option<String>,
    {
        let mut result = BulkResult::default();
        let mut batch = BulkBatch::default();
        futures::pin_mut!(documents);

        while let Some(document) = documents.next().await {
            let Some(id) = id_for(&document) else {
                warn!(index, "document has no id; not indexing");
                result.absorb(BulkResult {
                    total: 1,
                    indexed: 0,
                    failed: 1,
                });
                continue;
            };
            batch.push(index, &id, &document).map_err(|err| IngestError::BulkResponse {
                index: index.to_string(),
                message: err.to_string(),
            })?;
            if batch.len() >= self.batch_size {
                result.absorb(self.flush_logging_partial(index, &mut batch, result).await?);
            }
        }
        if !batch.is_empty() {
            result.absorb(self.flush_logging_partial(index, &mut batch, result).await?);
        }
        Ok(result)
    }

    async fn flush_logging_partial(
        &self,
        index: &str,
        batch: &mut BulkBatch,
        so_far: BulkResult,
    ) -> Result<BulkResult, IngestError> {
        self.flush(index, batch).await.inspect_err(|err| {
            warn!(
                index,
                total = so_far.total,
                indexed = so_far.indexed,
                failed = so_far.failed,
                error = %err,
                "bulk ingestion aborted"
            );
        })
    }

    async fn flush(&self, index: &str, batch: &mut BulkBatch) -> Result<BulkResult, IngestError> {
        let sent = batch.len();
        let body = batch.take();
        let url = format!("{}/_bulk", self.base_url);
        debug!(index, documents = sent, bytes = body.len(), "sending bulk request");

        let make_request = || {
            let mut req = Request::new(Method::POST, url.clone())
                .with_body(body.clone(), NDJSON)
                .with_timeout(self.request_timeout);
            req.headers.extend(self.headers.clone());
            req
        };
        let response = run_with_retry(self.retry, make_request, |req| {
            self.transport.execute(req)
        })
        .await
        .map_err(|source| IngestError::Bulk {
            index: index.to_string(),
            source,
        })?;

        let parsed: BulkResponse =
            serde_json::from_slice(&response.body).map_err(|err| IngestError::BulkResponse {
                index: index.to_string(),
                message: err.to_string(),
            })?;
        let failed = parsed.failures(index);
        Ok(BulkResult {
            total: sent,
            indexed: sent.saturating_sub(failed),
            failed,
        })
    }
}

#[derive(Default)]
struct BulkBatch {
    body: Vec<u8>,
    documents: usize,
}

#[derive(Serialize)]
struct IndexAction<'a> {
    index: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
}

impl BulkBatch {
    fn push(&mut self, index: &str, id: &str, document: &Document) -> serde_json::Result<()> {
        let action = IndexAction {
            index: ActionMeta { index, id },
        };
        serde_json::to_writer(&mut self.body, &action)?;
        self.body.push(b'\n');
        serde_json::to_writer(&mut self.body, document)?;
        self.body.push(b'\n');
        self.documents += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.documents
    }

    fn is_empty(&self) -> bool {
        self.documents == 0
    }

    fn take(&mut self) -> Bytes {
        self.documents = 0;
        Bytes::from(std::mem::take(&mut self.body))
    }
}

#[derive(Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Deserialize)]
struct BulkItem {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl BulkResponse {
    fn failures(&self, index: &str) -> usize {
        if !self.errors {
            return 0;
        }
        self.items
            .iter()
            .flat_map(HashMap::values)
            .filter(|item| item.error.is_some() || item.status >= 300)
            .inspect(|item| {
                warn!(
                    index,
                    id = item.id.as_deref().unwrap_or_default(),
                    status = item.status,
                    error = ?item.error,
                    "document rejected"
                );
            })
            .count()
    }
}

use crate::auth::AuthProvider;
use crate::endpoint::session::EndpointSession;
use crate::error::ApiError;
use crate::pagination::next_page_url;
use crate::provider::Provider;
use crate::rate_limits::RateLimitGate;
use bytes::Bytes;
use gham_client::HttpTransport;
use serde::Deserialize;
use serde::Serialize;
use serde_json::value::RawValue;
use std::sync::Arc;

pub const JOBS_PER_PAGE: u32 = 100;

#[derive(Deserialize)]
struct JobsEnvelope {
    #[serde(default)]
    total_count: Option<u64>,
    jobs: Vec<Box<RawValue>>,
}

#[derive(Serialize)]
struct MergedJobs {
    total_count: u64,
    jobs: Vec<Box<RawValue>>,
}

pub struct JobsClient<T: HttpTransport, A: AuthProvider> {
    session: EndpointSession<T, A>,
}

impl<T: HttpTransport, A: AuthProvider> JobsClient<T, A> {
    pub fn new(transport: T, provider: Provider, auth: A, rate_limits: Arc<RateLimitGate>) -> Self {
        Self {
            session: EndpointSession::new(transport, provider, auth, rate_limits),
        }
    }

    /// Fetches every job (with nested steps) of the latest attempt of a run.
    ///
    /// A single-page answer is returned byte for byte. When the run spans
    /// several pages the job arrays are concatenated into one
    /// `{"total_count": N, "jobs": [...]}` document, each job object kept
    /// verbatim.
    pub async fn list_jobs(&self, owner: &str, repo: &str, run_id: u64) -> Result<Bytes, ApiError> {
        let path = format!("repos/{owner}/{repo}/actions/runs/{run_id}/jobs");
        let query = [
            ("per_page", JOBS_PER_PAGE.to_string()),
            ("filter", "latest".to_string()),
        ];
        let url = self.session.provider().url_for_path(&path);

        let first = self.session.get(&path, &query).await?;
        let mut next = next_page_url(&first.headers);
        if next.is_none() {
            decode(&url, &first.body)?;
            return Ok(first.body);
        }

        let JobsEnvelope {
            total_count,
            mut jobs,
        } = decode(&url, &first.body)?;
        while let Some(page_url) = next {
            let resp = self.session.get_url(&page_url).await?;
            next = next_page_url(&resp.headers);
            jobs.extend(decode(&page_url, &resp.body)?.jobs);
        }

        let merged = MergedJobs {
            total_count: total_count.unwrap_or(jobs.len() as u64),
            jobs,
        };
        serde_json::to_vec(&merged)
            .map(Bytes::from)
            .map_err(|err| ApiError::decode(&url, err))
    }
}

fn decode(url: &str, body: &[u8]) -> Result<JobsEnvelope, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::decode(url, err))
}

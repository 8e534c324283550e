use crate::auth::AuthProvider;
use crate::endpoint::session::EndpointSession;
use crate::error::ApiError;
use crate::pagination::next_page_url;
use crate::provider::Provider;
use crate::rate_limits::RateLimitGate;
use gham_client::HttpTransport;
use gham_client::Response;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::sync::Arc;

pub const RUNS_PER_PAGE: u32 = 100;

/// Filters for "list workflow runs".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunsQuery {
    pub owner: String,
    pub repo: String,
    pub workflow_id: u64,
    pub event: String,
    pub status: String,
    /// Raw value of the `created` search qualifier, e.g. `>=2021-10-12`.
    pub created: Option<String>,
    pub per_page: u32,
}

impl RunsQuery {
    /// Completed `pull_request` runs of one workflow, a full page at a time.
    pub fn completed_pull_requests(
        owner: impl Into<String>,
        repo: impl Into<String>,
        workflow_id: u64,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            workflow_id,
            event: "pull_request".to_string(),
            status: "completed".to_string(),
            created: None,
            per_page: RUNS_PER_PAGE,
        }
    }

    pub fn with_created(mut self, created: Option<String>) -> Self {
        self.created = created;
        self
    }

    fn path(&self) -> String {
        format!(
            "repos/{}/{}/actions/workflows/{}/runs",
            self.owner, self.repo, self.workflow_id
        )
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("event", self.event.clone()),
            ("status", self.status.clone()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(created) = &self.created {
            pairs.push(("created", created.clone()));
        }
        pairs
    }
}

/// One run exactly as the upstream returned it, plus the identifiers the
/// capture loop needs to key it.
#[derive(Debug)]
pub struct RawRun {
    pub id: u64,
    pub workflow_id: Option<u64>,
    pub payload: Box<RawValue>,
}

#[derive(Debug)]
pub struct RunsPage {
    pub runs: Vec<RawRun>,
    pub next: Option<String>,
}

#[derive(Deserialize)]
struct RunsEnvelope {
    workflow_runs: Vec<Box<RawValue>>,
}

#[derive(Deserialize)]
struct RunKeys {
    id: u64,
    #[serde(default)]
    workflow_id: Option<u64>,
}

pub struct RunsClient<T: HttpTransport, A: AuthProvider> {
    session: EndpointSession<T, A>,
}

impl<T: HttpTransport, A: AuthProvider> RunsClient<T, A> {
    pub fn new(transport: T, provider: Provider, auth: A, rate_limits: Arc<RateLimitGate>) -> Self {
        Self {
            session: EndpointSession::new(transport, provider, auth, rate_limits),
        }
    }

    pub async fn first_page(&self, query: &RunsQuery) -> Result<RunsPage, ApiError> {
        let path = query.path();
        let resp = self.session.get(&path, &query.query_pairs()).await?;
        decode_page(&self.session.provider().url_for_path(&path), resp)
    }

    /// Fetches the page behind a `next` link returned by a previous page.
    pub async fn page_at(&self, url: &str) -> Result<RunsPage, ApiError> {
        let resp = self.session.get_url(url).await?;
        decode_page(url, resp)
    }
}

fn decode_page(url: &str, resp: Response) -> Result<RunsPage, ApiError> {
    let next = next_page_url(&resp.headers);
    let envelope: RunsEnvelope =
        serde_json::from_slice(&resp.body).map_err(|err| ApiError::decode(url, err))?;
    let runs = envelope
        .workflow_runs
        .into_iter()
        .map(|payload| {
            let keys: RunKeys =
                serde_json::from_str(payload.get()).map_err(|err| ApiError::decode(url, err))?;
            Ok(RawRun {
                id: keys.id,
                workflow_id: keys.workflow_id,
                payload,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;
    Ok(RunsPage { runs, next })
}

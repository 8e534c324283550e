#![allow(dead_code)]

use gham_capture::CaptureTarget;
use gham_github_api::BearerAuth;
use gham_github_api::JobsClient;
use gham_github_api::Provider;
use gham_github_api::RateLimitGate;
use gham_github_api::ReqwestTransport;
use gham_github_api::RetryConfig;
use gham_github_api::RunsClient;
use gham_store::EntityStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const WORKFLOW_ID: u64 = 10954;

pub fn target() -> CaptureTarget {
    CaptureTarget {
        owner: "dhis2".to_string(),
        repo: "dhis2-core".to_string(),
        workflow_id: WORKFLOW_ID,
    }
}

pub fn provider(base_url: &str) -> Provider {
    Provider::github(base_url).with_retry(RetryConfig {
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
        retry_429: false,
        retry_5xx: false,
        retry_transport: false,
    })
}

pub fn runs_client(base_url: &str) -> RunsClient<ReqwestTransport, BearerAuth> {
    RunsClient::new(
        ReqwestTransport::new(reqwest::Client::new()),
        provider(base_url),
        BearerAuth::default(),
        Arc::new(RateLimitGate::default()),
    )
}

pub fn jobs_client(base_url: &str) -> JobsClient<ReqwestTransport, BearerAuth> {
    JobsClient::new(
        ReqwestTransport::new(reqwest::Client::new()),
        provider(base_url),
        BearerAuth::default(),
        Arc::new(RateLimitGate::default()),
    )
}

pub fn store() -> (TempDir, EntityStore) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let store = EntityStore::open(dir.path()).unwrap_or_else(|err| panic!("open store: {err}"));
    (dir, store)
}

pub fn runs_path() -> String {
    format!("/repos/dhis2/dhis2-core/actions/workflows/{WORKFLOW_ID}/runs")
}

pub fn jobs_path(run_id: u64) -> String {
    format!("/repos/dhis2/dhis2-core/actions/runs/{run_id}/jobs")
}

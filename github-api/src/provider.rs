use gham_client::Request;
use gham_client::RetryOn;
use gham_client::RetryPolicy;
use http::HeaderValue;
use http::Method;
use http::header::ACCEPT;
use http::header::HeaderMap;
use http::header::USER_AGENT;
use std::time::Duration;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// High-level retry configuration for a provider.
///
/// This is converted into a `RetryPolicy` used by `gham-client` to drive
/// transport-level retries.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u64,
    pub base_delay: Duration,
    pub retry_429: bool,
    pub retry_5xx: bool,
    pub retry_transport: bool,
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            retry_on: RetryOn {
                retry_429: self.retry_429,
                retry_5xx: self.retry_5xx,
                retry_transport: self.retry_transport,
            },
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            retry_429: true,
            retry_5xx: true,
            retry_transport: true,
        }
    }
}

/// HTTP endpoint configuration for a GitHub API deployment (github.com or
/// a GitHub Enterprise `/api/v3` root).
#[derive(Debug, Clone)]
pub struct Provider {
    pub base_url: String,
    pub headers: HeaderMap,
    pub retry: RetryConfig,
    pub request_timeout: Option<Duration>,
}

impl Provider {
    pub fn github(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gham"));
        Self {
            base_url: base_url.into(),
            headers,
            retry: RetryConfig::default(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn url_for_path(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    pub fn build_request(&self, method: Method, path: &str) -> Request {
        self.build_request_for_url(method, self.url_for_path(path))
    }

    /// Builds a request against an absolute URL, e.g. one taken from a
    /// `Link` header.
    pub fn build_request_for_url(&self, method: Method, url: String) -> Request {
        let mut req = Request::new(method, url).with_timeout(self.request_timeout);
        req.headers.extend(self.headers.clone());
        req
    }
}

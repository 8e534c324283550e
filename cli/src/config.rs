use anyhow::Context;
use gham_github_api::GITHUB_API_URL;
use gham_github_api::RetryConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables loaded from `--config`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GhamConfig {
    pub github: GithubConfig,
    pub elasticsearch: ElasticsearchConfig,
    /// Upper bound on the whole invocation.
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u64,
    pub retry_base_delay_ms: u64,
    /// Requests wait for the rate-limit reset once the remaining quota is
    /// at or below this.
    pub min_remaining: u64,
    pub job_concurrency: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            request_timeout_secs: 30,
            max_attempts: 3,
            retry_base_delay_ms: 500,
            min_remaining: 10,
            job_concurrency: gham_capture::DEFAULT_JOB_CONCURRENCY,
        }
    }
}

impl GithubConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            retry_429: true,
            retry_5xx: true,
            retry_transport: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElasticsearchConfig {
    pub batch_size: usize,
    pub request_timeout_secs: u64,
    pub max_attempts: u64,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            batch_size: gham_ingest::DEFAULT_BATCH_SIZE,
            request_timeout_secs: 60,
            max_attempts: 3,
        }
    }
}

impl ElasticsearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl GhamConfig {
    /// Reads `path`, or returns the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

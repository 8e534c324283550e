use crate::config::GithubConfig;
use anyhow::Context;
use gham_github_api::AuthProvider;
use gham_github_api::BearerAuth;
use gham_github_api::JobsClient;
use gham_github_api::Provider;
use gham_github_api::RateLimitGate;
use gham_github_api::ReqwestTransport;
use gham_github_api::RunsClient;
use std::sync::Arc;

const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Everything the runs and jobs clients share, including one rate-limit gate.
pub(crate) struct GithubClients {
    transport: ReqwestTransport,
    provider: Provider,
    auth: BearerAuth,
    rate_limits: Arc<RateLimitGate>,
}

impl GithubClients {
    pub(crate) fn from_config(config: &GithubConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        let auth = BearerAuth::new(std::env::var(TOKEN_ENV_VAR).ok());
        if auth.bearer_token().is_none() {
            tracing::warn!("{TOKEN_ENV_VAR} is not set; requests are unauthenticated");
        }
        Ok(Self {
            transport: ReqwestTransport::new(client),
            provider: Provider::github(&config.api_url)
                .with_retry(config.retry())
                .with_request_timeout(Some(config.request_timeout())),
            auth,
            rate_limits: Arc::new(RateLimitGate::new(config.min_remaining)),
        })
    }

    pub(crate) fn runs(&self) -> RunsClient<ReqwestTransport, BearerAuth> {
        RunsClient::new(
            self.transport.clone(),
            self.provider.clone(),
            self.auth.clone(),
            Arc::clone(&self.rate_limits),
        )
    }

    pub(crate) fn jobs(&self) -> JobsClient<ReqwestTransport, BearerAuth> {
        JobsClient::new(
            self.transport.clone(),
            self.provider.clone(),
            self.auth.clone(),
            Arc::clone(&self.rate_limits),
        )
    }
}

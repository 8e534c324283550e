use crate::auth::AuthProvider;
use crate::auth::add_auth_headers;
use crate::error::ApiError;
use crate::provider::Provider;
use crate::rate_limits::RateLimitGate;
use crate::rate_limits::parse_rate_limit;
use gham_client::HttpTransport;
use gham_client::Request;
use gham_client::Response;
use gham_client::TransportError;
use gham_client::run_with_retry;
use http::HeaderMap;
use http::Method;
use std::sync::Arc;

pub(crate) struct EndpointSession<T: HttpTransport, A: AuthProvider> {
    transport: T,
    provider: Provider,
    auth: A,
    rate_limits: Arc<RateLimitGate>,
}

impl<T: HttpTransport, A: AuthProvider> EndpointSession<T, A> {
    pub(crate) fn new(
        transport: T,
        provider: Provider,
        auth: A,
        rate_limits: Arc<RateLimitGate>,
    ) -> Self {
        Self {
            transport,
            provider,
            auth,
            rate_limits,
        }
    }

    pub(crate) fn provider(&self) -> &Provider {
        &self.provider
    }

    pub(crate) async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response, ApiError> {
        let make_request = || {
            let req = self
                .provider
                .build_request(Method::GET, path)
                .with_query(query);
            add_auth_headers(&self.auth, req)
        };
        self.execute(make_request).await
    }

    /// GETs an absolute URL as handed out by a `Link` header.
    pub(crate) async fn get_url(&self, url: &str) -> Result<Response, ApiError> {
        let make_request = || {
            let req = self
                .provider
                .build_request_for_url(Method::GET, url.to_string());
            add_auth_headers(&self.auth, req)
        };
        self.execute(make_request).await
    }

    async fn execute<M>(&self, make_request: M) -> Result<Response, ApiError>
    where
        M: FnMut() -> Request,
    {
        let response = run_with_retry(self.provider.retry.to_policy(), make_request, |req| {
            self.send_observed(req)
        })
        .await?;
        Ok(response)
    }

    async fn send_observed(&self, req: Request) -> Result<Response, TransportError> {
        self.rate_limits.wait().await;

        let method = req.method.clone();
        let url = req.url.clone();
        let result = self.transport.execute(req).await;
        let (status, headers) = match &result {
            Ok(resp) => (Some(resp.status), Some(&resp.headers)),
            Err(err) => (err.status(), err.headers()),
        };
        self.observe(&method, &url, status, headers);
        result
    }

    fn observe(
        &self,
        method: &Method,
        url: &str,
        status: Option<http::StatusCode>,
        headers: Option<&HeaderMap>,
    ) {
        let snapshot = headers.and_then(parse_rate_limit);
        if let Some(snapshot) = snapshot {
            self.rate_limits.observe(snapshot);
        }
        tracing::info!(
            method = %method,
            url,
            status = status.map(|s| s.as_u16()),
            ratelimit_used = snapshot.map(|s| s.used),
            ratelimit_limit = snapshot.map(|s| s.limit),
            ratelimit_remaining = snapshot.map(|s| s.remaining),
            "requested"
        );
    }
}

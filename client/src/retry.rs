use crate::error::TransportError;
use crate::request::Request;
use crate::request::Response;
use http::StatusCode;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOn {
    pub retry_429: bool,
    pub retry_5xx: bool,
    pub retry_transport: bool,
}

impl RetryOn {
    fn should_retry(&self, err: &TransportError) -> bool {
        match err {
            TransportError::Http { status, .. } => {
                (self.retry_429 && *status == StatusCode::TOO_MANY_REQUESTS)
                    || (self.retry_5xx && status.is_server_error())
            }
            TransportError::Timeout | TransportError::Network(_) => self.retry_transport,
            TransportError::RetryLimit | TransportError::Build(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u64,
    pub base_delay: Duration,
    pub retry_on: RetryOn,
}

impl RetryPolicy {
    /// A policy that issues the request exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            retry_on: RetryOn {
                retry_429: false,
                retry_5xx: false,
                retry_transport: false,
            },
        }
    }
}

/// Exponential backoff with +/-10% jitter. `attempt` is 1-based.
pub fn backoff(base: Duration, attempt: u64) -> Duration {
    if attempt == 0 {
        return base;
    }
    let exp = 2u64.saturating_pow(attempt.saturating_sub(1) as u32);
    let millis = base.as_millis() as u64;
    let raw = millis.saturating_mul(exp);
    let jitter: f64 = rand::rng().random_range(0.9..1.1);
    Duration::from_millis((raw as f64 * jitter) as u64)
}

/// Runs `op` with a fresh request from `make_req` until it succeeds, the
/// error is not retryable, or `policy.max_attempts` is exhausted. The last
/// error is returned as-is.
pub async fn run_with_retry<M, F, Fut>(
    policy: RetryPolicy,
    mut make_req: M,
    op: F,
) -> Result<Response, TransportError>
where
    M: FnMut() -> Request,
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Result<Response, TransportError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        let req = make_req();
        match op(req).await {
            Ok(resp) => return Ok(resp),
            Err(err) if attempt < max_attempts && policy.retry_on.should_retry(&err) => {
                let delay = backoff(policy.base_delay, attempt);
                tracing::warn!(attempt, ?delay, error = %err, "retrying request");
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
    Err(TransportError::RetryLimit)
}

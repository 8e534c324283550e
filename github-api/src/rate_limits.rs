use chrono::DateTime;
use chrono::Utc;
use http::HeaderMap;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

/// Quota state reported by the `X-RateLimit-*` response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: u64,
    pub remaining: u64,
    pub used: u64,
    pub reset_at: Option<DateTime<Utc>>,
}

/// Parses the `X-RateLimit-*` header family. Returns `None` when the limit or
/// remaining count is missing, which is the case for some error responses.
pub fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimitSnapshot> {
    let limit = parse_header_u64(headers, "x-ratelimit-limit")?;
    let remaining = parse_header_u64(headers, "x-ratelimit-remaining")?;
    let used = parse_header_u64(headers, "x-ratelimit-used")
        .unwrap_or_else(|| limit.saturating_sub(remaining));
    let reset_at = parse_header_u64(headers, "x-ratelimit-reset")
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    Some(RateLimitSnapshot {
        limit,
        remaining,
        used,
        reset_at,
    })
}

fn parse_header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Holds back request issuance once the observed remaining quota drops to
/// `min_remaining`, until the quota window resets.
#[derive(Debug)]
pub struct RateLimitGate {
    min_remaining: u64,
    last: Mutex<Option<RateLimitSnapshot>>,
}

impl RateLimitGate {
    pub fn new(min_remaining: u64) -> Self {
        Self {
            min_remaining,
            last: Mutex::new(None),
        }
    }

    pub fn observe(&self, snapshot: RateLimitSnapshot) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        *last = Some(snapshot);
    }

    pub fn last_snapshot(&self) -> Option<RateLimitSnapshot> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// How long a request issued at `now` has to wait, if at all.
    pub fn delay_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let snapshot = self.last_snapshot()?;
        if snapshot.remaining > self.min_remaining {
            return None;
        }
        let reset_at = snapshot.reset_at?;
        (reset_at - now).to_std().ok().filter(|d| !d.is_zero())
    }

    pub async fn wait(&self) {
        if let Some(delay) = self.delay_at(Utc::now()) {
            tracing::warn!(
                delay_secs = delay.as_secs(),
                min_remaining = self.min_remaining,
                "rate limit nearly exhausted, waiting for reset"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RateLimitGate {
    fn default() -> Self {
        Self::new(0)
    }
}

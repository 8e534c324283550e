//! Read-only client for the GitHub Actions REST API.
//!
//! Only the two operations the capture loop needs are exposed: listing the
//! runs of a workflow and listing the jobs of a run. Every response passes
//! through a shared [`RateLimitGate`] so that callers throttle themselves
//! once the upstream quota runs low.

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod pagination;
pub mod provider;
pub mod rate_limits;

pub use crate::auth::AuthProvider;
pub use crate::auth::BearerAuth;
pub use crate::endpoint::jobs::JobsClient;
pub use crate::endpoint::runs::RawRun;
pub use crate::endpoint::runs::RunsClient;
pub use crate::endpoint::runs::RunsPage;
pub use crate::endpoint::runs::RunsQuery;
pub use crate::error::ApiError;
pub use crate::provider::GITHUB_API_URL;
pub use crate::provider::Provider;
pub use crate::provider::RetryConfig;
pub use crate::rate_limits::RateLimitGate;
pub use crate::rate_limits::RateLimitSnapshot;
pub use gham_client::HttpTransport;
pub use gham_client::ReqwestTransport;

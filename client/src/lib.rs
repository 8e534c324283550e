//! HTTP transport shared by the GitHub and Elasticsearch clients: a
//! transport-agnostic request/response pair, the reqwest-backed
//! [`ReqwestTransport`], and retry with exponential backoff.

mod error;
mod request;
mod retry;
mod transport;

pub use crate::error::TransportError;
pub use crate::request::Request;
pub use crate::request::Response;
pub use crate::retry::RetryOn;
pub use crate::retry::RetryPolicy;
pub use crate::retry::backoff;
pub use crate::retry::run_with_retry;
pub use crate::transport::HttpTransport;
pub use crate::transport::ReqwestTransport;

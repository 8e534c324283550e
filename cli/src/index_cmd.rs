use crate::cli::IndexArgs;
use crate::cli::IndexKind;
use crate::config::GhamConfig;
use crate::open_store;
use crate::print_summary;
use anyhow::Context;
use gham_client::ReqwestTransport;
use gham_client::RetryOn;
use gham_client::RetryPolicy;
use gham_ingest::BulkResult;
use gham_ingest::ElasticClient;
use gham_ingest::IndexTarget;
use gham_ingest::ingest;
use gham_ingest::ingest_all;
use std::time::Duration;

const USER_ENV_VAR: &str = "ELASTICSEARCH_USER";
const PASSWORD_ENV_VAR: &str = "ELASTICSEARCH_PASSWORD";

pub(crate) async fn run_index(args: IndexArgs, config: &GhamConfig) -> anyhow::Result<()> {
    let username = required_env(USER_ENV_VAR)?;
    let password = required_env(PASSWORD_ENV_VAR)?;
    let store = open_store(&args.source)?;

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let client = ElasticClient::new(ReqwestTransport::new(http), args.url)
        .with_basic_auth(Some(username.as_str()), Some(password.as_str()))
        .with_batch_size(config.elasticsearch.batch_size)
        .with_request_timeout(Some(config.elasticsearch.request_timeout()))
        .with_retry(bulk_retry_policy(config));

    let target = match args.kind {
        IndexKind::Runs => IndexTarget::Runs,
        IndexKind::Jobs => IndexTarget::Jobs,
        IndexKind::Steps => IndexTarget::Steps,
        IndexKind::All => {
            ingest_all(&client, &store, args.workflow_id, print_bulk_result).await?;
            return Ok(());
        }
    };
    let result = ingest(&client, &store, args.workflow_id, target).await?;
    print_bulk_result(target, result);
    Ok(())
}

fn required_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .with_context(|| format!("{name} must be set to index into Elasticsearch"))
}

/// Only throttling and server errors are retried; a bulk body that failed
/// mid-transfer may already be partially applied.
fn bulk_retry_policy(config: &GhamConfig) -> RetryPolicy {
    RetryPolicy {
        max_attempts: config.elasticsearch.max_attempts,
        base_delay: Duration::from_millis(config.github.retry_base_delay_ms),
        retry_on: RetryOn {
            retry_429: true,
            retry_5xx: true,
            retry_transport: false,
        },
    }
}

fn print_bulk_result(target: IndexTarget, result: BulkResult) {
    print_summary(&format!(
        "{target}: {} documents, {} indexed, {} failed",
        result.total, result.indexed, result.failed
    ));
}

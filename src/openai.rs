//! OpenAI and Azure OpenAI client construction with request timeouts.

use crate::error::{BuddyError, Result};
use async_openai::config::{AzureConfig, Config, OpenAIConfig};
use async_openai::Client;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

/// Default timeout for completion and embedding API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI-compatible client for the given API base and key.
pub fn create_client(
    api_base: Option<&str>,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }
    with_timeout(config, timeout)
}

/// Create an Azure OpenAI client bound to one deployment.
pub fn create_azure_client(
    endpoint: &str,
    api_key: &str,
    deployment: &str,
    api_version: &str,
    timeout: Duration,
) -> Result<Client<AzureConfig>> {
    let config = AzureConfig::new()
        .with_api_base(endpoint)
        .with_api_key(api_key)
        .with_deployment_id(deployment)
        .with_api_version(api_version);
    with_timeout(config, timeout)
}

fn with_timeout<C: Config>(config: C, timeout: Duration) -> Result<Client<C>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BuddyError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

/// Backoff policy that gives up on the first failure, rate limits included.
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

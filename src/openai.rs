//! OpenAI client configuration.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;
use tracing::warn;

/// Default timeout for OpenAI API requests. Vision calls with several
/// images can take well over a minute.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with the default timeout.
///
/// The API key is read from `OPENAI_API_KEY` when a request is made, so
/// building a client never fails for lack of credentials.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to an HTTP client without timeout: {}", e);
            reqwest::Client::new()
        });

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}

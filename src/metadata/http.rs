//! Shared HTTP plumbing for metadata providers.
//!
//! One [`reqwest::Client`] (and its connection pool) is built at startup and
//! cloned into every provider. [`fetch_json`] is the single place where a
//! provider request turns into either a parsed payload or absence.

use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;

const USER_AGENT: &str = concat!("anistream/", env!("CARGO_PKG_VERSION"));

/// Build the shared client used by every metadata provider.
pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build metadata HTTP client")
}

/// Send `request` and decode a JSON body.
///
/// Transport errors, timeouts, non-success statuses and undecodable bodies
/// are all logged and returned as `None`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Option<T> {
    let resp = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            debug!(provider, error = %e, timeout = e.is_timeout(), "metadata request failed");
            return None;
        }
    };

    let status = resp.status();
    if !status.is_success() {
        debug!(provider, status = %status, "metadata provider returned error status");
        return None;
    }

    match resp.json::<T>().await {
        Ok(body) => Some(body),
        Err(e) => {
            debug!(provider, error = %e, "failed to decode metadata response");
            None
        }
    }
}

/// Join a configured base URL and an API path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

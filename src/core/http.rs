use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;

use crate::core::config::IndexerConfig;
use crate::core::error::{IndexError, IndexResult};

const APP_USER_AGENT: &str = concat!("modindex/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Shared client for every listing and raw-content request of a run.
/// The bearer credential rides along as a default header.
pub fn build_http_client(config: &IndexerConfig) -> IndexResult<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
        .map_err(|_| IndexError::Config("token contains invalid header characters".into()))?;
    bearer.set_sensitive(true);
    default_headers.insert(AUTHORIZATION, bearer);

    let client = Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .timeout(config.request_timeout)
        .build()?;
    Ok(client)
}

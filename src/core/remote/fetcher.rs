use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::core::error::{IndexError, IndexResult};
use crate::core::model::ModRecord;

/// Retrieves one mod document from its raw-content location.
///
/// Holds no state beyond the shared client, so any number of fetches may run
/// at once; the caller decides how many.
#[derive(Clone)]
pub struct ModFetcher {
    client: Client,
}

impl ModFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_mod(&self, location: &str) -> IndexResult<ModRecord> {
        let failed = |reason: String| IndexError::FetchFailed {
            url: location.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status)));
        }

        let body = resp.bytes().await.map_err(|e| failed(e.to_string()))?;
        let record = parse_mod(location, &body)?;

        debug!("Fetched mod '{}' from {}", record.name, location);
        Ok(record)
    }
}

/// Parse a raw mod document.
pub fn parse_mod(location: &str, body: &[u8]) -> IndexResult<ModRecord> {
    let parse_failed = |reason: String| IndexError::ParseFailed {
        url: location.to_string(),
        reason,
    };

    let value: Value = serde_json::from_slice(body).map_err(|e| parse_failed(e.to_string()))?;
    ModRecord::from_value(value).map_err(parse_failed)
}

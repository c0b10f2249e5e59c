// ─── Directory Listing ───
// Reads GitHub "contents" listings for the mods root and each version folder.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::core::error::{IndexError, IndexResult};

/// Kind of a listed entry. GitHub also reports `symlink` and `submodule`;
/// those and anything unknown land in `Other` and are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    #[serde(other)]
    Other,
}

/// A single entry of a directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// API location of this entry; for a directory, its own listing.
    pub url: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// A file whose name ends in `.json`.
    pub fn is_json_file(&self) -> bool {
        self.kind == EntryKind::File && self.name.ends_with(".json")
    }
}

/// Lists remote directories. Attaches nothing itself: the credential is a
/// default header of the shared client.
#[derive(Clone)]
pub struct DirectoryClient {
    client: Client,
}

impl DirectoryClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// List the entries at `location`. No retry.
    pub async fn list_entries(&self, location: &str) -> IndexResult<Vec<DirectoryEntry>> {
        let unavailable = |reason: String| IndexError::DirectoryUnavailable {
            url: location.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let body = resp.text().await.map_err(|e| unavailable(e.to_string()))?;
        let entries = parse_listing(&body).map_err(unavailable)?;

        debug!("Listed {} entries at {}", entries.len(), location);
        Ok(entries)
    }
}

/// Parse a listing body. A single-object body (what GitHub returns for a
/// file path) or any other shape is rejected.
pub fn parse_listing(body: &str) -> Result<Vec<DirectoryEntry>, String> {
    serde_json::from_str::<Vec<DirectoryEntry>>(body)
        .map_err(|e| format!("response is not a directory listing: {}", e))
}

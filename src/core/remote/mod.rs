mod directory;
mod fetcher;

pub use directory::{parse_listing, DirectoryClient, DirectoryEntry, EntryKind};
pub use fetcher::{parse_mod, ModFetcher};

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::core::config::IndexerConfig;
use crate::core::error::{IndexError, IndexResult};
use crate::core::model::ModRecord;

/// Where the index builder gets its data from.
#[async_trait]
pub trait ModSource: Send + Sync {
    /// Listing location of the mods root.
    fn root_location(&self) -> String;

    /// Raw-content location of `<version>/<file_name>`.
    fn mod_location(&self, version: &str, file_name: &str) -> IndexResult<String>;

    async fn list_entries(&self, location: &str) -> IndexResult<Vec<DirectoryEntry>>;

    async fn fetch_mod(&self, location: &str) -> IndexResult<ModRecord>;
}

/// GitHub-backed source: contents API for listings, raw host for documents.
pub struct GithubSource {
    directory: DirectoryClient,
    fetcher: ModFetcher,
    root_url: String,
    raw_base: Url,
}

impl GithubSource {
    pub fn new(config: &IndexerConfig, client: Client) -> IndexResult<Self> {
        let raw = config.raw_mods_base();
        let raw_base = Url::parse(&raw)
            .map_err(|e| IndexError::Config(format!("invalid raw base '{}': {}", raw, e)))?;
        if raw_base.cannot_be_a_base() {
            return Err(IndexError::Config(format!("raw base '{}' cannot hold paths", raw)));
        }

        Ok(Self {
            directory: DirectoryClient::new(client.clone()),
            fetcher: ModFetcher::new(client),
            root_url: config.root_listing_url(),
            raw_base,
        })
    }
}

#[async_trait]
impl ModSource for GithubSource {
    fn root_location(&self) -> String {
        self.root_url.clone()
    }

    fn mod_location(&self, version: &str, file_name: &str) -> IndexResult<String> {
        raw_location(&self.raw_base, version, file_name)
    }

    async fn list_entries(&self, location: &str) -> IndexResult<Vec<DirectoryEntry>> {
        self.directory.list_entries(location).await
    }

    async fn fetch_mod(&self, location: &str) -> IndexResult<ModRecord> {
        self.fetcher.fetch_mod(location).await
    }
}

/// Append `version` and `file_name` as percent-encoded path segments.
fn raw_location(base: &Url, version: &str, file_name: &str) -> IndexResult<String> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| IndexError::Config(format!("raw base '{}' cannot hold paths", base)))?
        .pop_if_empty()
        .push(version)
        .push(file_name);
    Ok(url.into())
}

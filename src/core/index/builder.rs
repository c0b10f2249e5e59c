// ─── Index Builder ───
// Discovers version folders, fetches every mod document in them and
// assembles the ordered index.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::ordering::{sort_mods, FetchedMod};
use crate::core::cache::{now_millis, CacheStore};
use crate::core::config::IndexerConfig;
use crate::core::error::{IndexError, IndexResult};
use crate::core::model::{ModIndex, ModRecord, VersionKey};
use crate::core::remote::{DirectoryEntry, ModSource};

/// Counters for one build, logged at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub versions: usize,
    pub mods: usize,
    pub dropped_mods: usize,
    /// Versions whose own listing failed and are absent from the index.
    pub skipped_versions: Vec<VersionKey>,
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub index: ModIndex,
    /// `true` when the index came straight from a fresh cache snapshot.
    pub from_cache: bool,
    pub stats: BuildStats,
}

/// What one version contributed. `mods == None` means its listing failed.
struct VersionOutcome {
    version: VersionKey,
    mods: Option<Vec<ModRecord>>,
    dropped: usize,
}

pub struct IndexBuilder<'a, S: ModSource> {
    source: &'a S,
    cache: &'a CacheStore,
    cache_ttl: Duration,
    force_refresh: bool,
    fetch_concurrency: usize,
    version_concurrency: usize,
    /// Shared across versions: caps mod fetches in flight for the whole run.
    in_flight: Semaphore,
}

impl<'a, S: ModSource> IndexBuilder<'a, S> {
    pub fn new(source: &'a S, cache: &'a CacheStore, config: &IndexerConfig) -> Self {
        Self {
            source,
            cache,
            cache_ttl: config.cache_ttl,
            force_refresh: config.force_refresh,
            fetch_concurrency: config.fetch_concurrency.max(1),
            version_concurrency: config.version_concurrency.max(1),
            in_flight: Semaphore::new(config.max_in_flight.max(1)),
        }
    }

    /// Produce the index, from cache when fresh, otherwise from the remote.
    ///
    /// Only a failed root listing is an error. Per-version and per-mod
    /// failures are logged and leave a gap in the index.
    pub async fn build(&self) -> IndexResult<BuildOutcome> {
        if let Some(index) = self.fresh_cached_index().await {
            return Ok(BuildOutcome {
                stats: BuildStats {
                    versions: index.len(),
                    mods: index.values().map(Vec::len).sum(),
                    ..BuildStats::default()
                },
                index,
                from_cache: true,
            });
        }

        let root = self.source.root_location();
        info!("Fetching version folders from {}", root);

        let versions: Vec<DirectoryEntry> = self
            .source
            .list_entries(&root)
            .await?
            .into_iter()
            .filter(DirectoryEntry::is_dir)
            .collect();

        info!(
            "Found {} version folders, processing up to {} at a time",
            versions.len(),
            self.version_concurrency
        );

        let outcomes: Vec<VersionOutcome> = stream::iter(versions)
            .map(|dir| self.build_version(dir))
            .buffer_unordered(self.version_concurrency)
            .collect()
            .await;

        let mut index = ModIndex::new();
        let mut stats = BuildStats::default();
        for outcome in outcomes {
            stats.dropped_mods += outcome.dropped;
            match outcome.mods {
                Some(mods) => {
                    stats.mods += mods.len();
                    index.insert(outcome.version, mods);
                }
                None => stats.skipped_versions.push(outcome.version),
            }
        }
        stats.versions = index.len();
        stats.skipped_versions.sort();

        Ok(BuildOutcome {
            index,
            from_cache: false,
            stats,
        })
    }

    async fn fresh_cached_index(&self) -> Option<ModIndex> {
        if self.force_refresh {
            debug!("Cache bypassed by request");
            return None;
        }

        let snapshot = self.cache.read().await?;
        if snapshot.is_fresh(now_millis(), self.cache_ttl) {
            info!("Using cached index from {:?}", self.cache.path());
            Some(snapshot.data)
        } else {
            debug!(
                "Cache at {:?} is older than {:?}, rebuilding",
                self.cache.path(),
                self.cache_ttl
            );
            None
        }
    }

    async fn build_version(&self, dir: DirectoryEntry) -> VersionOutcome {
        let version = dir.name;
        info!("Processing version: {}", version);

        let entries = match self.source.list_entries(&dir.url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping version {}: {}", version, e);
                return VersionOutcome {
                    version,
                    mods: None,
                    dropped: 0,
                };
            }
        };

        let files: Vec<String> = entries
            .into_iter()
            .filter(DirectoryEntry::is_json_file)
            .map(|entry| entry.name)
            .collect();

        let results: Vec<(String, IndexResult<ModRecord>)> = stream::iter(files)
            .map(|file_name| {
                let version = &version;
                async move {
                    let result = self.fetch_one(version, &file_name).await;
                    (file_name, result)
                }
            })
            .buffer_unordered(self.fetch_concurrency)
            .collect()
            .await;

        let mut kept = Vec::with_capacity(results.len());
        let mut dropped = 0;
        for (file_name, result) in results {
            match result {
                Ok(record) => kept.push(FetchedMod { file_name, record }),
                Err(e) => {
                    warn!("  Failed to fetch mod {}/{}: {}", version, file_name, e);
                    dropped += 1;
                }
            }
        }

        VersionOutcome {
            version,
            mods: Some(sort_mods(kept)),
            dropped,
        }
    }

    async fn fetch_one(&self, version: &str, file_name: &str) -> IndexResult<ModRecord> {
        let location = self.source.mod_location(version, file_name)?;

        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|e| IndexError::FetchFailed {
                url: location.clone(),
                reason: e.to_string(),
            })?;

        let record = self.source.fetch_mod(&location).await?;
        debug!("  - Added mod: {}", record.name);
        Ok(record)
    }
}

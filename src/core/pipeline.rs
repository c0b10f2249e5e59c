use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::cache::CacheStore;
use crate::core::config::IndexerConfig;
use crate::core::error::IndexResult;
use crate::core::index::{BuildStats, IndexBuilder};
use crate::core::remote::ModSource;
use crate::core::writer::IndexWriter;

/// Summary of one generation run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub from_cache: bool,
    pub stats: BuildStats,
    pub index_path: PathBuf,
}

/// Build the index, write it out, then refresh the cache if it was rebuilt.
///
/// Fails only when the root listing is unavailable or the index file cannot
/// be written; in both cases the previous index file is left as it was.
pub async fn run<S: ModSource>(source: &S, config: &IndexerConfig) -> IndexResult<RunReport> {
    let cache = CacheStore::new(config.cache_path());
    let writer = IndexWriter::new(config.index_path());

    let outcome = IndexBuilder::new(source, &cache, config).build().await?;

    writer.write(&outcome.index).await?;

    if !outcome.from_cache {
        if let Err(e) = cache.write(&outcome.index).await {
            warn!("Index written but cache not refreshed: {}", e);
        }
    }

    let stats = outcome.stats;
    if stats.dropped_mods > 0 || !stats.skipped_versions.is_empty() {
        warn!(
            "Index generated with gaps: {} versions skipped ({}), {} mods dropped",
            stats.skipped_versions.len(),
            stats.skipped_versions.join(", "),
            stats.dropped_mods
        );
    }
    info!(
        "index.json generated: {} versions, {} mods{}",
        stats.versions,
        stats.mods,
        if outcome.from_cache { " (from cache)" } else { "" }
    );

    Ok(RunReport {
        from_cache: outcome.from_cache,
        stats,
        index_path: writer.path().to_path_buf(),
    })
}

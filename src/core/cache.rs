use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{IndexError, IndexResult};
use crate::core::fs::write_atomic;
use crate::core::model::ModIndex;

/// Last successfully built index plus when it was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub data: ModIndex,
}

impl CacheSnapshot {
    pub fn new(data: ModIndex) -> Self {
        Self {
            timestamp: now_millis(),
            data,
        }
    }

    /// Usable while `now - timestamp < ttl`.
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_millis.saturating_sub(self.timestamp) < ttl_millis
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// File-backed snapshot store. Staleness is judged by the caller on read;
/// nothing here expires or deletes entries on its own.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, if one is present and readable.
    ///
    /// A corrupt or unreadable file is logged and reported as absent.
    pub async fn read(&self) -> Option<CacheSnapshot> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache at {:?}", self.path);
                return None;
            }
            Err(e) => {
                warn!("Cannot read cache {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_slice::<CacheSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                let err = IndexError::CacheCorrupt {
                    path: self.path.clone(),
                    reason: e.to_string(),
                };
                warn!("{}; ignoring it", err);
                None
            }
        }
    }

    /// Replace the snapshot with `index`, stamped with the current time.
    pub async fn write(&self, index: &ModIndex) -> IndexResult<()> {
        let snapshot = CacheSnapshot::new(index.clone());
        let json = serde_json::to_vec_pretty(&snapshot)?;

        write_atomic(&self.path, &json)
            .await
            .map_err(|source| IndexError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;

        debug!("Saved index to cache: {:?}", self.path);
        Ok(())
    }

    /// Delete the cache file. Returns whether there was one.
    pub async fn clear(&self) -> IndexResult<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(IndexError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

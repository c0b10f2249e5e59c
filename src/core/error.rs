use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the index generator.
/// Every module returns `Result<T, IndexError>`.
#[derive(Debug, Error)]
pub enum IndexError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Remote listing ──────────────────────────────────
    #[error("Directory listing unavailable at {url}: {reason}")]
    DirectoryUnavailable { url: String, reason: String },

    // ── Mod documents ───────────────────────────────────
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Failed to parse mod document {url}: {reason}")]
    ParseFailed { url: String, reason: String },

    // ── Output / cache ──────────────────────────────────
    #[error("Failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cache file {path:?} is corrupt: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Configuration ───────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type IndexResult<T> = Result<T, IndexError>;

impl From<std::io::Error> for IndexError {
    fn from(source: std::io::Error) -> Self {
        IndexError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

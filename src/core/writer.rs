use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::error::{IndexError, IndexResult};
use crate::core::fs::write_atomic;
use crate::core::model::ModIndex;

/// Persists the index where the display layer reads it
/// (`<output_dir>/index.json`, pretty-printed, fully replaced each run).
pub struct IndexWriter {
    path: PathBuf,
}

impl IndexWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, index: &ModIndex) -> IndexResult<()> {
        let json = serde_json::to_vec_pretty(index)?;

        write_atomic(&self.path, &json)
            .await
            .map_err(|source| IndexError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;

        info!("Wrote {} versions to {:?}", index.len(), self.path);
        Ok(())
    }
}

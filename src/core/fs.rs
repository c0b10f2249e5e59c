use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Write `bytes` to `dest` so that readers see either the old file or the
/// complete new one.
///
/// Parent directories are created. The data goes to a uniquely named sibling
/// first and is renamed over `dest`; on failure the sibling is removed.
pub async fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_sibling(dest);
    let result = write_and_rename(&tmp, dest, bytes).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    result
}

async fn write_and_rename(tmp: &Path, dest: &Path, bytes: &[u8]) -> io::Result<()> {
    // Handle is dropped before the rename.
    {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
    }
    tokio::fs::rename(tmp, dest).await
}

fn temp_sibling(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_parents_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("deeper").join("out.json");

        write_atomic(&dest, b"first").await.unwrap();
        write_atomic(&dest, b"second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "second");
    }

    #[tokio::test]
    async fn leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.json");

        write_atomic(&dest, b"{}").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["out.json".to_string()]);
    }

    #[tokio::test]
    async fn fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        assert!(write_atomic(&blocker.join("out.json"), b"{}").await.is_err());
    }
}

//! Async filesystem helpers shared by the fadm tasks.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::RepositoryError;

/// Create a directory and all of its parents if missing.
pub async fn ensure_directory(path: &Path) -> Result<(), RepositoryError> {
  fs::create_dir_all(path)
    .await
    .map_err(|e| RepositoryError::CreateDirectory {
      path: path.to_path_buf(),
      source: e,
    })
}

/// Copy a file, overwriting the destination. Returns the number of bytes copied.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64, RepositoryError> {
  debug!(from = %from.display(), to = %to.display(), "copying file");
  fs::copy(from, to).await.map_err(|e| RepositoryError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source: e,
  })
}

/// Write `contents` to a file, replacing it if it exists.
pub async fn write_file(path: &Path, contents: &[u8]) -> Result<(), RepositoryError> {
  debug!(path = %path.display(), bytes = contents.len(), "writing file");
  fs::write(path, contents)
    .await
    .map_err(|e| RepositoryError::Write {
      path: path.to_path_buf(),
      source: e,
    })
}

/// Read a whole file.
pub async fn read_file(path: &Path) -> Result<Vec<u8>, RepositoryError> {
  fs::read(path).await.map_err(|e| RepositoryError::Read {
    path: path.to_path_buf(),
    source: e,
  })
}

/// Whether `path` exists and is a regular file. Unreadable paths count as missing.
pub async fn is_file(path: &Path) -> bool {
  fs::metadata(path)
    .await
    .map(|metadata| metadata.is_file())
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[tokio::test]
  async fn test_copy_overwrites_destination() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("a.dll");
    let to = temp.path().join("b.dll");
    std::fs::write(&from, b"new").unwrap();
    std::fs::write(&to, b"old contents").unwrap();

    let copied = copy_file(&from, &to).await.unwrap();

    assert_eq!(copied, 3);
    assert_eq!(std::fs::read(&to).unwrap(), b"new");
  }

  #[tokio::test]
  async fn test_copy_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    let result = copy_file(&temp.path().join("missing"), &temp.path().join("out")).await;
    assert!(matches!(result, Err(RepositoryError::Copy { .. })));
  }

  #[tokio::test]
  async fn test_is_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file.txt");
    std::fs::write(&file, b"x").unwrap();

    assert!(is_file(&file).await);
    assert!(!is_file(temp.path()).await);
    assert!(!is_file(&temp.path().join("missing")).await);
  }
}

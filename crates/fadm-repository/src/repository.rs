use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RepositoryError;
use crate::fs;

/// Canonical artifact file name, `{name}-{version}.{extension}`.
pub fn artifact_file_name(name: &str, version: &str, extension: &str) -> String {
  format!("{name}-{version}.{extension}")
}

/// Filesystem-based artifact repository.
#[derive(Debug, Clone)]
pub struct LocalRepository {
  root: PathBuf,
}

impl LocalRepository {
  /// Create a repository rooted at the given path. Nothing is created on disk.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the repository.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Directory holding every file of one artifact version.
  pub fn directory(&self, name: &str, version: &str) -> PathBuf {
    self.root.join(name).join(version)
  }

  /// Canonical path of an artifact file inside the repository.
  pub fn file_path(&self, name: &str, version: &str, extension: &str) -> PathBuf {
    self
      .directory(name, version)
      .join(artifact_file_name(name, version, extension))
  }

  pub async fn ensure_root(&self) -> Result<(), RepositoryError> {
    fs::ensure_directory(&self.root).await
  }

  /// Create the directory of an artifact version and return it.
  pub async fn ensure_directory(&self, name: &str, version: &str) -> Result<PathBuf, RepositoryError> {
    let directory = self.directory(name, version);
    fs::ensure_directory(&directory).await?;
    Ok(directory)
  }

  /// Whether the artifact file is present.
  pub async fn contains(&self, name: &str, version: &str, extension: &str) -> bool {
    fs::is_file(&self.file_path(name, version, extension)).await
  }

  /// Store artifact bytes at their canonical path, overwriting any previous
  /// copy. Returns the path written.
  pub async fn store(
    &self,
    name: &str,
    version: &str,
    extension: &str,
    contents: &[u8],
  ) -> Result<PathBuf, RepositoryError> {
    self.ensure_directory(name, version).await?;
    let path = self.file_path(name, version, extension);
    fs::write_file(&path, contents).await?;
    debug!(path = %path.display(), "stored artifact");
    Ok(path)
  }
}

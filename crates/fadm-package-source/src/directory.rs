use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::error::SourceError;
use crate::package::{INDEX_FILE, PackageIndex, PackageSource, RemotePackage, file_segments};

/// Package source backed by a directory with the `{name}/{version}/` layout.
///
/// When a package directory holds an `index.json` it lists the files, the
/// same way an HTTP source does. Otherwise every file under the package
/// directory is part of the package.
pub struct DirectoryPackageSource {
  root: PathBuf,
  location: String,
}

impl DirectoryPackageSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let location = root.display().to_string();
    Self { root, location }
  }

  fn package_dir(&self, name: &str, version: &str) -> PathBuf {
    self.root.join(name).join(version)
  }

  async fn read_index(path: &Path) -> Result<PackageIndex, SourceError> {
    let content = fs::read_to_string(path).await.map_err(|e| SourceError::Io {
      path: path.to_path_buf(),
      source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| SourceError::InvalidIndex {
      location: path.display().to_string(),
      message: e.to_string(),
    })
  }
}

#[async_trait]
impl PackageSource for DirectoryPackageSource {
  fn location(&self) -> &str {
    &self.location
  }

  async fn find_package(
    &self,
    name: &str,
    version: &str,
  ) -> Result<Option<RemotePackage>, SourceError> {
    let dir = self.package_dir(name, version);
    let is_dir = fs::metadata(&dir).await.is_ok_and(|m| m.is_dir());
    if !is_dir {
      debug!(dir = %dir.display(), "package not found");
      return Ok(None);
    }

    let index_path = dir.join(INDEX_FILE);
    let files = if fs::try_exists(&index_path).await.unwrap_or(false) {
      Self::read_index(&index_path).await?.files
    } else {
      let mut files = Vec::new();
      list_files(&dir, "", &mut files).await?;
      files.sort();
      files
    };

    Ok(Some(RemotePackage {
      name: name.to_string(),
      version: version.to_string(),
      files,
    }))
  }

  async fn fetch_file(&self, package: &RemotePackage, file: &str) -> Result<Bytes, SourceError> {
    let mut path = self.package_dir(&package.name, &package.version);
    path.extend(file_segments(file)?);
    debug!(path = %path.display(), "reading package file");

    let content = fs::read(&path).await.map_err(|e| SourceError::Io { path, source: e })?;
    Ok(Bytes::from(content))
  }
}

/// Recursively collect file paths under `dir`, relative and `/`-separated.
async fn list_files(dir: &Path, prefix: &str, files: &mut Vec<String>) -> Result<(), SourceError> {
  let io_error = |e| SourceError::Io {
    path: dir.to_path_buf(),
    source: e,
  };

  let mut entries = fs::read_dir(dir).await.map_err(io_error)?;
  while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
    let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
      continue;
    };
    let relative = format!("{prefix}{file_name}");

    if entry.file_type().await.map_err(io_error)?.is_dir() {
      Box::pin(list_files(&entry.path(), &format!("{relative}/"), files)).await?;
    } else {
      files.push(relative);
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[tokio::test]
  async fn test_lists_files_recursively() {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("Acme.Core/1.0.0.0");
    std::fs::create_dir_all(package.join("lib/net45")).unwrap();
    std::fs::write(package.join("lib/net45/Acme.Core.dll"), b"dll").unwrap();
    std::fs::write(package.join("readme.txt"), b"hi").unwrap();

    let source = DirectoryPackageSource::new(temp.path());
    let found = source.find_package("Acme.Core", "1.0.0.0").await.unwrap().unwrap();

    assert_eq!(found.files, ["lib/net45/Acme.Core.dll", "readme.txt"]);
  }

  #[tokio::test]
  async fn test_index_takes_precedence() {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("Acme.Core/1.0.0.0");
    std::fs::create_dir_all(&package).unwrap();
    std::fs::write(package.join(INDEX_FILE), r#"{"files": ["Acme.Core.dll"]}"#).unwrap();
    std::fs::write(package.join("other.bin"), b"x").unwrap();

    let source = DirectoryPackageSource::new(temp.path());
    let found = source.find_package("Acme.Core", "1.0.0.0").await.unwrap().unwrap();

    assert_eq!(found.files, ["Acme.Core.dll"]);
  }

  #[tokio::test]
  async fn test_index_cannot_escape_package() {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("feed/Acme.Core/1.0.0.0");
    std::fs::create_dir_all(&package).unwrap();
    std::fs::write(temp.path().join("Acme.Core.dll"), b"outside").unwrap();
    std::fs::write(
      package.join(INDEX_FILE),
      r#"{"files": ["../../../Acme.Core.dll"]}"#,
    )
    .unwrap();

    let source = DirectoryPackageSource::new(temp.path().join("feed"));
    let found = source.find_package("Acme.Core", "1.0.0.0").await.unwrap().unwrap();
    let result = source.fetch_file(&found, &found.files[0]).await;

    assert!(matches!(result, Err(SourceError::InvalidFile { .. })));
  }

  #[tokio::test]
  async fn test_unknown_package() {
    let temp = TempDir::new().unwrap();
    let source = DirectoryPackageSource::new(temp.path());
    assert_eq!(source.find_package("Missing", "1.0").await.unwrap(), None);
  }
}

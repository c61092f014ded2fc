use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Name of the package index inside `{name}/{version}/`.
pub const INDEX_FILE: &str = "index.json";

/// Contents of a package index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIndex {
  pub files: Vec<String>,
}

/// A package found on a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePackage {
  pub name: String,
  pub version: String,
  /// File paths relative to the package root, `/`-separated.
  pub files: Vec<String>,
}

impl RemotePackage {
  /// Files whose last path segment equals `file_name`, ignoring ASCII case.
  pub fn library_files<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self.files.iter().map(String::as_str).filter(move |file| {
      file
        .rsplit(['/', '\\'])
        .next()
        .is_some_and(|last| last.eq_ignore_ascii_case(file_name))
    })
  }
}

/// Split a package file path into its segments.
///
/// Rejects empty, `.` and `..` segments and drive prefixes, so a file can
/// only name something inside its package.
pub(crate) fn file_segments(file: &str) -> Result<Vec<&str>, SourceError> {
  let invalid = |message: &str| SourceError::InvalidFile {
    file: file.to_string(),
    message: message.to_string(),
  };

  let segments: Vec<&str> = file.split(['/', '\\']).collect();
  for segment in &segments {
    match *segment {
      "" => return Err(invalid("empty or absolute path segment")),
      "." | ".." => return Err(invalid("relative path segment")),
      s if s.contains(':') => return Err(invalid("drive or scheme prefix")),
      _ => {}
    }
  }
  Ok(segments)
}

/// A source of packages, queried by name and exact version.
#[async_trait]
pub trait PackageSource: Send + Sync {
  /// Human readable location of the source, for logs.
  fn location(&self) -> &str;

  /// Look up a package. Returns `None` when the source does not know it.
  async fn find_package(
    &self,
    name: &str,
    version: &str,
  ) -> Result<Option<RemotePackage>, SourceError>;

  /// Fetch one file of a package.
  async fn fetch_file(&self, package: &RemotePackage, file: &str) -> Result<Bytes, SourceError>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_library_files() {
    let package = RemotePackage {
      name: "Acme.Core".to_string(),
      version: "1.0.0.0".to_string(),
      files: vec![
        "lib/net45/Acme.Core.dll".to_string(),
        "lib/net45/Acme.Core.xml".to_string(),
        "lib\\net20\\ACME.CORE.DLL".to_string(),
        "tools/NotAcme.Core.dll".to_string(),
      ],
    };

    let files: Vec<&str> = package.library_files("Acme.Core.dll").collect();
    assert_eq!(files, ["lib/net45/Acme.Core.dll", "lib\\net20\\ACME.CORE.DLL"]);
  }

  #[test]
  fn test_file_segments() {
    assert_eq!(file_segments("lib/net45\\Acme.dll").unwrap(), ["lib", "net45", "Acme.dll"]);

    for file in ["", "/etc/passwd", "../../x/Acme.dll", "lib/./Acme.dll", "C:\\Acme.dll", "lib//Acme.dll"] {
      assert!(
        matches!(file_segments(file), Err(SourceError::InvalidFile { .. })),
        "{file} should be rejected"
      );
    }
  }

  #[test]
  fn test_index_deserializes() {
    let index: PackageIndex = serde_json::from_str(r#"{"files": ["a.dll", "b/c.pdb"]}"#).unwrap();
    assert_eq!(index.files, ["a.dll", "b/c.pdb"]);
  }
}

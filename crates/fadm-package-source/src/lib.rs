//! Fadm Package Source
//!
//! A package source is where fadm looks for a dependency that the local
//! repository does not have. Sources answer a single question, "which files
//! does package `name` at exactly `version` contain?", and serve those files.
//!
//! Two layouts are supported, both keyed as `{base}/{name}/{version}/`:
//! - [`HttpPackageSource`] reads `index.json` (`{"files": [...]}`) and fetches
//!   files over HTTP(S)
//! - [`DirectoryPackageSource`] lists and reads files from a local or shared
//!   directory

mod directory;
mod error;
mod http;
mod package;

use std::sync::Arc;

pub use directory::DirectoryPackageSource;
pub use error::SourceError;
pub use http::HttpPackageSource;
pub use package::{INDEX_FILE, PackageIndex, PackageSource, RemotePackage};

/// Open a package source from a location: `http://` and `https://` URLs are
/// served over HTTP, anything else is treated as a directory.
pub fn open(location: &str) -> Result<Arc<dyn PackageSource>, SourceError> {
  let location = location.trim();
  if location.is_empty() {
    return Err(SourceError::InvalidLocation {
      location: location.to_string(),
      message: "location is empty".to_string(),
    });
  }

  let lower = location.to_ascii_lowercase();
  if lower.starts_with("http://") || lower.starts_with("https://") {
    Ok(Arc::new(HttpPackageSource::new(location)?))
  } else {
    Ok(Arc::new(DirectoryPackageSource::new(location)))
  }
}

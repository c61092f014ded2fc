use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::IdentityError;
use crate::image::Image;
use crate::{metadata, pe};

/// Name and version an artifact declares about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactIdentity {
  pub name: String,
  /// Four-part version, `major.minor.build.revision`.
  pub version: String,
}

impl fmt::Display for ArtifactIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.name, self.version)
  }
}

/// Reads the identity embedded in an artifact image.
pub trait IdentityReader: Send + Sync {
  fn read(&self, image: &[u8]) -> Result<ArtifactIdentity, IdentityError>;
}

/// Identity reader for managed (CLI) PE images, `.dll` and `.exe` alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClrIdentityReader;

impl IdentityReader for ClrIdentityReader {
  fn read(&self, image: &[u8]) -> Result<ArtifactIdentity, IdentityError> {
    let image = Image::new(image);
    let root = pe::metadata_root(&image)?;
    let assembly = metadata::read_assembly(&image, root)?;

    let [major, minor, build, revision] = assembly.version;
    let identity = ArtifactIdentity {
      name: assembly.name,
      version: format!("{major}.{minor}.{build}.{revision}"),
    };
    debug!(%identity, "read assembly identity");
    Ok(identity)
  }
}

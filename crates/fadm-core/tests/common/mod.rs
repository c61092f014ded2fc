#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use fadm_core::{Engine, EngineConfig};
use fadm_identity::{ArtifactIdentity, IdentityError, IdentityReader};
use fadm_repository::LocalRepository;

/// Identity reader that reports the same identity for every image.
pub struct FixedIdentity {
  pub name: &'static str,
  pub version: &'static str,
}

impl IdentityReader for FixedIdentity {
  fn read(&self, _image: &[u8]) -> Result<ArtifactIdentity, IdentityError> {
    Ok(ArtifactIdentity {
      name: self.name.to_string(),
      version: self.version.to_string(),
    })
  }
}

/// Identity reader that rejects every image.
pub struct NoIdentity;

impl IdentityReader for NoIdentity {
  fn read(&self, _image: &[u8]) -> Result<ArtifactIdentity, IdentityError> {
    Err(IdentityError::NoAssembly)
  }
}

pub fn config(repository: &Path) -> EngineConfig {
  EngineConfig::new(LocalRepository::new(repository)).with_identity_reader(Arc::new(FixedIdentity {
    name: "Acme.Core",
    version: "1.2.0.0",
  }))
}

pub fn engine(repository: &Path) -> Engine {
  Engine::new(config(repository))
}

pub fn write(path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
  let path = path.as_ref();
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

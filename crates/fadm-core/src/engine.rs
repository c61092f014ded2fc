use std::path::{Path, PathBuf};
use std::sync::Arc;

use fadm_identity::{ClrIdentityReader, IdentityReader};
use fadm_package_source::PackageSource;
use fadm_repository::LocalRepository;
use fadm_result::ExecutionResult;

use crate::error::EngineError;
use crate::task::{AddTask, CopyTask, InstallTask, Task};

/// What the engine needs to build tasks.
#[derive(Clone)]
pub struct EngineConfig {
  pub repository: LocalRepository,
  /// Where missing dependencies are downloaded from, if anywhere.
  pub source: Option<Arc<dyn PackageSource>>,
  pub identity: Arc<dyn IdentityReader>,
}

impl EngineConfig {
  /// Configuration with no package source that reads identities from
  /// managed PE images.
  pub fn new(repository: LocalRepository) -> Self {
    Self {
      repository,
      source: None,
      identity: Arc::new(ClrIdentityReader),
    }
  }

  pub fn with_source(mut self, source: Arc<dyn PackageSource>) -> Self {
    self.source = Some(source);
    self
  }

  pub fn with_identity_reader(mut self, identity: Arc<dyn IdentityReader>) -> Self {
    self.identity = identity;
    self
  }
}

/// Entry point for the fadm operations. Holds configuration only; every
/// call builds and runs a fresh task.
pub struct Engine {
  config: EngineConfig,
}

impl Engine {
  pub fn new(config: EngineConfig) -> Self {
    Self { config }
  }

  /// Hook fadm into a project file, or into every project of a solution.
  pub async fn add(&self, path: impl AsRef<Path>) -> Result<ExecutionResult, EngineError> {
    let path = target_path(path.as_ref())?;
    Ok(AddTask::new(path).execute().await)
  }

  /// Restore the dependencies of the project at `path` (a directory or any
  /// file inside it).
  pub async fn copy(&self, path: impl AsRef<Path>) -> Result<ExecutionResult, EngineError> {
    let path = target_path(path.as_ref())?;
    let task = CopyTask::new(
      path,
      self.config.repository.clone(),
      self.config.source.clone(),
    );
    Ok(task.execute().await)
  }

  /// Install a build output into the repository.
  pub async fn install(&self, path: impl AsRef<Path>) -> Result<ExecutionResult, EngineError> {
    let path = target_path(path.as_ref())?;
    let task = InstallTask::new(
      path,
      self.config.repository.clone(),
      self.config.identity.clone(),
    );
    Ok(task.execute().await)
  }
}

/// Absolute form of a user supplied path. Empty paths are a caller error.
fn target_path(path: &Path) -> Result<PathBuf, EngineError> {
  if path.as_os_str().to_string_lossy().trim().is_empty() {
    return Err(EngineError::EmptyPath);
  }
  std::path::absolute(path).map_err(|source| EngineError::InvalidPath {
    path: path.to_path_buf(),
    source,
  })
}

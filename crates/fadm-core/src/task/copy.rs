use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fadm_model::Dependency;
use fadm_package_source::PackageSource;
use fadm_repository::{LocalRepository, fs};
use fadm_result::ExecutionResult;
use tracing::{debug, error, info, instrument, warn};

use super::{Task, missing_file};
use crate::descriptor::{self, DESCRIPTOR_FILE};
use crate::error::CoreError;

/// Folder, next to the descriptor, dependencies are copied into.
pub const DEPENDENCY_DIR: &str = "dependency";

const LIBRARY_EXTENSION: &str = "dll";

/// Restores the dependencies a project descriptor declares.
pub struct CopyTask {
  path: PathBuf,
  repository: LocalRepository,
  source: Option<Arc<dyn PackageSource>>,
}

impl CopyTask {
  pub fn new(
    path: PathBuf,
    repository: LocalRepository,
    source: Option<Arc<dyn PackageSource>>,
  ) -> Self {
    Self {
      path,
      repository,
      source,
    }
  }

  /// Project directory: the path itself when it has no extension, otherwise
  /// the directory containing it.
  fn project_dir(&self) -> &Path {
    match self.path.extension() {
      None => &self.path,
      Some(_) => self.path.parent().unwrap_or(&self.path),
    }
  }

  #[instrument(name = "copy", skip(self), fields(path = %self.path.display()))]
  async fn run(self) -> ExecutionResult {
    info!("copy started");

    let dir = self.project_dir().to_path_buf();
    let descriptor = dir.join(DESCRIPTOR_FILE);
    if !fs::is_file(&descriptor).await {
      warn!(descriptor = %descriptor.display(), "descriptor does not exist");
      return missing_file(&descriptor);
    }

    let result = match self.copy(&dir, &descriptor).await {
      Ok(result) => result,
      Err(e) => {
        error!(error = %e, "copy failed");
        ExecutionResult::from_error(&e)
      }
    };

    info!(status = %result.status(), "copy completed");
    result
  }

  async fn copy(&self, dir: &Path, descriptor: &Path) -> Result<ExecutionResult, CoreError> {
    let project = descriptor::load(descriptor)
      .await
      .map_err(|source| CoreError::Descriptor {
        path: descriptor.to_path_buf(),
        source,
      })?;

    let restorer = Restorer {
      repository: self.repository.clone(),
      source: self.source.clone(),
      destination: dir.join(DEPENDENCY_DIR),
    };
    let restores = project
      .dependencies
      .into_iter()
      .map(|dependency| restorer.clone().restore(dependency));

    Ok(
      ExecutionResult::success(format!(
        "Dependencies processed: '{}'",
        descriptor.display()
      ))
      .with_pending(restores),
    )
  }
}

#[async_trait]
impl Task for CopyTask {
  async fn execute(self) -> ExecutionResult {
    self.run().await
  }
}

/// Restores one dependency into the project's dependency folder.
#[derive(Clone)]
struct Restorer {
  repository: LocalRepository,
  source: Option<Arc<dyn PackageSource>>,
  destination: PathBuf,
}

impl Restorer {
  async fn restore(self, dependency: Dependency) -> ExecutionResult {
    match self.try_restore(&dependency).await {
      Ok(result) => result,
      Err(e) => {
        error!(dependency = %dependency.name, error = %e, "restore failed");
        ExecutionResult::from_error(&e)
      }
    }
  }

  async fn try_restore(&self, dependency: &Dependency) -> Result<ExecutionResult, CoreError> {
    let name = &dependency.name;
    let version = dependency.version.to_string();
    let target = self.destination.join(dependency.file_name(LIBRARY_EXTENSION));

    if fs::is_file(&target).await {
      debug!(target = %target.display(), "dependency already present");
      return Ok(ExecutionResult::success(format!(
        "Nothing to do: dependency '{}' already copied",
        target.display()
      )));
    }

    let repository_file = self.repository.file_path(name, &version, LIBRARY_EXTENSION);
    let downloaded = if self.repository.contains(name, &version, LIBRARY_EXTENSION).await {
      None
    } else {
      match self.download(dependency, &version).await? {
        Some(downloaded) => Some(downloaded),
        None => {
          warn!(dependency = %name, %version, "dependency unknown");
          return Ok(ExecutionResult::error(format!(
            "Dependency '{name}' {version} unknown"
          )));
        }
      }
    };

    fs::ensure_directory(&self.destination).await?;
    fs::copy_file(&repository_file, &target).await?;
    let copied = ExecutionResult::success(format!(
      "Dependency '{}' copied successfully",
      target.display()
    ));

    Ok(match downloaded {
      Some(downloaded) => {
        ExecutionResult::success(format!("Dependency '{name}' {version} restored"))
          .with_results([downloaded, copied])
      }
      None => copied,
    })
  }

  /// Fetch the dependency's library from the package source into the
  /// repository. `None` when there is no source or it does not have it.
  async fn download(
    &self,
    dependency: &Dependency,
    version: &str,
  ) -> Result<Option<ExecutionResult>, CoreError> {
    let Some(source) = &self.source else {
      return Ok(None);
    };
    debug!(
      source = source.location(),
      package = %dependency.name,
      %version,
      "looking up package"
    );
    let Some(package) = source.find_package(&dependency.name, version).await? else {
      return Ok(None);
    };

    let library = format!("{}.{LIBRARY_EXTENSION}", dependency.name);
    let Some(file) = package.library_files(&library).next() else {
      debug!(package = %dependency.name, "package has no library file");
      return Ok(None);
    };

    let content = source.fetch_file(&package, file).await?;
    let stored = self
      .repository
      .store(&dependency.name, version, LIBRARY_EXTENSION, &content)
      .await?;
    info!(dependency = %dependency.name, %version, "dependency downloaded");

    Ok(Some(ExecutionResult::success(format!(
      "Dependency '{}' {version} downloaded to '{}'",
      dependency.name,
      stored.display()
    ))))
  }
}

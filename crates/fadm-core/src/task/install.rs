use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fadm_identity::IdentityReader;
use fadm_repository::{LocalRepository, fs};
use fadm_result::ExecutionResult;
use tracing::{error, info, instrument, warn};

use super::{Task, missing_file};
use crate::error::CoreError;

/// Extensions of the artifacts that can be installed, compared ignoring case.
pub const INSTALLABLE_EXTENSIONS: [&str; 2] = ["dll", "exe"];

const PDB_EXTENSION: &str = "pdb";

/// Installs a build output into the local repository, along with its debug
/// symbols when they sit next to it.
pub struct InstallTask {
  path: PathBuf,
  repository: LocalRepository,
  identity: Arc<dyn IdentityReader>,
}

impl InstallTask {
  pub fn new(path: PathBuf, repository: LocalRepository, identity: Arc<dyn IdentityReader>) -> Self {
    Self {
      path,
      repository,
      identity,
    }
  }

  /// Lowercased extension of the target when it is installable.
  fn installable_extension(&self) -> Option<String> {
    let extension = self.path.extension()?.to_str()?.to_ascii_lowercase();
    INSTALLABLE_EXTENSIONS
      .contains(&extension.as_str())
      .then_some(extension)
  }

  #[instrument(name = "install", skip(self), fields(path = %self.path.display()))]
  async fn run(self) -> ExecutionResult {
    info!("install started");

    if !fs::is_file(&self.path).await {
      warn!("target does not exist");
      return missing_file(&self.path);
    }
    let Some(extension) = self.installable_extension() else {
      warn!("target is not an installable artifact");
      return ExecutionResult::error(format!(
        "The file '{}' must have following extensions [.dll,.exe]",
        self.path.display()
      ));
    };

    let result = match self.install(&extension).await {
      Ok(result) => result,
      Err(e) => {
        error!(error = %e, "install failed");
        ExecutionResult::from_error(&e)
      }
    };

    info!(status = %result.status(), "install completed");
    result
  }

  async fn install(&self, extension: &str) -> Result<ExecutionResult, CoreError> {
    let image = fs::read_file(&self.path).await?;
    let identity = self
      .identity
      .read(&image)
      .map_err(|source| CoreError::Identity {
        path: self.path.clone(),
        source,
      })?;
    info!(%identity, "artifact identified");

    self.repository.ensure_root().await?;
    self
      .repository
      .ensure_directory(&identity.name, &identity.version)
      .await?;

    let pdb_source = self.path.with_extension(PDB_EXTENSION);
    let pdb_target = self
      .repository
      .file_path(&identity.name, &identity.version, PDB_EXTENSION);
    let pdb = tokio::spawn(install_pdb(pdb_source, pdb_target));

    let target = self
      .repository
      .file_path(&identity.name, &identity.version, extension);
    let installed = match fs::copy_file(&self.path, &target).await {
      Ok(_) => ExecutionResult::success(format!("File installed to '{}'", target.display())),
      Err(e) => {
        error!(error = %e, "artifact copy failed");
        ExecutionResult::from_error(&e)
      }
    };

    Ok(installed.with_handles([pdb]))
  }
}

#[async_trait]
impl Task for InstallTask {
  async fn execute(self) -> ExecutionResult {
    self.run().await
  }
}

/// Copy the debug symbols next to an artifact into the repository.
async fn install_pdb(source: PathBuf, target: PathBuf) -> ExecutionResult {
  if !fs::is_file(&source).await {
    warn!(source = %source.display(), "no debug symbols");
    return ExecutionResult::warning(format!("PDB not found at '{}'", source.display()));
  }

  match fs::copy_file(&source, &target).await {
    Ok(_) => ExecutionResult::success(format!("PDB installed to '{}'", target.display())),
    Err(e) => {
      warn!(error = %e, "debug symbols not installed");
      ExecutionResult::warning(format!("PDB could not be installed: {e}"))
    }
  }
}

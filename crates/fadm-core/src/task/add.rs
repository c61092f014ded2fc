use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fadm_repository::fs;
use fadm_result::ExecutionResult;
use tracing::{debug, error, info, instrument, warn};
use xmltree::Element;

use super::{Task, missing_file};
use crate::error::CoreError;
use crate::hook;

const SOLUTION_EXTENSION: &str = "sln";

/// Hooks fadm into the build of a project, or of every project of a solution.
pub struct AddTask {
  path: PathBuf,
}

impl AddTask {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  fn is_solution(&self) -> bool {
    self
      .path
      .extension()
      .and_then(|extension| extension.to_str())
      .is_some_and(|extension| extension.eq_ignore_ascii_case(SOLUTION_EXTENSION))
  }

  #[instrument(name = "add", skip(self), fields(path = %self.path.display()))]
  async fn run(self) -> ExecutionResult {
    info!("add started");

    if !fs::is_file(&self.path).await {
      warn!("target does not exist");
      return missing_file(&self.path);
    }

    let result = if self.is_solution() {
      match self.process_solution().await {
        Ok(result) => result,
        Err(e) => {
          error!(error = %e, "solution processing failed");
          ExecutionResult::from_error(&e)
        }
      }
    } else {
      process_project(self.path).await
    };

    info!(status = %result.status(), "add completed");
    result
  }

  async fn process_solution(&self) -> Result<ExecutionResult, CoreError> {
    let content = tokio::fs::read_to_string(&self.path)
      .await
      .map_err(|source| CoreError::Read {
        path: self.path.clone(),
        source,
      })?;

    let solution_dir = self.path.parent().unwrap_or(Path::new(""));
    let mut projects = Vec::new();
    for project in hook::solution_projects(&content, solution_dir) {
      if fs::is_file(&project).await {
        projects.push(project);
      } else {
        debug!(project = %project.display(), "skipping solution entry that is not a file");
      }
    }

    Ok(
      ExecutionResult::success(format!("Solution processed: '{}'", self.path.display()))
        .with_pending(projects.into_iter().map(process_project)),
    )
  }
}

#[async_trait]
impl Task for AddTask {
  async fn execute(self) -> ExecutionResult {
    self.run().await
  }
}

async fn process_project(path: PathBuf) -> ExecutionResult {
  match hook_project(&path).await {
    Ok(result) => result,
    Err(e) => {
      error!(project = %path.display(), error = %e, "project processing failed");
      ExecutionResult::from_error(&e)
    }
  }
}

/// Add the build hooks to a project file, rewriting it only when something
/// was missing.
async fn hook_project(path: &Path) -> Result<ExecutionResult, CoreError> {
  let content = tokio::fs::read(path).await.map_err(|source| CoreError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let mut root = Element::parse(content.as_slice()).map_err(|e| CoreError::Xml {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;

  if root.name != "Project" {
    return Err(CoreError::NotAProject {
      path: path.to_path_buf(),
      root: root.name,
    });
  }

  let injected = hook::inject(&mut root);
  if injected.is_empty() {
    return Ok(ExecutionResult::warning(format!(
      "Nothing to do: '{}'",
      path.display()
    )));
  }

  let layout = hook::DocumentLayout::detect(&content);
  let document = hook::write_document(&root, layout).map_err(|e| CoreError::Xml {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;
  tokio::fs::write(path, document)
    .await
    .map_err(|source| CoreError::Write {
      path: path.to_path_buf(),
      source,
    })?;
  info!(project = %path.display(), injected = injected.len(), "project hooked");

  Ok(
    ExecutionResult::success(format!("File processed: '{}'", path.display()))
      .with_results(injected.iter().map(|injection| ExecutionResult::success(injection.to_string()))),
  )
}

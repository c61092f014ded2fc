use std::path::PathBuf;

use fadm_identity::IdentityError;
use fadm_package_source::SourceError;
use fadm_repository::RepositoryError;

use crate::descriptor::DescriptorError;

/// Faults raised while a task does its work. Tasks turn these into error
/// results; they never reach the caller of a task.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
  #[error(transparent)]
  Repository(#[from] RepositoryError),

  #[error(transparent)]
  Source(#[from] SourceError),

  #[error("cannot read the identity of '{}': {source}", path.display())]
  Identity {
    path: PathBuf,
    #[source]
    source: IdentityError,
  },

  #[error("invalid descriptor '{}': {source}", path.display())]
  Descriptor {
    path: PathBuf,
    #[source]
    source: DescriptorError,
  },

  #[error("failed to read '{}': {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write '{}': {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed project file '{}': {message}", path.display())]
  Xml { path: PathBuf, message: String },

  #[error("'{}' is not a project file: unexpected root element '{root}'", path.display())]
  NotAProject { path: PathBuf, root: String },
}

/// Misuse of the engine, reported before any task runs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  #[error("path must not be empty")]
  EmptyPath,

  #[error("invalid path '{}': {source}", path.display())]
  InvalidPath {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

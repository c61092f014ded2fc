use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
  #[error("failed to create directory '{}': {source}", path.display())]
  CreateDirectory {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to copy '{}' to '{}': {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write '{}': {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read '{}': {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

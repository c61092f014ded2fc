use std::path::PathBuf;

/// Errors that can occur while querying a package source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
  /// The source location could not be parsed.
  #[error("invalid package source '{location}': {message}")]
  InvalidLocation { location: String, message: String },

  /// HTTP request failed.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with an unexpected status.
  #[error("request to '{url}' failed with status {status}")]
  Status { url: String, status: u16 },

  /// The package index could not be decoded.
  #[error("invalid package index '{location}': {message}")]
  InvalidIndex { location: String, message: String },

  /// A package file path points outside its package.
  #[error("invalid package file '{file}': {message}")]
  InvalidFile { file: String, message: String },

  /// A file of a directory source could not be read.
  #[error("failed to read '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

use std::path::PathBuf;

/// Errors that can occur while resolving the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The platform has no per-user configuration directory.
  #[error("could not determine the user configuration directory")]
  NoConfigDir,

  /// An explicitly requested configuration file does not exist.
  #[error("configuration file not found: {}", path.display())]
  NotFound { path: PathBuf },

  /// The configuration file could not be read.
  #[error("failed to read configuration file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The configuration file is not valid JSON or has unknown fields.
  #[error("invalid configuration file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Directory name under the user's configuration directory.
const APP_DIR: &str = "fadm";

/// Configuration file name inside the fadm configuration directory.
pub const CONFIG_FILE: &str = "config.json";

/// Default repository directory name inside the fadm configuration directory.
pub const REPOSITORY_DIR: &str = "repository";

/// Get the fadm configuration directory (e.g. `~/.config/fadm` on Linux).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
  let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
  Ok(base.join(APP_DIR))
}

/// Contents of a configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
  /// Local repository root. Relative paths are resolved against the
  /// directory holding the configuration file.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub repository: Option<PathBuf>,
  /// Package source URL or directory.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

impl ConfigFile {
  /// Load a configuration file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        ConfigError::NotFound {
          path: path.to_path_buf(),
        }
      } else {
        ConfigError::Read {
          path: path.to_path_buf(),
          source: e,
        }
      }
    })?;

    let mut file: ConfigFile =
      serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
      })?;

    if let Some(repository) = file.repository.take() {
      let base = path.parent().unwrap_or_else(|| Path::new("."));
      file.repository = Some(base.join(repository));
    }

    Ok(file)
  }
}

/// Values that take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub repository: Option<PathBuf>,
  pub source: Option<String>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
  /// Local repository root.
  pub repository: PathBuf,
  /// Package source used when a dependency is missing from the repository.
  pub source: Option<String>,
}

impl Config {
  /// Resolve the configuration from the user's configuration directory.
  ///
  /// When `file` is given it must exist. Otherwise the default configuration
  /// file is read if present.
  pub fn resolve(overrides: Overrides, file: Option<&Path>) -> Result<Self, ConfigError> {
    Self::resolve_in(&config_dir()?, overrides, file)
  }

  /// Resolve the configuration using `base_dir` as the fadm configuration
  /// directory.
  pub fn resolve_in(
    base_dir: &Path,
    overrides: Overrides,
    file: Option<&Path>,
  ) -> Result<Self, ConfigError> {
    let file = match file {
      Some(path) => ConfigFile::load(path)?,
      None => {
        let default_path = base_dir.join(CONFIG_FILE);
        match ConfigFile::load(&default_path) {
          Ok(file) => file,
          Err(ConfigError::NotFound { .. }) => {
            debug!(path = %default_path.display(), "no configuration file, using defaults");
            ConfigFile::default()
          }
          Err(e) => return Err(e),
        }
      }
    };

    let repository = overrides
      .repository
      .or(file.repository)
      .unwrap_or_else(|| base_dir.join(REPOSITORY_DIR));
    let source = overrides.source.or(file.source);

    Ok(Self { repository, source })
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_defaults_without_file() {
    let temp = TempDir::new().unwrap();
    let config = Config::resolve_in(temp.path(), Overrides::default(), None).unwrap();

    assert_eq!(config.repository, temp.path().join(REPOSITORY_DIR));
    assert_eq!(config.source, None);
  }

  #[test]
  fn test_default_file_is_read() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
      temp.path().join(CONFIG_FILE),
      r#"{"repository": "repo", "source": "https://packages.example.com"}"#,
    )
    .unwrap();

    let config = Config::resolve_in(temp.path(), Overrides::default(), None).unwrap();
    assert_eq!(config.repository, temp.path().join("repo"));
    assert_eq!(config.source.as_deref(), Some("https://packages.example.com"));
  }

  #[test]
  fn test_overrides_win() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
      temp.path().join(CONFIG_FILE),
      r#"{"repository": "/from/file", "source": "/mirror"}"#,
    )
    .unwrap();

    let overrides = Overrides {
      repository: Some(PathBuf::from("/from/flag")),
      source: None,
    };
    let config = Config::resolve_in(temp.path(), overrides, None).unwrap();
    assert_eq!(config.repository, PathBuf::from("/from/flag"));
    assert_eq!(config.source.as_deref(), Some("/mirror"));
  }

  #[test]
  fn test_explicit_file_must_exist() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.json");
    let result = Config::resolve_in(temp.path(), Overrides::default(), Some(&missing));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
  }

  #[test]
  fn test_unknown_fields_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.json");
    std::fs::write(&path, r#"{"repo": "typo"}"#).unwrap();

    let result = Config::resolve_in(temp.path(), Overrides::default(), Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
  }
}

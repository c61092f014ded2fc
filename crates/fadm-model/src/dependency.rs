use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::qualifiers::{Architecture, Culture};
use crate::version::Version;

/// A dependency declared in a project descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
  pub name: String,
  pub version: Version,
  #[serde(default)]
  pub culture: Culture,
  #[serde(default)]
  pub architecture: Architecture,
}

impl Dependency {
  pub fn new(name: impl Into<String>, version: Version) -> Result<Self, ModelError> {
    let name = name.into();
    if name.trim().is_empty() {
      return Err(ModelError::EmptyName);
    }

    Ok(Self {
      name,
      version,
      culture: Culture::Invariant,
      architecture: Architecture::None,
    })
  }

  pub fn with_culture(mut self, culture: Culture) -> Self {
    self.culture = culture;
    self
  }

  pub fn with_architecture(mut self, architecture: Architecture) -> Self {
    self.architecture = architecture;
    self
  }

  /// Canonical file name of the dependency, `{name}-{version}.{extension}`.
  pub fn file_name(&self, extension: &str) -> String {
    format!("{}-{}.{}", self.name, self.version, extension)
  }
}

/// A project as described by its descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub dependencies: Vec<Dependency>,
}

impl Project {
  pub fn new(dependencies: Vec<Dependency>) -> Self {
    Self { dependencies }
  }
}

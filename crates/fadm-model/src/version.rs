use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// A four part version number, `major.minor[.build[.revision]]`.
///
/// Only the components that were given are displayed, so `1.2` and `1.2.0.0`
/// are different versions and map to different repository paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
  pub major: u32,
  pub minor: u32,
  pub build: Option<u32>,
  pub revision: Option<u32>,
}

impl Version {
  pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
    Self {
      major,
      minor,
      build: Some(build),
      revision: Some(revision),
    }
  }
}

impl FromStr for Version {
  type Err = ModelError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let invalid = |message: &str| ModelError::InvalidVersion {
      value: value.to_string(),
      message: message.to_string(),
    };

    let parts: Vec<&str> = value.trim().split('.').collect();
    if !(2..=4).contains(&parts.len()) {
      return Err(invalid("expected 2 to 4 dot separated components"));
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in parts {
      if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("components must be non-negative integers"));
      }
      let number = part
        .parse::<u32>()
        .map_err(|_| invalid("component out of range"))?;
      numbers.push(number);
    }

    Ok(Self {
      major: numbers[0],
      minor: numbers[1],
      build: numbers.get(2).copied(),
      revision: numbers.get(3).copied(),
    })
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.major, self.minor)?;
    if let Some(build) = self.build {
      write!(f, ".{}", build)?;
      if let Some(revision) = self.revision {
        write!(f, ".{}", revision)?;
      }
    }
    Ok(())
  }
}

impl Serialize for Version {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Version {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
  }
}

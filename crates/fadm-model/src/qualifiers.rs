//! Culture and processor architecture qualifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Culture of an artifact, either invariant or a named culture tag such as
/// `fr-FR`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Culture {
  #[default]
  Invariant,
  Named(String),
}

impl Culture {
  /// Parse a culture tag, falling back to [`Culture::Invariant`] when the
  /// value is missing or not a well-formed tag.
  pub fn parse_lenient(value: Option<&str>) -> Self {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
      return Culture::Invariant;
    };

    if is_culture_tag(value) {
      Culture::Named(value.to_string())
    } else {
      warn!(culture = %value, "unrecognized culture, using invariant");
      Culture::Invariant
    }
  }
}

impl fmt::Display for Culture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Culture::Invariant => f.write_str("neutral"),
      Culture::Named(tag) => f.write_str(tag),
    }
  }
}

/// Primary subtag of 2-3 letters, then alphanumeric subtags of 1-8 characters.
fn is_culture_tag(value: &str) -> bool {
  let mut subtags = value.split('-');
  let primary_ok = subtags
    .next()
    .is_some_and(|p| (2..=3).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphabetic()));

  primary_ok
    && subtags.all(|s| (1..=8).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// Processor architecture an artifact targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
  #[default]
  None,
  Msil,
  X86,
  Ia64,
  Amd64,
  Arm,
}

impl Architecture {
  const ALL: [Architecture; 6] = [
    Architecture::None,
    Architecture::Msil,
    Architecture::X86,
    Architecture::Ia64,
    Architecture::Amd64,
    Architecture::Arm,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Architecture::None => "None",
      Architecture::Msil => "MSIL",
      Architecture::X86 => "X86",
      Architecture::Ia64 => "IA64",
      Architecture::Amd64 => "Amd64",
      Architecture::Arm => "Arm",
    }
  }

  /// Parse an architecture by exact name or numeric value, falling back to
  /// [`Architecture::None`] for anything else.
  // TODO: decide whether descriptors with unknown architectures should fail
  // validation instead of silently targeting every architecture.
  pub fn parse_lenient(value: Option<&str>) -> Self {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
      return Architecture::None;
    };

    let by_name = Self::ALL.iter().copied().find(|a| a.name() == value);
    let by_number = value
      .parse::<usize>()
      .ok()
      .and_then(|index| Self::ALL.get(index).copied());

    match by_name.or(by_number) {
      Some(architecture) => architecture,
      None => {
        warn!(architecture = %value, "unrecognized architecture, using None");
        Architecture::None
      }
    }
  }
}

impl fmt::Display for Architecture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

//! Execution result status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of an execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
  /// The operation was fully achieved.
  Success,
  /// The operation was achieved with a degraded or no-op outcome.
  Warning,
  /// The operation could not be completed.
  Error,
}

impl Status {
  pub fn is_error(self) -> bool {
    matches!(self, Status::Error)
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Status::Success => "Success",
      Status::Warning => "Warning",
      Status::Error => "Error",
    };
    f.write_str(name)
  }
}

//! Fully resolved snapshot of a result tree.

use std::fmt;

use futures::{Stream, StreamExt};
use serde::Serialize;

use crate::result::ExecutionResult;
use crate::status::Status;

/// A result tree whose children have all completed.
///
/// Children appear in the order of the combined view they were drained from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTree {
  pub status: Status,
  pub message: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<ResultTree>,
}

impl ResultTree {
  /// Number of nodes in the tree, root included.
  pub fn node_count(&self) -> usize {
    1 + self.children.iter().map(ResultTree::node_count).sum::<usize>()
  }

  fn write_at(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    writeln!(f, "{}", format_line(depth, self.status, &self.message))?;
    for child in &self.children {
      child.write_at(f, depth + 1)?;
    }
    Ok(())
  }
}

impl fmt::Display for ResultTree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.write_at(f, 0)
  }
}

impl ExecutionResult {
  /// Drain the whole tree into a [`ResultTree`], waiting for every pending
  /// child to complete.
  pub async fn resolve(mut self) -> ResultTree {
    let mut children = self.children();
    let mut resolved = Vec::with_capacity(children.size_hint().0);

    while let Some(child) = children.next().await {
      resolved.push(Box::pin(child.resolve()).await);
    }

    ResultTree {
      status: self.status(),
      message: self.message().to_string(),
      children: resolved,
    }
  }
}

/// One trace line: a tab per depth level, then `[status] message`.
pub(crate) fn format_line(depth: usize, status: Status, message: &str) -> String {
  format!("{}[{}] {}", "\t".repeat(depth), status, message)
}

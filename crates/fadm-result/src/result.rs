//! Execution result with resolved and pending children.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use tokio::task::{JoinError, JoinHandle};

use crate::status::Status;

/// Outcome of one step of an operation.
///
/// The status and message are fixed at construction. Children can only be
/// appended, either as results that are already resolved or as handles to
/// tasks still running on the tokio runtime. The builder methods consume and
/// return `self`, so a result is owned by the code building it until it is
/// handed to a consumer.
pub struct ExecutionResult {
  status: Status,
  message: String,
  resolved: Vec<ExecutionResult>,
  pending: FuturesUnordered<JoinHandle<ExecutionResult>>,
}

impl ExecutionResult {
  fn new(status: Status, message: String) -> Self {
    assert!(
      !message.trim().is_empty(),
      "execution result message must not be empty"
    );

    Self {
      status,
      message,
      resolved: Vec::new(),
      pending: FuturesUnordered::new(),
    }
  }

  /// Build a success result.
  ///
  /// # Panics
  ///
  /// Panics if the message is empty or only whitespace.
  pub fn success(message: impl Into<String>) -> Self {
    Self::new(Status::Success, message.into())
  }

  /// Build a warning result.
  ///
  /// # Panics
  ///
  /// Panics if the message is empty or only whitespace.
  pub fn warning(message: impl Into<String>) -> Self {
    Self::new(Status::Warning, message.into())
  }

  /// Build an error result.
  ///
  /// # Panics
  ///
  /// Panics if the message is empty or only whitespace.
  pub fn error(message: impl Into<String>) -> Self {
    Self::new(Status::Error, message.into())
  }

  /// Build an error result describing a fault.
  pub fn from_error<E: fmt::Display + ?Sized>(error: &E) -> Self {
    let message = error.to_string();
    if message.trim().is_empty() {
      return Self::error("unexpected error");
    }
    Self::new(Status::Error, message)
  }

  pub fn status(&self) -> Status {
    self.status
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  /// Whether any child, resolved or pending, is still attached.
  pub fn has_children(&self) -> bool {
    !self.resolved.is_empty() || !self.pending.is_empty()
  }

  /// Number of children still attached.
  pub fn child_count(&self) -> usize {
    self.resolved.len() + self.pending.len()
  }

  /// Append children that are already resolved.
  pub fn with_results<I>(mut self, children: I) -> Self
  where
    I: IntoIterator<Item = ExecutionResult>,
  {
    self.resolved.extend(children);
    self
  }

  /// Spawn each future on the tokio runtime and append it as a pending child.
  ///
  /// Must be called from within a tokio runtime.
  pub fn with_pending<I, F>(self, children: I) -> Self
  where
    I: IntoIterator<Item = F>,
    F: Future<Output = ExecutionResult> + Send + 'static,
  {
    self.with_handles(children.into_iter().map(tokio::spawn))
  }

  /// Append handles of already spawned tasks as pending children.
  pub fn with_handles<I>(self, handles: I) -> Self
  where
    I: IntoIterator<Item = JoinHandle<ExecutionResult>>,
  {
    for handle in handles {
      self.pending.push(handle);
    }
    self
  }

  /// Take the combined view of the children.
  ///
  /// Resolved children are yielded first, in insertion order. Pending
  /// children follow in completion order: each time one of the outstanding
  /// tasks finishes it is yielded and dropped from the set. Both collections
  /// are moved into the returned stream, so the view can be drained once;
  /// calling this again yields nothing.
  pub fn children(&mut self) -> Children {
    Children {
      resolved: std::mem::take(&mut self.resolved).into_iter(),
      pending: std::mem::take(&mut self.pending),
    }
  }
}

impl fmt::Debug for ExecutionResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ExecutionResult")
      .field("status", &self.status)
      .field("message", &self.message)
      .field("resolved", &self.resolved)
      .field("pending", &self.pending.len())
      .finish()
  }
}

/// Combined view over the children of an [`ExecutionResult`].
pub struct Children {
  resolved: std::vec::IntoIter<ExecutionResult>,
  pending: FuturesUnordered<JoinHandle<ExecutionResult>>,
}

impl Stream for Children {
  type Item = ExecutionResult;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    if let Some(child) = self.resolved.next() {
      return Poll::Ready(Some(child));
    }

    self
      .pending
      .poll_next_unpin(cx)
      .map(|joined| joined.map(|outcome| outcome.unwrap_or_else(|e| join_failure(&e))))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.resolved.len() + self.pending.len();
    (remaining, Some(remaining))
  }
}

/// A pending child that panicked or was aborted is reported, never re-raised.
fn join_failure(error: &JoinError) -> ExecutionResult {
  ExecutionResult::error(format!("Pending operation failed: {}", error))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_message_is_kept_verbatim() {
    let result = ExecutionResult::success("File installed to '{0}'");
    assert_eq!(result.message(), "File installed to '{0}'");
    assert_eq!(result.status(), Status::Success);
    assert!(!result.has_children());
  }

  #[test]
  fn test_formatted_message_is_invariant() {
    let result = ExecutionResult::warning(format!("{} of {} at {}", 3, 4, 1.5));
    assert_eq!(result.message(), "3 of 4 at 1.5");
  }

  #[test]
  #[should_panic(expected = "must not be empty")]
  fn test_empty_message_is_rejected() {
    ExecutionResult::error("  ");
  }

  #[test]
  fn test_from_error_uses_display() {
    let error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let result = ExecutionResult::from_error(&error);
    assert_eq!(result.status(), Status::Error);
    assert_eq!(result.message(), "no such file");
  }

  #[tokio::test]
  async fn test_resolved_children_keep_insertion_order() {
    let mut result = ExecutionResult::success("root").with_results([
      ExecutionResult::success("first"),
      ExecutionResult::warning("second"),
      ExecutionResult::error("third"),
    ]);
    assert_eq!(result.child_count(), 3);

    let messages: Vec<String> = result
      .children()
      .map(|child| child.message().to_string())
      .collect()
      .await;
    assert_eq!(messages, vec!["first", "second", "third"]);
  }

  #[tokio::test]
  async fn test_children_drain_once() {
    let mut result = ExecutionResult::success("root")
      .with_results([ExecutionResult::success("resolved")])
      .with_pending([async { ExecutionResult::success("pending") }]);

    let first: Vec<ExecutionResult> = result.children().collect().await;
    assert_eq!(first.len(), 2);
    assert!(!result.has_children());

    let second: Vec<ExecutionResult> = result.children().collect().await;
    assert!(second.is_empty());
  }

  #[tokio::test]
  async fn test_panicking_child_becomes_error() {
    let mut result = ExecutionResult::success("root").with_pending([async {
      if true {
        panic!("boom");
      }
      ExecutionResult::success("unreachable")
    }]);

    let children: Vec<ExecutionResult> = result.children().collect().await;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].status(), Status::Error);
    assert!(children[0].message().starts_with("Pending operation failed"));
  }

  #[tokio::test]
  async fn test_size_hint_counts_both_collections() {
    let mut result = ExecutionResult::success("root")
      .with_results([ExecutionResult::success("a")])
      .with_pending(["b", "c"].map(|message| async move { ExecutionResult::success(message) }));

    let children = result.children();
    assert_eq!(children.size_hint(), (3, Some(3)));
  }
}

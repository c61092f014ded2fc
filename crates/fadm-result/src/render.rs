//! Text rendering of result trees.

use std::io::{self, Write};

use futures::StreamExt;

use crate::result::ExecutionResult;
use crate::tree::format_line;

/// Write a depth-first, tab-indented trace of `result` to `writer`.
///
/// Each node is written and flushed as soon as it is available, so pending
/// children show up in the order they complete rather than the order they
/// were attached.
pub async fn render<W: Write>(result: ExecutionResult, writer: &mut W) -> io::Result<()> {
  render_node(result, 0, writer).await
}

/// Render a result tree into a string.
pub async fn render_to_string(result: ExecutionResult) -> String {
  result.resolve().await.to_string()
}

async fn render_node<W: Write>(
  mut result: ExecutionResult,
  depth: usize,
  writer: &mut W,
) -> io::Result<()> {
  writeln!(
    writer,
    "{}",
    format_line(depth, result.status(), result.message())
  )?;
  writer.flush()?;

  let mut children = result.children();
  while let Some(child) = children.next().await {
    Box::pin(render_node(child, depth + 1, writer)).await?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  fn sample_tree() -> ExecutionResult {
    ExecutionResult::success("root")
      .with_results([
        ExecutionResult::success("a").with_results([ExecutionResult::warning("a.1")]),
        ExecutionResult::error("b"),
      ])
      .with_pending([async {
        ExecutionResult::success("c").with_pending([async {
          ExecutionResult::success("c.1").with_results([ExecutionResult::success("c.1.1")])
        }])
      }])
  }

  async fn delayed(millis: u64, message: &'static str) -> ExecutionResult {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    ExecutionResult::success(message)
  }

  #[tokio::test]
  async fn test_line_count_and_indentation_follow_tree() {
    let mut output = Vec::new();
    render(sample_tree(), &mut output)
      .await
      .expect("render should succeed");
    let text = String::from_utf8(output).expect("utf8");

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);

    let depths: Vec<usize> = lines
      .iter()
      .map(|line| line.chars().take_while(|c| *c == '\t').count())
      .collect();
    assert_eq!(depths, vec![0, 1, 2, 1, 1, 2, 3]);
    assert_eq!(lines[0], "[Success] root");
    assert_eq!(lines[3], "\t[Error] b");
    assert_eq!(lines[6], "\t\t\t[Success] c.1.1");
  }

  #[tokio::test]
  async fn test_render_to_string_matches_render() {
    let mut output = Vec::new();
    render(sample_tree(), &mut output)
      .await
      .expect("render should succeed");

    assert_eq!(
      String::from_utf8(output).expect("utf8"),
      render_to_string(sample_tree()).await
    );
  }

  #[tokio::test]
  async fn test_pending_children_render_in_completion_order() {
    let result = ExecutionResult::success("root")
      .with_pending([delayed(200, "slow"), delayed(0, "fast")]);

    let text = render_to_string(result).await;
    assert_eq!(text, "[Success] root\n\t[Success] fast\n\t[Success] slow\n");
  }
}

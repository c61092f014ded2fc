//! The operations fadm performs, one task per command.
//!
//! A task is built with an absolute target path and the configuration it
//! needs, executed once, and reports everything through the returned
//! [`ExecutionResult`]. Precondition failures come back as error leaves;
//! faults raised while working are converted at the task boundary.

mod add;
mod copy;
mod install;

use std::path::Path;

use async_trait::async_trait;
use fadm_result::ExecutionResult;

pub use add::AddTask;
pub use copy::{CopyTask, DEPENDENCY_DIR};
pub use install::{INSTALLABLE_EXTENSIONS, InstallTask};

#[async_trait]
pub trait Task: Send {
  /// Run the task. Children of the returned result may still be running.
  async fn execute(self) -> ExecutionResult;
}

pub(crate) fn missing_file(path: &Path) -> ExecutionResult {
  ExecutionResult::error(format!("The file '{}' doesn't exist", path.display()))
}

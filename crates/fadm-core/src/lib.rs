//! Fadm Core
//!
//! This crate implements the three fadm operations on top of the result
//! model from `fadm-result`:
//!
//! - **install** copies a build output into the local repository under its
//!   embedded name and version
//! - **copy** restores the dependencies a `fadm.xml` descriptor declares into
//!   the project's `dependency/` folder, downloading missing ones from a
//!   package source
//! - **add** injects the copy and install steps into MSBuild project files
//!
//! [`Engine`] is the entry point; it validates the target path and runs the
//! matching [`Task`].

pub mod descriptor;
mod engine;
mod error;
pub mod hook;
pub mod task;

pub use descriptor::DescriptorError;
pub use engine::{Engine, EngineConfig};
pub use error::{CoreError, EngineError};
pub use task::{AddTask, CopyTask, InstallTask, Task};

//! Fadm Result
//!
//! This crate provides [`ExecutionResult`], the outcome of one step of a fadm
//! operation. A result carries a [`Status`], a formatted message and two kinds
//! of children: results that are already resolved, and pending children that
//! are still running on the tokio runtime.
//!
//! Children are read through [`ExecutionResult::children`], which yields the
//! resolved children in insertion order and then the pending children in the
//! order they complete. [`render`] writes a whole tree as an indented trace,
//! printing each node as soon as it is available.

mod render;
mod result;
mod status;
mod tree;

pub use render::{render, render_to_string};
pub use result::{Children, ExecutionResult};
pub use status::Status;
pub use tree::ResultTree;

//! Fadm Repository
//!
//! The local repository is a plain directory tree keyed by artifact name and
//! version:
//!
//! ```text
//! {root}/
//! └── Acme.Logging/
//!     └── 2.1.0.0/
//!         ├── Acme.Logging-2.1.0.0.dll
//!         └── Acme.Logging-2.1.0.0.pdb
//! ```
//!
//! Distinct artifacts never share a path. Concurrent writes of the same
//! artifact are not synchronised; the last writer wins.

mod error;
pub mod fs;
mod repository;

pub use error::RepositoryError;
pub use repository::{LocalRepository, artifact_file_name};

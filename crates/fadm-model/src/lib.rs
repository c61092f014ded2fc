//! Fadm Model
//!
//! This crate contains the model types shared by the fadm crates: the
//! dependencies a project declares in its descriptor, and the qualifiers
//! (version, culture, architecture) that identify an artifact.
//!
//! Culture and architecture parsing is deliberately tolerant: unrecognized
//! values fall back to the invariant culture and [`Architecture::None`].

mod dependency;
mod error;
mod qualifiers;
mod version;

pub use dependency::{Dependency, Project};
pub use error::ModelError;
pub use qualifiers::{Architecture, Culture};
pub use version::Version;

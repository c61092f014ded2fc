//! Fadm Identity
//!
//! Reads the identity (assembly name and version) embedded in a managed PE
//! image, the way the runtime loader would see it. Only the headers and the
//! metadata tables needed to reach the first row of the Assembly table are
//! decoded; nothing is loaded or executed.

mod error;
mod identity;
mod image;
mod metadata;
mod pe;

pub use error::IdentityError;
pub use identity::{ArtifactIdentity, ClrIdentityReader, IdentityReader};

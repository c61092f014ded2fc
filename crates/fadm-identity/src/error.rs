/// Errors that can occur while reading an artifact identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
  #[error("not a portable executable: {message}")]
  NotPortableExecutable { message: String },

  #[error("not a managed assembly: {message}")]
  NotManagedAssembly { message: String },

  #[error("image truncated at offset {offset:#x}")]
  Truncated { offset: usize },

  #[error("invalid metadata: {message}")]
  InvalidMetadata { message: String },

  #[error("image has no assembly manifest")]
  NoAssembly,

  #[error("assembly name is not valid UTF-8")]
  InvalidName,
}

impl IdentityError {
  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    IdentityError::InvalidMetadata {
      message: message.into(),
    }
  }
}

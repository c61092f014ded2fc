use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
  #[error("invalid version '{value}': {message}")]
  InvalidVersion { value: String, message: String },

  #[error("dependency name must not be empty")]
  EmptyName,
}

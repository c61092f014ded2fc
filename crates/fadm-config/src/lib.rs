//! Fadm Config
//!
//! This crate resolves the configuration fadm runs with: where the local
//! repository lives and, optionally, which package source to fall back to
//! when a dependency is missing from it.
//!
//! Values come from, in order of precedence:
//! - explicit overrides (CLI flags or their environment variables)
//! - a JSON configuration file (`{config_dir}/fadm/config.json` by default)
//! - defaults (`{config_dir}/fadm/repository`, no package source)

mod config;
mod error;

pub use config::{CONFIG_FILE, Config, ConfigFile, Overrides, REPOSITORY_DIR, config_dir};
pub use error::ConfigError;

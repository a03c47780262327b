//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and TOML loading
//! - [`defaults`]: serde default value functions
//! - [`env`]: environment variable overrides
//! - [`validation`]: startup validation

mod defaults;
mod env;
mod types;
mod validation;

pub use types::{Config, LogFormat};
pub use validation::validate;

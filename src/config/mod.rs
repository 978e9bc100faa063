//! Configuration module for the asset pipelines
//!
//! Provides types and parsing for `assetflow.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{
    default_config, find_config, load_config, load_project_config, CliOverrides, ConfigError,
    CONFIG_FILE_NAME,
};
pub use schema::*;

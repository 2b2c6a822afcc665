//! Shared pieces of the vidstats workspace: process configuration and the
//! query-descriptor type exchanged between the intent classifier and the
//! query dispatcher.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod query;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use query::QueryDescriptor;

/// Errors raised while loading process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

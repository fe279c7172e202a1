//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling with HTTP response conversion
//! - Process configuration loaded once from the environment

pub mod config;
pub mod error;

pub use config::{AppConfig, ConfigError, DatabaseConfig, LogConfig, ServerConfig};
pub use error::{AppError, AppResult, OptionExt};

//! Log retirement configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for retire.json
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation with stable error codes

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{PathRewrite, RetireConfig, SizePolicy, TimestampSourceKind};
pub use resolve::{load_config, resolve_config, ConfigSource, ResolvedPath};
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

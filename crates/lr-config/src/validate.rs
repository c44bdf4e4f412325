//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::config::{RetireConfig, SizePolicy};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest accepted size tolerance.
pub const MAX_TOLERANCE_BYTES: u64 = 1024 * 1024;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a retirement configuration semantically.
pub fn validate_config(config: &RetireConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if config.record_sources.is_empty() {
        return Err(ValidationError::SemanticError(
            "record_sources must list at least one position file".to_string(),
        ));
    }

    for (idx, source) in config.record_sources.iter().enumerate() {
        if source.as_os_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("record_sources[{}]", idx),
                message: "Must not be empty".to_string(),
            });
        }
    }

    if let SizePolicy::Tolerant { tolerance_bytes } = config.size_policy {
        if tolerance_bytes > MAX_TOLERANCE_BYTES {
            return Err(ValidationError::InvalidValue {
                field: "size_policy.tolerance_bytes".to_string(),
                message: format!(
                    "Must be at most {}, got {}",
                    MAX_TOLERANCE_BYTES, tolerance_bytes
                ),
            });
        }
    }

    if config.dev_mode {
        let rewrite = &config.path_rewrite;
        if !rewrite.production_root.is_absolute() {
            return Err(ValidationError::InvalidValue {
                field: "path_rewrite.production_root".to_string(),
                message: format!(
                    "Must be an absolute path, got {}",
                    rewrite.production_root.display()
                ),
            });
        }
        if rewrite.local_root.as_os_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "path_rewrite.local_root".to_string(),
                message: "Must not be empty".to_string(),
            });
        }
    }

    if let Some(dir) = &config.event_log_dir {
        if dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "event_log_dir".to_string(),
                message: "Must not be empty when set".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RetireConfig::default()).is_ok());
    }

    #[test]
    fn test_version_mismatch() {
        let config = RetireConfig {
            schema_version: "0.9.0".to_string(),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn test_empty_sources_rejected() {
        let config = RetireConfig {
            record_sources: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_blank_source_rejected() {
        let config = RetireConfig {
            record_sources: vec![PathBuf::from("/tmp/a.pos"), PathBuf::new()],
            ..Default::default()
        };
        match validate_config(&config) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "record_sources[1]")
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_bound() {
        let config = RetireConfig {
            size_policy: SizePolicy::Tolerant {
                tolerance_bytes: MAX_TOLERANCE_BYTES + 1,
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_relative_production_root_rejected_only_in_dev_mode() {
        let mut config = RetireConfig::default();
        config.path_rewrite.production_root = PathBuf::from("var/log/app");
        assert!(validate_config(&config).is_ok());

        config.dev_mode = true;
        assert!(validate_config(&config).is_err());
    }
}

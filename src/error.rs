//! Error handling for Augforge
//!
//! Every error raised inside the augmentation core is recoverable at some
//! granularity (a plugin, a parameter key, a sample, a file). Only
//! configuration problems stop a command before it starts.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Augforge operations
pub type Result<T> = std::result::Result<T, AugError>;

/// Main error type for Augforge operations
#[derive(Error, Debug)]
pub enum AugError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Image Errors
    #[error("Cannot decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode image {path}: {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // Effect Errors
    #[error("Unknown effect type: {effect_type}")]
    UnknownEffect { effect_type: String },

    #[error("Unknown parameter '{name}' for effect {effect_type}")]
    UnknownParameter { effect_type: String, name: String },

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid box geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Transform '{effect_type}' failed: {reason}")]
    TransformFailed { effect_type: String, reason: String },

    // Plugin Errors
    #[error("Invalid plugin definition in {source_name}: {reason}")]
    InvalidPlugin { source_name: String, reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // Collaborator Errors
    #[error("Detector error: {reason}")]
    Detector { reason: String },

    #[error("Background run failed: {reason}")]
    Worker { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AugError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AugError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AugError::FileRead { .. } => "FILE_READ",
            AugError::FileWrite { .. } => "FILE_WRITE",
            AugError::DirectoryCreate { .. } => "DIRECTORY_CREATE",
            AugError::ImageDecode { .. } => "IMAGE_DECODE",
            AugError::ImageEncode { .. } => "IMAGE_ENCODE",
            AugError::UnknownEffect { .. } => "UNKNOWN_EFFECT",
            AugError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            AugError::InvalidParameter { .. } => "INVALID_PARAMETER",
            AugError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            AugError::TransformFailed { .. } => "TRANSFORM_FAILED",
            AugError::InvalidPlugin { .. } => "INVALID_PLUGIN",
            AugError::Config { .. } => "CONFIG",
            AugError::Detector { .. } => "DETECTOR",
            AugError::Worker { .. } => "WORKER",
            AugError::Io(_) => "IO_ERROR",
            AugError::Json(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors are absorbed by the component that detects them
    /// (skip the plugin, keep the old parameter value, fall back to the
    /// original sample, skip the file).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AugError::Config { .. } | AugError::DirectoryCreate { .. })
    }

    /// Shorthand for an invalid parameter error
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AugError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AugError::UnknownEffect {
            effect_type: "SwirlEffect".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_EFFECT");
        assert!(err.to_string().contains("SwirlEffect"));
    }

    #[test]
    fn test_recoverability() {
        assert!(AugError::invalid_param("blur_limit", "not a number").is_recoverable());
        assert!(AugError::InvalidGeometry {
            reason: "zero width".to_string()
        }
        .is_recoverable());
        assert!(!AugError::Config {
            reason: "min_visibility out of range".to_string()
        }
        .is_recoverable());
    }
}

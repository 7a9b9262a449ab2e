//! Run configuration
//!
//! Loaded from a JSON file; every field has a default so a partial file is
//! fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AugError, Result};
use crate::pipeline::DEFAULT_MIN_VISIBILITY;
use crate::registry::PluginSource;

/// Image extensions recognised by default (compared case-insensitively)
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Settings shared by the registry, compositor and dataset runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Boxes keeping less than this fraction of their area are dropped
    pub min_visibility: f64,
    /// Extra plugin directories, scanned in order after the built-in set
    pub plugin_dirs: Vec<PathBuf>,
    pub include_builtin: bool,
    pub image_extensions: Vec<String>,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            min_visibility: DEFAULT_MIN_VISIBILITY,
            plugin_dirs: Vec::new(),
            include_builtin: true,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            seed: None,
        }
    }
}

impl AugmentConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AugError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| AugError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| AugError::Config {
            reason: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(AugError::Config {
                reason: format!("min_visibility {} is outside [0, 1]", self.min_visibility),
            });
        }
        if self.image_extensions.is_empty() {
            return Err(AugError::Config {
                reason: "image_extensions is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Plugin sources in scan order
    pub fn plugin_sources(&self) -> Vec<PluginSource> {
        let mut sources = Vec::with_capacity(self.plugin_dirs.len() + 1);
        if self.include_builtin {
            sources.push(PluginSource::Builtin);
        }
        sources.extend(self.plugin_dirs.iter().cloned().map(PluginSource::Directory));
        sources
    }

    /// True if `path` has one of the configured image extensions
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.image_extensions
                    .iter()
                    .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AugmentConfig::default();
        assert_eq!(config.min_visibility, 0.3);
        assert!(config.include_builtin);
        assert_eq!(config.image_extensions.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("augforge.json");
        fs::write(&path, r#"{"seed": 11, "plugin_dirs": ["plugins"]}"#).unwrap();

        let config = AugmentConfig::from_file(&path).unwrap();
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.min_visibility, 0.3);
        assert_eq!(
            config.plugin_sources(),
            vec![
                PluginSource::Builtin,
                PluginSource::Directory(PathBuf::from("plugins"))
            ]
        );
    }

    #[test]
    fn test_invalid_visibility_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("augforge.json");
        fs::write(&path, r#"{"min_visibility": 1.5}"#).unwrap();

        let err = AugmentConfig::from_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_missing_file() {
        let err = AugmentConfig::from_file(Path::new("/nonexistent/augforge.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_is_image_case_insensitive() {
        let config = AugmentConfig::default();
        assert!(config.is_image(Path::new("a/b/photo.JPG")));
        assert!(config.is_image(Path::new("scan.Png")));
        assert!(!config.is_image(Path::new("notes.txt")));
        assert!(!config.is_image(Path::new("README")));
    }
}

//! Configuration types for the photos migrator

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the photos migrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// App-local root whose subfolders are the staging albums
    pub albums_dir: PathBuf,

    /// Root of the on-disk photo library
    pub library_dir: PathBuf,

    /// Directory for log files
    pub log_dir: PathBuf,

    /// Extensions the library accepts as photos
    pub image_extensions: Vec<String>,

    /// Ask before starting an import or export (they cannot be cancelled)
    pub confirm_before_migrating: bool,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            albums_dir: PathBuf::from("Albums"),
            library_dir: PathBuf::from("Library"),
            log_dir: PathBuf::from("Log"),
            image_extensions: vec![
                "jpg".into(), "jpeg".into(), "png".into(), "gif".into(),
                "bmp".into(), "webp".into(), "heic".into(), "heif".into(),
                "tiff".into(), "tif".into(), "dng".into(),
            ],
            confirm_before_migrating: true,
            verbose: false,
        }
    }
}

impl Config {
    /// Check if a file extension is a supported image format
    pub fn is_image(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.image_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Check whether `path` has a supported image extension
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.is_image(ext))
            .unwrap_or(false)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photos Migrator Configuration File
# This file uses TOML format (https://toml.io)

# Folder whose subfolders are albums. Copy photos into a subfolder,
# then import it: a library album with the same name receives them.
albums_dir = "Albums"

# Location of the photo library
library_dir = "Library"

# Log files are written here
log_dir = "Log"

# Only these extensions are accepted by the library (videos are not supported)
image_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "tiff", "tif", "dng"]

# Imports and exports cannot be cancelled once started; ask first
confirm_before_migrating = true

# Verbose output - show detailed processing information
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert_eq!(config.albums_dir, PathBuf::from("Albums"));
        assert!(config.confirm_before_migrating);
        assert!(config.is_image("JPG"));
        assert!(!config.is_image("mp4"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf").join("migrator.toml");

        let config = Config {
            albums_dir: dir.path().join("albums"),
            verbose: true,
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.albums_dir, config.albums_dir);
        assert!(loaded.verbose);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("verbose = true").unwrap();
        assert!(config.verbose);
        assert_eq!(config.library_dir, PathBuf::from("Library"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::load_from_file("/nonexistent/migrator.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}

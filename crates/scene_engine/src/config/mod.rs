//! Configuration system
//!
//! Configs are plain serde structs stored as TOML or RON, picked by file
//! extension.

pub use serde::{Serialize, Deserialize};

use crate::foundation::logging;
use crate::render::primitives::{CameraData, Viewport};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text in the format implied by `path`'s extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Parsed values are unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Scene-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// `env_logger` filter directives, e.g. `"info"` or `"scene_engine=debug"`
    pub log_level: String,
    /// Viewport the scene projects into by default
    pub viewport: Viewport,
    /// Parameters for cameras created from config
    pub default_camera: CameraData,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            viewport: Viewport::default(),
            default_camera: CameraData::default(),
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Check the viewport and camera parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.viewport.is_valid() {
            return Err(ConfigError::Invalid(format!("viewport {:?} has no area", self.viewport)));
        }
        self.default_camera
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Initialize logging with `log_level`
    ///
    /// Returns `false` if a logger was already installed.
    pub fn init_logging(&self) -> bool {
        logging::init_with_filter(&self.log_level)
    }
}

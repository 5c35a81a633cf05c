//! Launcher configuration
//!
//! Read once at startup from a TOML file. Every field is optional:
//!
//! ```toml
//! theme = 0
//! preview = "cover-then-save"
//!
//! [paths]
//! roms = "/sd/roms"
//! romart = "/sd/romart"
//! saves = "/sd/odroid/data"
//! settings = "/sd/odroid/launcher.json"
//! ```
//!
//! Theme and preview are only startup defaults. Once the user changes them
//! on the device, the values in the settings store take over.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::cover::{AssetPaths, PreviewMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Index into the theme table, wrapped to its size
    pub theme: usize,
    pub preview: PreviewMode,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// One subdirectory per emulator
    pub roms: String,
    /// Cover art root
    pub romart: String,
    /// Save states and their screenshots
    pub saves: String,
    /// JSON settings store
    pub settings: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            theme: 0,
            preview: PreviewMode::CoverThenSave,
            paths: PathsConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            roms: "/sd/roms".into(),
            romart: "/sd/romart".into(),
            saves: "/sd/odroid/data".into(),
            settings: "/sd/odroid/launcher.json".into(),
        }
    }
}

impl LauncherConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = Self::from_toml_str(&text)?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Roots the cover resolver searches
    pub fn asset_paths(&self) -> AssetPaths {
        AssetPaths {
            romart: self.paths.romart.clone(),
            saves: self.paths.saves.clone(),
        }
    }
}

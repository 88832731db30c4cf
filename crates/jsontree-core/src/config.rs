//! Project configuration loaded from `jsontree.toml`

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::layout::LayoutConfig;
use crate::walker::BuildLimits;

/// Name of the project-local config file.
pub const FILE_NAME: &str = "jsontree.toml";

/// Top-level configuration. Every section is optional in the file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonTreeConfig {
    pub layout: LayoutConfig,
    pub limits: BuildLimits,
    pub server: ServerSection,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
    /// Rebuild when the served file changes on disk.
    pub watch: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7890,
            open_browser: false,
            watch: false,
        }
    }
}

impl JsonTreeConfig {
    /// Load `jsontree.toml` from `dir`, falling back to defaults when absent.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(FILE_NAME);
        if !path.exists() {
            debug!("No {} in {}, using defaults", FILE_NAME, dir.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: JsonTreeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let LayoutConfig {
            row_height,
            column_width,
        } = self.layout;
        if !(row_height.is_finite() && row_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout.row_height must be positive, got {row_height}"
            )));
        }
        if !(column_width.is_finite() && column_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "layout.column_width must be positive, got {column_width}"
            )));
        }
        if self.limits.max_depth == 0 {
            return Err(ConfigError::Invalid("limits.max_depth must be at least 1".into()));
        }
        if self.limits.max_nodes == 0 {
            return Err(ConfigError::Invalid("limits.max_nodes must be at least 1".into()));
        }
        Ok(())
    }
}

//! Editor configuration.

use nb_core::{BoardError, Result};
use serde::Deserialize;
use std::path::Path;

/// Per-session board settings.
///
/// Missing fields in a config file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Zoom factor per wheel notch. Default: **1.1**.
    pub wheel_zoom_step: f64,

    /// Pretty-print saved documents. Default: **true**.
    pub pretty: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            wheel_zoom_step: 1.1,
            pretty: true,
        }
    }
}

impl BoardConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BoardError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.wheel_zoom_step.is_finite() || self.wheel_zoom_step <= 0.0 {
            return Err(BoardError::InvalidConfig(format!(
                "wheel_zoom_step must be positive and finite, got {}",
                self.wheel_zoom_step
            )));
        }
        Ok(())
    }
}

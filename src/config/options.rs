use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::core::Size;
use crate::domain::geometry::SizeConstraints;

/// Options a window is created from. Read-only once the window exists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub title: String,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    /// Suppress native decorations and draw chrome manually
    pub frameless: bool,
    pub always_on_top: bool,
    pub resizable: bool,
    /// Clear the window icon instead of loading the application icon
    pub hide_icon: bool,
    pub translucent: bool,
    pub full_screen: bool,
    /// Show the window on the taskbar and let it host tab-navigable children
    pub app_window: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: String::from("Application"),
            width: 1024,
            height: 768,
            min_width: 0,
            min_height: 0,
            max_width: 0,
            max_height: 0,
            frameless: false,
            always_on_top: false,
            resizable: true,
            hide_icon: false,
            translucent: false,
            full_screen: false,
            app_window: true,
        }
    }
}

impl WindowOptions {
    pub fn initial_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn max_size(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    pub fn constraints(&self) -> SizeConstraints {
        SizeConstraints::new(self.min_size(), self.max_size())
    }

    /// Parses options from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let options: WindowOptions = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Checks sizes are positive and min never exceeds a set max.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "initial size must be positive, got {}x{}",
                    self.width, self.height
                ),
            });
        }

        if self.min_width < 0 || self.min_height < 0 || self.max_width < 0 || self.max_height < 0
        {
            return Err(ConfigError::InvalidConfiguration {
                message: String::from("size constraints cannot be negative"),
            });
        }

        if self.max_width > 0 && self.min_width > self.max_width {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "min_width {} exceeds max_width {}",
                    self.min_width, self.max_width
                ),
            });
        }

        if self.max_height > 0 && self.min_height > self.max_height {
            return Err(ConfigError::InvalidConfiguration {
                message: format!(
                    "min_height {} exceeds max_height {}",
                    self.min_height, self.max_height
                ),
            });
        }

        Ok(())
    }
}

/// Loads window options from a TOML file.
pub fn load_options(path: &Path) -> Result<WindowOptions, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    WindowOptions::from_toml_str(&content)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read options file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse options: {message}")]
    Parse { message: String },

    #[error("Invalid window options: {message}")]
    InvalidConfiguration { message: String },
}

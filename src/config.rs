//! Settings parser for cardview.toml

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILENAME: &str = "cardview.toml";

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub text: TextSettings,
    pub image: ImageSettings,
    pub cards: CardsSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 450,
            height: 340,
            title: "Cardview".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    /// TrueType/OpenType font to render with. Without one, text is
    /// measured with an average-advance estimate and drawn as blocks.
    pub font_path: Option<PathBuf>,
    pub base_size: f32,
    /// Font scale for `"size": "Medium"` text blocks.
    pub medium_scale: f32,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_path: None,
            base_size: 14.0,
            medium_scale: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub small_width: u32,
    pub medium_width: u32,
    pub placeholder_height: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            small_width: 50,
            medium_width: 250,
            placeholder_height: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CardsSettings {
    pub dir: PathBuf,
    pub template: String,
    pub data: String,
    /// Locator shown at startup.
    pub initial: String,
}

impl Default for CardsSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            template: "card_template1.json".to_string(),
            data: "card1.json".to_string(),
            initial: "/".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Card style
// ─────────────────────────────────────────────────────────────────────────────

/// Presentation constants the element factories apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    pub medium_text_scale: f32,
    pub small_image_width: u32,
    pub medium_image_width: u32,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for CardStyle {
    fn from(settings: &Settings) -> Self {
        Self {
            medium_text_scale: settings.text.medium_scale,
            small_image_width: settings.image.small_width,
            medium_image_width: settings.image.medium_width,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load settings from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Settings::default();
    }

    match read_settings(path) {
        Ok(settings) => {
            debug!("Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!("{}", e);
            Settings::default()
        }
    }
}

/// Load settings from `path`, failing if it cannot be read or parsed.
pub fn read_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read {:?}: {}", path, e)))?;
    toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse {:?}: {}", path, e)))
}

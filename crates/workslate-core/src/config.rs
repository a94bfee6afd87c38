//! User configuration loaded from `config.toml`.

use crate::assistant::AssistantLevel;
use crate::background::{DEFAULT_GRID_SIZE, GridType};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::import::DEFAULT_MAX_DIMENSION;
use crate::shapes::{PenType, Polygon, SerializableColor, Text};
use crate::storage::DEFAULT_STORAGE_KEY;
use crate::tools::{ToolKind, ToolSettings};
use kurbo::Size;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Could not find config directory")]
    NoConfigDir,
}

/// Remote assistant endpoints and defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub level: AssistantLevel,
    /// Target language name for translations (e.g. "French").
    pub language: String,
    pub chat_url: String,
    pub translate_url: String,
    /// Contact address sent with translation requests, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_email: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            level: AssistantLevel::default(),
            language: "French".to_string(),
            chat_url: "https://text.pollinations.ai/".to_string(),
            translate_url: "https://api.mymemory.translated.net/get".to_string(),
            translate_email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tool: ToolKind,
    pub color: SerializableColor,
    pub pen_size: f64,
    pub pen_type: PenType,
    pub text_size: f64,
    pub font_family: String,
    pub poly_sides: u32,
    pub grid_type: GridType,
    pub grid_size: f64,
    pub snap_to_grid: bool,
    pub history_capacity: usize,
    pub storage_key: String,
    pub import_max_dimension: u32,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub assistant: AssistantConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: SerializableColor::black(),
            pen_size: 3.0,
            pen_type: PenType::Pen,
            text_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            poly_sides: 5,
            grid_type: GridType::Square,
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            import_max_dimension: DEFAULT_MAX_DIMENSION,
            canvas_width: 1280.0,
            canvas_height: 800.0,
            assistant: AssistantConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Clamp out-of-range values back into usable ranges.
    fn validate_and_clamp(&mut self) {
        if !(1.0..=100.0).contains(&self.pen_size) {
            warn!("Invalid pen_size {:.1}, clamping to 1.0-100.0", self.pen_size);
            self.pen_size = self.pen_size.clamp(1.0, 100.0);
        }
        if self.text_size < Text::MIN_FONT_SIZE {
            warn!("Invalid text_size {:.1}, using {}", self.text_size, Text::MIN_FONT_SIZE);
            self.text_size = Text::MIN_FONT_SIZE;
        }
        if !(Polygon::MIN_SIDES..=Polygon::MAX_SIDES).contains(&self.poly_sides) {
            warn!("Invalid poly_sides {}, clamping", self.poly_sides);
            self.poly_sides = self.poly_sides.clamp(Polygon::MIN_SIDES, Polygon::MAX_SIDES);
        }
        if !(5.0..=500.0).contains(&self.grid_size) {
            warn!("Invalid grid_size {:.1}, clamping to 5.0-500.0", self.grid_size);
            self.grid_size = self.grid_size.clamp(5.0, 500.0);
        }
        if self.history_capacity == 0 {
            warn!("history_capacity must be at least 1, using {}", DEFAULT_HISTORY_CAPACITY);
            self.history_capacity = DEFAULT_HISTORY_CAPACITY;
        }
        if self.import_max_dimension < 16 {
            warn!("Invalid import_max_dimension {}, using 16", self.import_max_dimension);
            self.import_max_dimension = 16;
        }
        if self.storage_key.trim().is_empty() {
            warn!("Empty storage_key, using '{}'", DEFAULT_STORAGE_KEY);
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        if self.canvas_width < 1.0 || self.canvas_height < 1.0 {
            warn!("Invalid canvas size, using defaults");
            let defaults = Self::default();
            self.canvas_width = defaults.canvas_width;
            self.canvas_height = defaults.canvas_height;
        }
    }

    /// `~/.config/workslate/config.toml` (platform equivalent).
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("workslate").join("config.toml"))
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)?;
        let mut config: EditorConfig = toml::from_str(&config_str)?;
        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    /// Initial tool settings.
    pub fn tool_settings(&self) -> ToolSettings {
        let mut settings = ToolSettings {
            tool: self.tool,
            color: self.color,
            pen_size: self.pen_size,
            pen_type: self.pen_type,
            text_size: self.text_size,
            font_family: self.font_family.clone(),
            snap_to_grid: self.snap_to_grid,
            ..ToolSettings::default()
        };
        settings.set_poly_sides(self.poly_sides);
        settings
    }
}

// ABOUTME: Layout engine configuration handling.
// ABOUTME: Loads and saves anchor thicknesses, drop policy and sizing floors from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Size;

/// How the space consumed by a drop is shared between the two sides of the
/// new divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Take half from each side; whatever one side cannot give comes from the other
    #[default]
    Balanced,
    /// Take from each side in proportion to what it can give
    Proportional,
}

impl SplitPolicy {
    /// Split `needed` pixels between two sides able to give `side1` and
    /// `side2`. Callers guarantee `needed <= side1 + side2`.
    pub fn split(self, needed: i32, side1: i32, side2: i32) -> (i32, i32) {
        let needed = needed.max(0);
        let side1 = side1.max(0);
        let side2 = side2.max(0);
        let from1 = match self {
            SplitPolicy::Balanced => (needed / 2).min(side1),
            SplitPolicy::Proportional => {
                let total = side1 + side2;
                if total == 0 {
                    0
                } else {
                    (i64::from(needed) * i64::from(side1) / i64::from(total)) as i32
                }
            }
        };
        let from2 = (needed - from1).min(side2);
        let from1 = (needed - from2).min(side1);
        (from1, from2)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Thickness of the four canvas-boundary anchors
    pub static_anchor_thickness: i32,

    /// Thickness of every movable divider
    pub anchor_thickness: i32,

    /// Structural minimum applied to every item regardless of its content
    pub item_floor: Size,

    /// Share of the drop space taken from each side of a new divider
    pub insertion_split: SplitPolicy,

    /// Fraction of the available length given to content with no preferred size
    pub default_drop_fraction: f32,

    /// Initial canvas size
    pub contents_size: Size,

    /// Re-run the sanity check after every mutation and panic on violation
    pub strict_sanity: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            static_anchor_thickness: 1,
            anchor_thickness: 5,
            item_floor: Size::new(10, 10),
            insertion_split: SplitPolicy::Balanced,
            default_drop_fraction: 0.5,
            contents_size: Size::new(1000, 800),
            strict_sanity: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl LayoutConfig {
    /// Thickness for the static or dynamic anchor class
    pub fn thickness(&self, is_static: bool) -> i32 {
        if is_static {
            self.static_anchor_thickness
        } else {
            self.anchor_thickness
        }
    }

    /// Get the default config file path (~/.config/anchor-dock/layout.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("anchor-dock").join("layout.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: LayoutConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.static_anchor_thickness < 0 || self.anchor_thickness < 0 {
            return Err(ConfigError::Invalid(
                "anchor thickness must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.default_drop_fraction) {
            return Err(ConfigError::Invalid(format!(
                "default_drop_fraction {} is outside 0..=1",
                self.default_drop_fraction
            )));
        }
        if self.item_floor.width < 0 || self.item_floor.height < 0 {
            return Err(ConfigError::Invalid("item_floor must not be negative".to_string()));
        }
        Ok(())
    }
}

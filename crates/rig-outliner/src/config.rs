//! Outliner configuration.
//!
//! [`OutlinerConfig`] is a plain serde-backed struct so hosts can embed it in
//! their own settings files. Every field has a default, so partial TOML works:
//!
//! ```
//! use rig_outliner::{IconSize, OutlinerConfig};
//!
//! let config = OutlinerConfig::from_toml_str(r#"
//!     multi_select = false
//!     icon_size = "large"
//! "#).unwrap();
//!
//! assert!(!config.multi_select);
//! assert_eq!(config.icon_size, IconSize::Large);
//! assert_eq!(config.indent_width, 24);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Indentation per depth level, in pixels.
pub const DEFAULT_INDENT_WIDTH: u32 = 24;

/// Label used for the world (root) parent.
pub const DEFAULT_WORLD_LABEL: &str = "world";

/// Icon display state for outline rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconSize {
    /// No icon is drawn.
    Hidden,
    /// 32 pixel icons.
    #[default]
    Small,
    /// 64 pixel icons.
    Large,
}

impl IconSize {
    /// Icon edge length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            Self::Hidden => 0,
            Self::Small => 32,
            Self::Large => 64,
        }
    }

    /// Maps the numeric display state used by older tool settings
    /// (0 = none, 1 = small, 2 = large). Out-of-range values are rejected.
    pub fn from_state(state: u8) -> Option<Self> {
        match state {
            0 => Some(Self::Hidden),
            1 => Some(Self::Small),
            2 => Some(Self::Large),
            _ => None,
        }
    }
}

/// Behavior and presentation settings for an outliner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinerConfig {
    /// When false, ctrl and shift clicks behave like plain clicks.
    pub multi_select: bool,
    /// When true, `add_item` makes new labels unique with a numeric suffix.
    pub unique_labels: bool,
    /// Pixels of indentation per depth level.
    pub indent_width: u32,
    /// Icon display state.
    pub icon_size: IconSize,
    /// Label shown for root-level items' parent.
    pub world_label: String,
}

impl Default for OutlinerConfig {
    fn default() -> Self {
        Self {
            multi_select: true,
            unique_labels: false,
            indent_width: DEFAULT_INDENT_WIDTH,
            icon_size: IconSize::default(),
            world_label: DEFAULT_WORLD_LABEL.to_string(),
        }
    }
}

impl OutlinerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Sets whether multi-selection is enabled.
    pub fn with_multi_select(mut self, enabled: bool) -> Self {
        self.multi_select = enabled;
        self
    }

    /// Sets whether new labels are made unique.
    pub fn with_unique_labels(mut self, enabled: bool) -> Self {
        self.unique_labels = enabled;
        self
    }

    /// Sets the indentation per depth level.
    pub fn with_indent_width(mut self, width: u32) -> Self {
        self.indent_width = width;
        self
    }

    /// Sets the icon display state.
    pub fn with_icon_size(mut self, size: IconSize) -> Self {
        self.icon_size = size;
        self
    }

    /// Sets the label shown for the world parent.
    pub fn with_world_label(mut self, label: impl Into<String>) -> Self {
        self.world_label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutlineError;

    #[test]
    fn test_defaults() {
        let config = OutlinerConfig::default();
        assert!(config.multi_select);
        assert!(!config.unique_labels);
        assert_eq!(config.indent_width, 24);
        assert_eq!(config.icon_size, IconSize::Small);
        assert_eq!(config.world_label, "world");
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = OutlinerConfig::from_toml_str("").unwrap();
        assert_eq!(config, OutlinerConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = OutlinerConfig::from_toml_str(
            "unique_labels = true\nindent_width = 16\nicon_size = \"hidden\"\nworld_label = \"scene\"",
        )
        .unwrap();
        assert!(config.unique_labels);
        assert_eq!(config.indent_width, 16);
        assert_eq!(config.icon_size, IconSize::Hidden);
        assert_eq!(config.world_label, "scene");
    }

    #[test]
    fn test_invalid_toml() {
        let err = OutlinerConfig::from_toml_str("indent_width = \"wide\"").unwrap_err();
        assert!(matches!(err, OutlineError::Config(_)));
        assert!(!err.is_rejected_request());
    }

    #[test]
    fn test_icon_sizes() {
        assert_eq!(IconSize::Hidden.pixels(), 0);
        assert_eq!(IconSize::Small.pixels(), 32);
        assert_eq!(IconSize::Large.pixels(), 64);
        assert_eq!(IconSize::from_state(2), Some(IconSize::Large));
        assert_eq!(IconSize::from_state(3), None);
    }

    #[test]
    fn test_builder() {
        let config = OutlinerConfig::default()
            .with_multi_select(false)
            .with_indent_width(10)
            .with_world_label("root");
        assert!(!config.multi_select);
        assert_eq!(config.indent_width, 10);
        assert_eq!(config.world_label, "root");
    }
}

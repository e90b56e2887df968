//! Overlay configuration.
//!
//! Gaps, offsets and flip multipliers are plain data handed to the geometry engine when it is
//! constructed. Nothing here is global: two editors on the same page can run with different
//! spacing.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default distance between the panel and its target, in pixels.
pub const DEFAULT_VERTICAL_GAP: f64 = 10.0;
/// Default horizontal inset from the target/scroller edges, in pixels.
pub const DEFAULT_HORIZONTAL_OFFSET: f64 = 5.0;
/// Gap multiplier used when the bubble toolbar flips below its target.
pub const DEFAULT_BUBBLE_FLIP_MULTIPLIER: f64 = 2.0;
/// Gap multiplier used when the link editor flips below its target.
///
/// The link editor is taller and sits on dense inline text, so it gets more clearance.
/// Empirically tuned; change it freely.
pub const DEFAULT_LINK_FLIP_MULTIPLIER: f64 = 9.0;

/// Configuration for [`GeometryEngine`](crate::geometry::GeometryEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Default gap between the panel and its target.
    pub vertical_gap: f64,
    /// Default horizontal inset.
    pub horizontal_offset: f64,
    /// Gap multiplier applied when a bubble-style panel flips below the target.
    pub bubble_flip_multiplier: f64,
    /// Gap multiplier applied when a link-style panel flips below the target.
    pub link_flip_multiplier: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            vertical_gap: DEFAULT_VERTICAL_GAP,
            horizontal_offset: DEFAULT_HORIZONTAL_OFFSET,
            bubble_flip_multiplier: DEFAULT_BUBBLE_FLIP_MULTIPLIER,
            link_flip_multiplier: DEFAULT_LINK_FLIP_MULTIPLIER,
        }
    }
}

impl GeometryConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GeometryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("vertical_gap", self.vertical_gap),
            ("horizontal_offset", self.horizontal_offset),
            ("bubble_flip_multiplier", self.bubble_flip_multiplier),
            ("link_flip_multiplier", self.link_flip_multiplier),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }

    /// The multiplier used for a flip of the given panel kind.
    pub fn flip_multiplier(&self, is_link_flip: bool) -> f64 {
        if is_link_flip {
            self.link_flip_multiplier
        } else {
            self.bubble_flip_multiplier
        }
    }
}

/// Top-level configuration for the overlays attached to one editor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Geometry engine settings.
    pub geometry: GeometryConfig,
    /// Override for the bubble toolbar's vertical gap.
    pub bubble_vertical_gap: Option<f64>,
    /// Override for the link editor's vertical gap.
    pub link_vertical_gap: Option<f64>,
}

impl OverlayConfig {
    /// Parse from JSON, validating the geometry section.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: OverlayConfig = serde_json::from_str(json)?;
        config.geometry.validate()?;
        for (field, value) in [
            ("bubble_vertical_gap", config.bubble_vertical_gap),
            ("link_vertical_gap", config.link_vertical_gap),
        ] {
            if let Some(value) = value
                && (!value.is_finite() || value < 0.0)
            {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(config)
    }

    /// Vertical gap used by the bubble toolbar.
    pub fn bubble_gap(&self) -> f64 {
        self.bubble_vertical_gap.unwrap_or(self.geometry.vertical_gap)
    }

    /// Vertical gap used by the link editor.
    pub fn link_gap(&self) -> f64 {
        self.link_vertical_gap.unwrap_or(self.geometry.vertical_gap)
    }
}

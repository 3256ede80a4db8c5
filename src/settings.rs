//! Game settings and tuning
//!
//! Every number the gameplay layer uses lives here so a session can be
//! reshaped from a JSON file without touching code.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Layout preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LayoutPreset {
    #[default]
    Desktop,
    /// Small touch screens get half-size segments
    Compact,
}

impl LayoutPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPreset::Desktop => "Desktop",
            LayoutPreset::Compact => "Compact",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Some(LayoutPreset::Desktop),
            "compact" | "mobile" => Some(LayoutPreset::Compact),
            _ => None,
        }
    }

    /// Segment width and height for this preset
    pub fn segment_size(&self) -> Vec2 {
        match self {
            LayoutPreset::Desktop => Vec2::new(90.0, 180.0),
            LayoutPreset::Compact => Vec2::new(45.0, 90.0),
        }
    }
}

/// Material properties applied to every falling segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentMaterial {
    pub restitution: f32,
    pub friction: f32,
    /// Fraction of velocity lost to drag each tick
    pub friction_air: f32,
    pub density: f32,
}

impl Default for SegmentMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.5,
            friction_air: 0.002,
            density: 0.001,
        }
    }
}

/// Game tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutPreset,

    // === Play area ===
    pub view_width: f32,
    pub view_height: f32,
    pub ground_height: f32,
    pub wall_thickness: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    /// Distance from the bottom of the view to the platform center
    pub platform_bottom_offset: f32,

    // === Segments ===
    /// Drop height in world space; x is always the horizontal center
    pub drop_y: f32,
    /// Override for the preset's segment size
    pub segment_size: Option<Vec2>,
    pub material: SegmentMaterial,
    /// Live segment cap (oldest landed segments are evicted beyond it)
    pub max_live_segments: usize,

    // === Control ===
    /// Horizontal nudge speed (px/s)
    pub move_speed: f32,
    /// Downward speed while fast drop is held (px/s)
    pub fast_drop_speed: f32,
    /// Gravity (px/s²)
    pub gravity: f32,

    // === Camera ===
    pub camera_smoothing: f32,
    /// The highest segment is held at `view_height - camera_offset` in view
    /// space once the camera starts to follow
    pub camera_offset: f32,

    // === Outcome ===
    /// A landed segment whose top edge rises above this world y wins
    pub success_y: f32,
    /// How far below the platform top an off-platform segment may sink
    pub platform_fall_grace: f32,
    /// World y the lower edge of a landed segment must not pass
    pub ground_fail_y: f32,
    /// Maximum absolute rotation before a segment counts as spinning out
    pub spin_limit: f32,

    // === Session ===
    /// Spawn the next segment automatically once the active one lands
    pub auto_spawn: bool,
    /// Segments also land on top of already-landed segments
    pub land_on_stack: bool,
    /// Measure stack height (camera target, success) from settled segments
    /// only, so abandoned segments still in the air never count
    pub settled_height: bool,
    /// Keep the drop point a fixed distance above the top of the view
    /// instead of at a fixed world position
    pub drop_follows_view: bool,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: LayoutPreset::Desktop,

            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,
            ground_height: GROUND_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            platform_width: PLATFORM_WIDTH,
            platform_height: PLATFORM_HEIGHT,
            platform_bottom_offset: PLATFORM_BOTTOM_OFFSET,

            drop_y: DROP_Y,
            segment_size: None,
            material: SegmentMaterial::default(),
            max_live_segments: MAX_LIVE_SEGMENTS,

            // 3 px/frame at 60 Hz
            move_speed: 180.0,
            fast_drop_speed: 600.0,
            gravity: 540.0,

            camera_smoothing: CAMERA_SMOOTHING,
            // Camera holds still until something rises above the drop point
            camera_offset: 700.0,

            success_y: 100.0,
            platform_fall_grace: 40.0,
            ground_fail_y: VIEW_HEIGHT,
            spin_limit: SPIN_LIMIT,

            auto_spawn: true,
            land_on_stack: true,
            settled_height: false,
            drop_follows_view: false,
            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Create settings from a layout preset (applies preset defaults)
    pub fn from_preset(preset: LayoutPreset) -> Self {
        Self {
            layout: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Check the values the gameplay layer depends on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.view_width <= 0.0 || self.view_height <= 0.0 {
            return Err(SettingsError::invalid("view", "dimensions must be positive"));
        }
        if self.platform_width <= 0.0 || self.platform_width > self.view_width {
            return Err(SettingsError::invalid(
                "platform_width",
                format!("must be in (0, {}]", self.view_width),
            ));
        }
        if self.max_live_segments < 2 {
            return Err(SettingsError::invalid(
                "max_live_segments",
                "need room for the active segment and one landed segment",
            ));
        }
        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(SettingsError::invalid("camera_smoothing", "must be in (0, 1]"));
        }
        let size = self.segment_size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(SettingsError::invalid("segment_size", "must be positive"));
        }
        if self.spin_limit <= 0.0 {
            return Err(SettingsError::invalid("spin_limit", "must be positive"));
        }
        Ok(())
    }

    /// Effective segment size (explicit override wins over the preset)
    pub fn segment_size(&self) -> Vec2 {
        self.segment_size.unwrap_or_else(|| self.layout.segment_size())
    }

    /// Where new segments appear. Only moves with the view when
    /// `drop_follows_view` is set.
    pub fn drop_point(&self, camera_offset: f32) -> Vec2 {
        let scroll = if self.drop_follows_view { camera_offset } else { 0.0 };
        Vec2::new(self.view_width / 2.0, self.drop_y - scroll)
    }

    /// Platform center
    pub fn platform_center(&self) -> Vec2 {
        Vec2::new(
            self.view_width / 2.0,
            self.view_height - self.platform_bottom_offset,
        )
    }

    /// Horizontal span of the platform as (left, right)
    pub fn platform_span(&self) -> (f32, f32) {
        let half = self.platform_width / 2.0;
        let center = self.view_width / 2.0;
        (center - half, center + half)
    }

    /// Upper surface of the platform (world y, y grows downward)
    pub fn platform_top(&self) -> f32 {
        self.platform_center().y - self.platform_height / 2.0
    }

    /// Lower-edge limit for a segment hanging off the platform
    pub fn platform_fail_y(&self) -> f32 {
        self.platform_top() + self.platform_fall_grace
    }

    /// Ground center
    pub fn ground_center(&self) -> Vec2 {
        Vec2::new(
            self.view_width / 2.0,
            self.view_height - self.ground_height / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_preset_parsing() {
        assert_eq!(LayoutPreset::from_str("MOBILE"), Some(LayoutPreset::Compact));
        assert_eq!(LayoutPreset::from_str("desktop"), Some(LayoutPreset::Desktop));
        assert_eq!(LayoutPreset::from_str("tablet"), None);
        assert_eq!(LayoutPreset::Compact.as_str(), "Compact");
    }

    #[test]
    fn test_default_geometry() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.platform_span(), (250.0, 550.0));
        assert_eq!(s.platform_top(), 490.0);
        assert_eq!(s.drop_point(0.0), Vec2::new(400.0, -100.0));
        assert_eq!(s.drop_point(250.0), Vec2::new(400.0, -100.0));
        assert_eq!(s.segment_size(), Vec2::new(90.0, 180.0));
        assert_eq!(
            Settings::from_preset(LayoutPreset::Compact).segment_size(),
            Vec2::new(45.0, 90.0)
        );
    }

    #[test]
    fn test_drop_point_can_follow_the_view() {
        let s = Settings {
            drop_follows_view: true,
            ..Settings::default()
        };
        assert_eq!(s.drop_point(250.0), Vec2::new(400.0, -350.0));
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let s = Settings::from_json(r#"{ "max_live_segments": 5, "layout": "Compact" }"#)
            .expect("valid settings");
        assert_eq!(s.max_live_segments, 5);
        assert_eq!(s.layout, LayoutPreset::Compact);
        assert_eq!(s.view_width, VIEW_WIDTH);
    }

    #[test]
    fn test_from_json_rejects_tiny_cap() {
        let err = Settings::from_json(r#"{ "max_live_segments": 1 }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "max_live_segments",
                ..
            }
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Parse(_))
        ));
    }
}

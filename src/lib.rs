//! Pose Stack - a gravity-driven stacking game
//!
//! Core modules:
//! - `sim`: Gameplay orchestration (spawning, control, landing, camera, outcome)
//! - `physics`: Physics backend seam plus a small built-in AABB world
//! - `assets`: Visual catalog with readiness signals
//! - `settings`: Data-driven game tuning

pub mod assets;
pub mod error;
pub mod physics;
pub mod settings;
pub mod sim;

pub use assets::{AssetCatalog, CatalogEntry};
pub use error::{SettingsError, SpawnError};
pub use settings::{LayoutPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Play area dimensions
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;
    pub const GROUND_HEIGHT: f32 = 60.0;
    pub const WALL_THICKNESS: f32 = 60.0;

    /// Platform defaults - the ledge segments must stack on
    pub const PLATFORM_WIDTH: f32 = 300.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    /// Distance from the bottom of the view to the platform center
    pub const PLATFORM_BOTTOM_OFFSET: f32 = 100.0;

    /// Segment spawn height, relative to the top of the view
    pub const DROP_Y: f32 = -100.0;

    /// Live (non-static) segment cap
    pub const MAX_LIVE_SEGMENTS: usize = 30;

    /// Per-tick exponential camera approach factor
    pub const CAMERA_SMOOTHING: f32 = 0.1;
    /// Wall height as a multiple of the view height
    pub const WALL_HEIGHT_FACTOR: f32 = 3.0;

    /// Runaway spin limit (two full turns)
    pub const SPIN_LIMIT: f32 = 2.0 * std::f32::consts::TAU;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle_wraps_into_range() {
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
        assert!((normalize_angle(PI) + PI).abs() < 1e-5);
    }
}

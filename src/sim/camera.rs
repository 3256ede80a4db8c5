//! Vertical camera follow and side-wall regeneration
//!
//! The camera offset is how far the view has scrolled up. It approaches its
//! target by a fixed fraction every tick, so follow speed scales with tick rate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Entities, GameEvent, GameState, StaticGeometry};
use crate::consts::WALL_HEIGHT_FACTOR;
use crate::physics::{Aabb, BodyDesc, BodyHandle, PhysicsBackend};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current upward scroll (world units, >= 0 once settled)
    pub offset: f32,
    pub target: f32,
}

impl Camera {
    /// Offset that keeps `highest_y` at `offset_constant` below the top of
    /// the view. Never scrolls below the starting position.
    pub fn target_for(highest_y: Option<f32>, view_height: f32, offset_constant: f32) -> f32 {
        match highest_y {
            Some(y) => (-(y - view_height + offset_constant)).max(0.0),
            None => 0.0,
        }
    }

    /// One smoothing step toward `target`. Returns true if the offset moved.
    pub fn approach(&mut self, target: f32, smoothing: f32) -> bool {
        self.target = target;
        let previous = self.offset;
        self.offset += (target - self.offset) * smoothing;
        self.offset != previous
    }

    /// Visible world rectangle for a view of the given size
    pub fn viewport(&self, view_width: f32, view_height: f32) -> Aabb {
        Aabb::new(
            Vec2::new(0.0, -self.offset),
            Vec2::new(view_width, view_height - self.offset),
        )
    }
}

/// Create both side walls flush with the current camera offset
pub fn build_walls<B: PhysicsBackend>(
    physics: &mut B,
    settings: &Settings,
    offset: f32,
) -> (BodyHandle, BodyHandle) {
    let center_y = settings.view_height / 2.0 - offset;
    let size = Vec2::new(
        settings.wall_thickness,
        settings.view_height * WALL_HEIGHT_FACTOR,
    );
    let left = physics.create_body(BodyDesc::fixed(Vec2::new(0.0, center_y), size));
    let right = physics.create_body(BodyDesc::fixed(
        Vec2::new(settings.view_width, center_y),
        size,
    ));
    (left, right)
}

/// Replace the side walls so they cover the view at `offset`
pub fn regenerate_walls<B: PhysicsBackend>(
    physics: &mut B,
    statics: &mut StaticGeometry,
    settings: &Settings,
    offset: f32,
) {
    physics.remove_body(statics.left_wall);
    physics.remove_body(statics.right_wall);
    let (left, right) = build_walls(physics, settings, offset);
    statics.left_wall = left;
    statics.right_wall = right;
}

/// Topmost (smallest y) center among all segments, falling ones included.
/// With `settled_only`, only segments resting on the stack are considered.
pub fn highest_segment_y<B: PhysicsBackend>(
    entities: &Entities,
    physics: &B,
    settled_only: bool,
) -> Option<f32> {
    entities
        .iter()
        .filter(|s| !settled_only || s.settled())
        .filter_map(|s| physics.body(s.body))
        .filter(|b| !b.is_static)
        .map(|b| b.position.y)
        .min_by(f32::total_cmp)
}

/// Per-tick camera update: retarget, smooth, and move the walls if the view moved
pub fn update_camera<B: PhysicsBackend>(
    camera: &mut Camera,
    state: &mut GameState,
    entities: &Entities,
    physics: &mut B,
    statics: &mut StaticGeometry,
    settings: &Settings,
) {
    let target = Camera::target_for(
        highest_segment_y(entities, physics, settings.settled_height),
        settings.view_height,
        settings.camera_offset,
    );
    if camera.approach(target, settings.camera_smoothing) {
        regenerate_walls(physics, statics, settings, camera.offset);
        state.events.push(GameEvent::WallsRegenerated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::SimpleWorld;
    use proptest::prelude::*;

    #[test]
    fn test_target_clamps_at_zero() {
        // Low stack: no scroll
        assert_eq!(Camera::target_for(Some(400.0), 600.0, 300.0), 0.0);
        assert_eq!(Camera::target_for(None, 600.0, 300.0), 0.0);
        // Stack top at y=100 pulls the view up by 200
        assert_eq!(Camera::target_for(Some(100.0), 600.0, 300.0), 200.0);
    }

    #[test]
    fn test_viewport_tracks_offset() {
        let camera = Camera {
            offset: 150.0,
            target: 150.0,
        };
        let view = camera.viewport(800.0, 600.0);
        assert_eq!(view.min, Vec2::new(0.0, -150.0));
        assert_eq!(view.max, Vec2::new(800.0, 450.0));
    }

    #[test]
    fn test_walls_follow_camera() {
        let settings = Settings::default();
        let mut physics = SimpleWorld::default();
        let (left, right) = build_walls(&mut physics, &settings, 0.0);
        let mut statics = StaticGeometry {
            ground: BodyHandle(0),
            platform: BodyHandle(0),
            left_wall: left,
            right_wall: right,
        };

        regenerate_walls(&mut physics, &mut statics, &settings, 200.0);

        assert!(physics.body(left).is_none());
        assert!(physics.body(right).is_none());
        let wall = physics.body(statics.left_wall).expect("new wall");
        assert!(wall.is_static);
        assert_eq!(wall.position, Vec2::new(0.0, 100.0));
        assert_eq!(wall.size.y, 1800.0);
        let right_wall = physics.body(statics.right_wall).expect("new wall");
        assert_eq!(right_wall.position.x, settings.view_width);
    }

    fn scene_with_active_at(y: f32) -> (Entities, SimpleWorld) {
        let settings = Settings::default();
        let mut physics = SimpleWorld::default();
        let body = physics.create_body(BodyDesc::dynamic(
            Vec2::new(400.0, y),
            settings.segment_size(),
            settings.material,
        ));
        let mut entities = Entities::new();
        let id = entities.insert(body, "pose".into(), settings.segment_size(), 0);
        entities.set_active(Some(id));
        (entities, physics)
    }

    #[test]
    fn test_target_follows_falling_segment() {
        let (entities, physics) = scene_with_active_at(-100.0);
        let highest = highest_segment_y(&entities, &physics, false);
        assert_eq!(highest, Some(-100.0));
        assert_eq!(Camera::target_for(highest, 600.0, 300.0), 400.0);
        // Only settled segments count when asked
        assert_eq!(highest_segment_y(&entities, &physics, true), None);
    }

    #[test]
    fn test_update_camera_moves_walls() {
        let (entities, mut physics) = scene_with_active_at(-100.0);
        let settings = Settings {
            camera_offset: 300.0,
            ..Settings::default()
        };
        let (left_wall, right_wall) = build_walls(&mut physics, &settings, 0.0);
        let mut statics = StaticGeometry {
            ground: BodyHandle(90),
            platform: BodyHandle(91),
            left_wall,
            right_wall,
        };
        let mut camera = Camera::default();
        let mut state = GameState::default();

        update_camera(&mut camera, &mut state, &entities, &mut physics, &mut statics, &settings);
        assert_eq!(camera.target, 400.0);
        assert!((camera.offset - 40.0).abs() < 1e-4);
        assert_ne!(statics.left_wall, left_wall);
        assert_eq!(state.events, vec![GameEvent::WallsRegenerated]);
    }

    #[test]
    fn test_settled_camera_stops_moving() {
        let mut camera = Camera::default();
        assert!(!camera.approach(0.0, 0.1));
        assert!(camera.approach(100.0, 0.1));
        assert!((camera.offset - 10.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_error_shrinks_geometrically(start in 0.0f32..2000.0, target in 0.0f32..2000.0) {
            let mut camera = Camera { offset: start, target };
            let mut error = (target - camera.offset).abs();
            for _ in 0..50 {
                camera.approach(target, 0.1);
                let next = (target - camera.offset).abs();
                prop_assert!((next - error * 0.9).abs() <= 1e-3 + error * 1e-4);
                error = next;
            }
        }
    }
}

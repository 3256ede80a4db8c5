//! A play session: the world context every gameplay step runs against
//!
//! Owns the physics backend, the segment table, static geometry handles and
//! the camera. Hosts drive it with `start_game`, `tick` and `restart_game`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::{Camera, build_walls};
use super::spawner::spawn_segment;
use super::state::{Entities, GameEvent, GameState, Outcome, StaticGeometry};
use super::tick::{TickInput, tick};
use crate::assets::AssetCatalog;
use crate::error::SpawnError;
use crate::physics::{Aabb, BodyDesc, PhysicsBackend, SimpleWorld};
use crate::settings::Settings;

/// Presentation data for one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentView {
    pub id: u32,
    pub key: String,
    pub position: Vec2,
    pub angle: f32,
    pub size: Vec2,
    pub landed: bool,
    /// Counts toward stack height
    pub settled: bool,
    pub active: bool,
}

/// Everything the presentation and UI layers read after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub segments: Vec<SegmentView>,
    pub viewport: Aabb,
    pub elapsed_time: f64,
    pub landed_count: u32,
    pub is_playing: bool,
    pub outcome: Option<Outcome>,
}

/// A play session over a physics backend. One instance lives for the whole
/// app; `restart_game` reuses it.
pub struct Session<B: PhysicsBackend> {
    pub(crate) settings: Settings,
    pub(crate) catalog: AssetCatalog,
    pub(crate) physics: B,
    pub(crate) rng: Pcg32,
    pub(crate) state: GameState,
    pub(crate) entities: Entities,
    pub(crate) statics: Option<StaticGeometry>,
    pub(crate) camera: Camera,
}

impl Session<SimpleWorld> {
    /// Session backed by the built-in world, using the configured gravity
    pub fn with_simple_world(settings: Settings, catalog: AssetCatalog) -> Self {
        let physics = SimpleWorld::new(Vec2::new(0.0, settings.gravity));
        Self::new(settings, catalog, physics)
    }
}

impl<B: PhysicsBackend> Session<B> {
    pub fn new(settings: Settings, catalog: AssetCatalog, physics: B) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            state: GameState::new(settings.max_live_segments),
            settings,
            catalog,
            physics,
            entities: Entities::new(),
            statics: None,
            camera: Camera::default(),
        }
    }

    /// Begin a session. Ignored while one is already running.
    pub fn start_game(&mut self, now: f64) {
        if self.state.is_playing {
            log::warn!("start_game called during a running session");
            return;
        }
        self.begin(now);
    }

    /// Throw away the current session and start a fresh one
    pub fn restart_game(&mut self, now: f64) {
        log::info!("Restarting session");
        self.begin(now);
    }

    fn begin(&mut self, now: f64) {
        self.physics.clear();
        self.entities.clear();
        self.camera = Camera::default();
        self.state.max_live_segments = self.settings.max_live_segments;
        self.state.reset(now);

        let s = &self.settings;
        let ground = self.physics.create_body(BodyDesc::fixed(
            s.ground_center(),
            Vec2::new(s.view_width, s.ground_height),
        ));
        let platform = self.physics.create_body(BodyDesc::fixed(
            s.platform_center(),
            Vec2::new(s.platform_width, s.platform_height),
        ));
        let (left_wall, right_wall) = build_walls(&mut self.physics, s, 0.0);
        self.statics = Some(StaticGeometry {
            ground,
            platform,
            left_wall,
            right_wall,
        });

        log::info!(
            "Session started (seed {}, cap {}, layout {})",
            self.settings.seed,
            self.state.max_live_segments,
            self.settings.layout.as_str()
        );

        if let Err(e) = self.spawn_next() {
            log::warn!("First segment not spawned yet: {e}");
        }
    }

    /// Spawn the next segment, forcing the current one to count as landed
    pub fn spawn_next(&mut self) -> Result<u32, SpawnError> {
        spawn_segment(
            &mut self.state,
            &mut self.entities,
            &mut self.physics,
            &self.catalog,
            &self.settings,
            self.camera.offset,
            &mut self.rng,
        )
    }

    /// Advance one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        tick(self, input, dt);
    }

    pub(crate) fn end(&mut self, outcome: Outcome) {
        self.state.is_playing = false;
        self.state.outcome = Some(outcome);
        self.state.events.push(GameEvent::GameOver(outcome));
        log::info!(
            "Game over: {} ({} landed, {:.1}s)",
            outcome.message(),
            self.state.landed_count,
            self.state.elapsed_time
        );
    }

    /// Snapshot for rendering and HUD display
    pub fn frame(&self) -> Frame {
        let active = self.entities.active_id();
        let segments = self
            .entities
            .iter()
            .filter_map(|segment| {
                let body = self.physics.body(segment.body)?;
                Some(SegmentView {
                    id: segment.id,
                    key: segment.key.clone(),
                    position: body.position,
                    angle: body.angle,
                    size: segment.size,
                    landed: segment.landed(),
                    settled: segment.settled(),
                    active: active == Some(segment.id),
                })
            })
            .collect();

        Frame {
            segments,
            viewport: self
                .camera
                .viewport(self.settings.view_width, self.settings.view_height),
            elapsed_time: self.state.elapsed_time,
            landed_count: self.state.landed_count,
            is_playing: self.state.is_playing,
            outcome: self.state.outcome,
        }
    }

    /// Landed segments still present in the world (evictions lower this)
    pub fn stack_size(&self) -> usize {
        self.entities.landed().count()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn statics(&self) -> Option<&StaticGeometry> {
        self.statics.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn physics(&self) -> &B {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut B {
        &mut self.physics
    }

    /// Hosts report asset load results here
    pub fn catalog_mut(&mut self) -> &mut AssetCatalog {
        &mut self.catalog
    }
}

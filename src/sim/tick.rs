//! Fixed timestep simulation tick
//!
//! One pass per display frame: spawn, control, physics step, landing,
//! camera, outcome. Once the session is over every tick is a cheap no-op.

use super::camera::update_camera;
use super::control::{Command, apply_control};
use super::landing::{process_collisions, settle_resting};
use super::outcome::evaluate;
use super::session::Session;
use crate::error::SpawnError;
use crate::physics::PhysicsBackend;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held
    pub move_left: bool,
    pub move_right: bool,
    pub fast_drop: bool,
    /// One-shot
    pub rotate_cw: bool,
    pub rotate_ccw: bool,
    pub spawn_next: bool,
}

impl TickInput {
    pub fn press(&mut self, command: Command) {
        match command {
            Command::MoveLeft => self.move_left = true,
            Command::MoveRight => self.move_right = true,
            Command::FastDrop => self.fast_drop = true,
            Command::RotateCw => self.rotate_cw = true,
            Command::RotateCcw => self.rotate_ccw = true,
            Command::SpawnNext => self.spawn_next = true,
        }
    }

    /// Release a held command. One-shots clear themselves after each tick.
    pub fn release(&mut self, command: Command) {
        match command {
            Command::MoveLeft => self.move_left = false,
            Command::MoveRight => self.move_right = false,
            Command::FastDrop => self.fast_drop = false,
            _ => {}
        }
    }

    /// Press a command by name. Unknown names are ignored.
    pub fn press_named(&mut self, name: &str) -> bool {
        match Command::from_str(name) {
            Some(command) => {
                self.press(command);
                true
            }
            None => false,
        }
    }

    /// Clear one-shot inputs after processing
    pub fn clear_one_shots(&mut self) {
        self.rotate_cw = false;
        self.rotate_ccw = false;
        self.spawn_next = false;
    }
}

/// Advance the session by one fixed timestep
pub fn tick<B: PhysicsBackend>(session: &mut Session<B>, input: &TickInput, dt: f32) {
    session.state.events.clear();
    if !session.state.is_playing {
        return;
    }
    let Some(mut statics) = session.statics else {
        return;
    };

    session.state.time_ticks += 1;
    session.state.elapsed_time += f64::from(dt);

    let wants_spawn =
        input.spawn_next || (session.settings.auto_spawn && session.entities.active_id().is_none());
    if wants_spawn {
        match session.spawn_next() {
            Ok(_) => {}
            Err(SpawnError::AssetUnavailable { key }) if !input.spawn_next => {
                log::debug!("Auto-spawn waiting for asset '{key}'");
            }
            Err(e) => log::warn!("Spawn failed: {e}"),
        }
    }

    apply_control(&session.entities, &mut session.physics, input, &session.settings);

    session.physics.step(dt);
    let collisions = session.physics.drain_collision_starts();
    process_collisions(
        &mut session.state,
        &mut session.entities,
        &statics,
        &collisions,
        session.settings.land_on_stack,
    );
    settle_resting(&mut session.entities, &session.physics, &statics);

    update_camera(
        &mut session.camera,
        &mut session.state,
        &session.entities,
        &mut session.physics,
        &mut statics,
        &session.settings,
    );
    session.statics = Some(statics);

    if let Some(outcome) = evaluate(
        &session.state,
        &session.entities,
        &session.physics,
        &session.settings,
    ) {
        session.end(outcome);
    }
}

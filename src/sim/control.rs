//! Player control of the active segment

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Entities;
use super::tick::TickInput;
use crate::normalize_angle;
use crate::physics::PhysicsBackend;
use crate::settings::Settings;

/// Discrete commands from the input/UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    FastDrop,
    RotateCw,
    RotateCcw,
    SpawnNext,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::FastDrop => "fastDrop",
            Command::RotateCw => "rotateCW",
            Command::RotateCcw => "rotateCCW",
            Command::SpawnNext => "spawnNext",
        }
    }

    /// Parse a command name or key code. Unknown input yields `None` and is
    /// meant to be ignored.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" | "left" | "arrowleft" => Some(Command::MoveLeft),
            "moveright" | "right" | "arrowright" => Some(Command::MoveRight),
            "fastdrop" | "drop" | "arrowdown" => Some(Command::FastDrop),
            "rotatecw" | "space" | "arrowup" => Some(Command::RotateCw),
            "rotateccw" | "keyz" => Some(Command::RotateCcw),
            "spawnnext" | "enter" => Some(Command::SpawnNext),
            _ => None,
        }
    }

    /// Held commands stay active until released; the rest fire once
    pub fn is_held(&self) -> bool {
        matches!(self, Command::MoveLeft | Command::MoveRight | Command::FastDrop)
    }
}

/// Angle after `quarter_turns` clockwise quarter turns, wrapped to [-π, π)
pub fn rotated_angle(current: f32, quarter_turns: i32) -> f32 {
    normalize_angle(current + quarter_turns as f32 * FRAC_PI_2)
}

/// Drive the active segment from this tick's input. Does nothing once the
/// segment has landed or when nothing is active.
pub fn apply_control<B: PhysicsBackend>(
    entities: &Entities,
    physics: &mut B,
    input: &TickInput,
    settings: &Settings,
) {
    let Some(segment) = entities.active().filter(|s| !s.landed()) else {
        return;
    };
    let Some(body) = physics.body(segment.body) else {
        return;
    };

    let direction = match (input.move_left, input.move_right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    let vy = if input.fast_drop {
        settings.fast_drop_speed
    } else {
        body.velocity.y
    };
    physics.set_velocity(segment.body, Vec2::new(direction * settings.move_speed, vy));

    let quarter_turns = i32::from(input.rotate_cw) - i32::from(input.rotate_ccw);
    if quarter_turns != 0 {
        physics.set_angle(segment.body, rotated_angle(body.angle, quarter_turns));
        physics.set_angular_velocity(segment.body, 0.0);
    }
}

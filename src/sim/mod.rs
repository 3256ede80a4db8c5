//! Gameplay orchestration
//!
//! Everything above the physics backend lives here:
//! - Spawning and the live-segment cap
//! - Control of the single active segment
//! - Landing transitions driven by collision events
//! - Camera follow and wall regeneration
//! - Win/loss detection
//!
//! All of it runs single-threaded, once per fixed tick.

pub mod camera;
pub mod control;
pub mod landing;
pub mod outcome;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use control::Command;
pub use session::{Frame, SegmentView, Session};
pub use state::{
    Entities, FailureReason, GameEvent, GameState, Outcome, Segment, StaticGeometry,
};
pub use tick::{TickInput, tick};

//! Physics backend
//!
//! Gameplay talks to rigid bodies only through [`PhysicsBackend`]. The
//! crate ships [`SimpleWorld`] so sessions can run without an external engine.

pub mod backend;
pub mod world;

pub use backend::{Aabb, BodyDesc, BodyHandle, BodyInfo, CollisionStart, PhysicsBackend};
pub use world::SimpleWorld;

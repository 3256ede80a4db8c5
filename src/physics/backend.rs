//! The seam between gameplay rules and whatever integrates rigid bodies
//!
//! Gameplay code only ever holds [`BodyHandle`]s and resolves them through
//! the backend, so bodies can be removed or regenerated without leaving
//! dangling references behind.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::SegmentMaterial;

/// Opaque identifier for a body owned by a physics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Axis-aligned bounding box (world space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Bounds of a `size` rectangle rotated by `angle` around `center`
    pub fn from_rotated_rect(center: Vec2, size: Vec2, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let half = size / 2.0;
        let extent = Vec2::new(
            cos.abs() * half.x + sin.abs() * half.y,
            sin.abs() * half.x + cos.abs() * half.y,
        );
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Overlap extents along each axis, if the boxes intersect
    pub fn overlap(&self, other: &Aabb) -> Option<Vec2> {
        let x = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let y = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        (x > 0.0 && y > 0.0).then_some(Vec2::new(x, y))
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub is_static: bool,
    pub material: SegmentMaterial,
}

impl BodyDesc {
    /// Immovable rectangle (ground, platform, walls)
    pub fn fixed(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            angle: 0.0,
            is_static: true,
            material: SegmentMaterial::default(),
        }
    }

    /// Rectangle driven by gravity and contacts
    pub fn dynamic(position: Vec2, size: Vec2, material: SegmentMaterial) -> Self {
        Self {
            position,
            size,
            angle: 0.0,
            is_static: false,
            material,
        }
    }
}

/// Snapshot of a body as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    pub handle: BodyHandle,
    pub is_static: bool,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Continuous angle in radians (not wrapped)
    pub angle: f32,
    pub angular_velocity: f32,
    pub size: Vec2,
    pub mass: f32,
    pub bounds: Aabb,
}

/// Two bodies started touching during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionStart {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl CollisionStart {
    /// Pair with handles in ascending order
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        if a <= b { Self { a, b } } else { Self { a: b, b: a } }
    }

    /// The other body, if `handle` is part of this pair
    pub fn other(&self, handle: BodyHandle) -> Option<BodyHandle> {
        if self.a == handle {
            Some(self.b)
        } else if self.b == handle {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Operations the gameplay layer consumes from a rigid-body simulation
pub trait PhysicsBackend {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Remove a body. Returns false if the handle was already gone.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);

    fn set_angle(&mut self, handle: BodyHandle, angle: f32);

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32);

    fn body(&self, handle: BodyHandle) -> Option<BodyInfo>;

    /// All bodies, static flag included, in stable handle order
    fn bodies(&self) -> Vec<BodyInfo>;

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Collision-start notifications accumulated since the last drain
    fn drain_collision_starts(&mut self) -> Vec<CollisionStart>;

    /// Remove every body and pending notification
    fn clear(&mut self);
}

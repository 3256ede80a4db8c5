//! Small built-in rigid-body world
//!
//! Boxes only, resolved as axis-aligned bounds of their rotated rectangles.
//! Good enough to drive the game headless and in tests; a full engine can
//! sit behind [`PhysicsBackend`] instead.
//!
//! Contacts never apply torque: bodies only turn when gameplay sets their
//! angle or angular velocity. Boxes cannot tip over here, so the runaway-spin
//! failure only shows up with a backend that models rotation.

use std::collections::HashSet;

use glam::Vec2;

use super::backend::{Aabb, BodyDesc, BodyHandle, BodyInfo, CollisionStart, PhysicsBackend};

/// Position-correction passes per step
const SOLVER_ITERATIONS: u32 = 4;

/// Result of a box-box overlap test
#[derive(Debug, Clone, Copy)]
struct Contact {
    /// Separation direction, pointing from the first body to the second
    normal: Vec2,
    /// Penetration depth along `normal`
    penetration: f32,
}

fn box_contact(a: &Aabb, b: &Aabb) -> Option<Contact> {
    let overlap = a.overlap(b)?;
    let delta = b.center() - a.center();
    let contact = if overlap.x < overlap.y {
        Contact {
            normal: Vec2::new(if delta.x < 0.0 { -1.0 } else { 1.0 }, 0.0),
            penetration: overlap.x,
        }
    } else {
        Contact {
            normal: Vec2::new(0.0, if delta.y < 0.0 { -1.0 } else { 1.0 }),
            penetration: overlap.y,
        }
    };
    Some(contact)
}

#[derive(Debug, Clone)]
struct Body {
    handle: BodyHandle,
    desc: BodyDesc,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    angular_velocity: f32,
    mass: f32,
}

impl Body {
    fn bounds(&self) -> Aabb {
        Aabb::from_rotated_rect(self.position, self.desc.size, self.angle)
    }

    fn inverse_mass(&self) -> f32 {
        if self.desc.is_static || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    fn info(&self) -> BodyInfo {
        BodyInfo {
            handle: self.handle,
            is_static: self.desc.is_static,
            position: self.position,
            velocity: self.velocity,
            angle: self.angle,
            angular_velocity: self.angular_velocity,
            size: self.desc.size,
            mass: self.mass,
            bounds: self.bounds(),
        }
    }
}

/// Box world with gravity, air drag and inelastic contacts
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    gravity: Vec2,
    /// Sorted by handle for stable iteration
    bodies: Vec<Body>,
    next_handle: u32,
    /// Pairs touching at the end of the last step
    contacts: HashSet<CollisionStart>,
    pending: Vec<CollisionStart>,
}

impl SimpleWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            next_handle: 1,
            contacts: HashSet::new(),
            pending: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Teleport a body (scenario setup, debugging)
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.find_mut(handle) {
            body.position = position;
        }
    }

    fn find_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| &mut self.bodies[i])
    }

    fn integrate(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| !b.desc.is_static) {
            let drag = 1.0 - body.desc.material.friction_air;
            body.velocity = (body.velocity + self.gravity * dt) * drag;
            body.angular_velocity *= drag;
            body.position += body.velocity * dt;
            body.angle += body.angular_velocity * dt;
        }
    }

    /// Push apart one overlapping pair and cancel its approaching velocity
    fn resolve(&mut self, i: usize, j: usize, contact: Contact) {
        let (head, tail) = self.bodies.split_at_mut(j);
        let a = &mut head[i];
        let b = &mut tail[0];

        let inv_a = a.inverse_mass();
        let inv_b = b.inverse_mass();
        let inv_total = inv_a + inv_b;
        if inv_total <= 0.0 {
            return;
        }

        let correction = contact.normal * contact.penetration / inv_total;
        a.position -= correction * inv_a;
        b.position += correction * inv_b;

        let relative = b.velocity - a.velocity;
        let normal_speed = relative.dot(contact.normal);
        if normal_speed >= 0.0 {
            return;
        }

        let restitution = a.desc.material.restitution.max(b.desc.material.restitution);
        let impulse = -(1.0 + restitution) * normal_speed / inv_total;
        a.velocity -= contact.normal * impulse * inv_a;
        b.velocity += contact.normal * impulse * inv_b;

        let tangent = contact.normal.perp();
        let tangent_speed = (b.velocity - a.velocity).dot(tangent);
        let mu = (a.desc.material.friction * b.desc.material.friction).sqrt();
        let limit = mu * impulse;
        let friction = (-tangent_speed / inv_total).clamp(-limit, limit);
        a.velocity -= tangent * friction * inv_a;
        b.velocity += tangent * friction * inv_b;
    }
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, 540.0))
    }
}

impl PhysicsBackend for SimpleWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        let mass = if desc.is_static {
            0.0
        } else {
            desc.material.density * desc.size.x * desc.size.y
        };
        // Handles grow monotonically, so pushing keeps the list sorted
        self.bodies.push(Body {
            handle,
            desc,
            position: desc.position,
            velocity: Vec2::ZERO,
            angle: desc.angle,
            angular_velocity: 0.0,
            mass,
        });
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        match self.bodies.binary_search_by_key(&handle, |b| b.handle) {
            Ok(index) => {
                self.bodies.remove(index);
                self.contacts.retain(|pair| pair.other(handle).is_none());
                self.pending.retain(|pair| pair.other(handle).is_none());
                true
            }
            Err(_) => false,
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.find_mut(handle) {
            body.velocity = velocity;
        }
    }

    fn set_angle(&mut self, handle: BodyHandle, angle: f32) {
        if let Some(body) = self.find_mut(handle) {
            body.angle = angle;
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) {
        if let Some(body) = self.find_mut(handle) {
            body.angular_velocity = angular_velocity;
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<BodyInfo> {
        self.bodies
            .binary_search_by_key(&handle, |b| b.handle)
            .ok()
            .map(|i| self.bodies[i].info())
    }

    fn bodies(&self) -> Vec<BodyInfo> {
        self.bodies.iter().map(Body::info).collect()
    }

    fn step(&mut self, dt: f32) {
        self.integrate(dt);

        let mut touching = HashSet::new();
        for _ in 0..SOLVER_ITERATIONS {
            for i in 0..self.bodies.len() {
                for j in (i + 1)..self.bodies.len() {
                    if self.bodies[i].desc.is_static && self.bodies[j].desc.is_static {
                        continue;
                    }
                    let Some(contact) = box_contact(&self.bodies[i].bounds(), &self.bodies[j].bounds())
                    else {
                        continue;
                    };
                    touching.insert(CollisionStart::new(self.bodies[i].handle, self.bodies[j].handle));
                    self.resolve(i, j, contact);
                }
            }
        }

        let mut started: Vec<_> = touching.difference(&self.contacts).copied().collect();
        started.sort_by_key(|pair| (pair.a, pair.b));
        self.pending.extend(started);
        self.contacts = touching;
    }

    fn drain_collision_starts(&mut self) -> Vec<CollisionStart> {
        std::mem::take(&mut self.pending)
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.contacts.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SegmentMaterial;

    fn world_with_floor() -> (SimpleWorld, BodyHandle) {
        let mut world = SimpleWorld::new(Vec2::new(0.0, 540.0));
        let floor = world.create_body(BodyDesc::fixed(Vec2::new(0.0, 100.0), Vec2::new(400.0, 20.0)));
        (world, floor)
    }

    #[test]
    fn test_box_falls_and_rests_on_floor() {
        let (mut world, floor) = world_with_floor();
        let block = world.create_body(BodyDesc::dynamic(
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 20.0),
            SegmentMaterial::default(),
        ));

        let mut started = Vec::new();
        for _ in 0..240 {
            world.step(1.0 / 60.0);
            started.extend(world.drain_collision_starts());
        }

        let info = world.body(block).expect("block exists");
        // Floor top is at y=90, block half height 10
        assert!((info.position.y - 80.0).abs() < 1.5, "y = {}", info.position.y);
        assert!(info.velocity.y.abs() < 20.0);
        assert_eq!(started, vec![CollisionStart::new(floor, block)]);
    }

    #[test]
    fn test_overhanging_box_does_not_tip() {
        let (mut world, _floor) = world_with_floor();
        // Floor spans x in [-200, 200]; most of the block hangs past the edge
        let block = world.create_body(BodyDesc::dynamic(
            Vec2::new(205.0, 0.0),
            Vec2::new(20.0, 20.0),
            SegmentMaterial::default(),
        ));

        for _ in 0..240 {
            world.step(1.0 / 60.0);
        }

        let info = world.body(block).expect("block exists");
        assert_eq!(info.angle, 0.0);
        assert_eq!(info.angular_velocity, 0.0);
        assert!((info.position.y - 80.0).abs() < 1.5, "y = {}", info.position.y);
    }

    #[test]
    fn test_static_bodies_never_move() {
        let (mut world, floor) = world_with_floor();
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let info = world.body(floor).expect("floor exists");
        assert_eq!(info.position, Vec2::new(0.0, 100.0));
        assert!(world.drain_collision_starts().is_empty());
    }

    #[test]
    fn test_remove_body_forgets_handle() {
        let (mut world, floor) = world_with_floor();
        assert!(world.remove_body(floor));
        assert!(!world.remove_body(floor));
        assert!(world.body(floor).is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn test_handles_are_not_reused_after_clear() {
        let (mut world, floor) = world_with_floor();
        world.clear();
        let next = world.create_body(BodyDesc::fixed(Vec2::ZERO, Vec2::ONE));
        assert_ne!(next, floor);
    }
}

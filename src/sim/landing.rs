//! Falling -> Landed transitions
//!
//! Collision-start notifications are drained from the backend once per tick
//! and consumed here, so rule timing never depends on callback order.
//!
//! A landed segment is *settled* once it rests on the platform, the ground
//! or another settled segment. Hosts that measure stack height from settled
//! segments only (`Settings::settled_height`) ignore abandoned segments still
//! in the air.

use super::state::{Entities, GameEvent, GameState, StaticGeometry};
use crate::physics::{Aabb, BodyHandle, CollisionStart, PhysicsBackend};

/// Vertical gap (either way) still counted as resting contact
const SETTLE_TOLERANCE: f32 = 3.0;

/// Land a segment. Increments the score and releases control exactly once
/// per segment; later calls are no-ops returning false.
pub fn land(state: &mut GameState, entities: &mut Entities, id: u32, forced: bool) -> bool {
    let Some(segment) = entities.get_mut(id) else {
        return false;
    };
    if !segment.mark_landed() {
        return false;
    }

    state.landed_count += 1;
    if entities.active_id() == Some(id) {
        entities.set_active(None);
    }
    state.events.push(GameEvent::Landed { id, forced });
    log::debug!(
        "Segment {id} landed{} (total {})",
        if forced { " (forced)" } else { "" },
        state.landed_count
    );
    true
}

/// Apply this tick's collision starts. Returns the id of the segment that
/// landed, if any. Touching the platform, the ground or (with
/// `land_on_stack`) any landed segment lands the active segment. It settles
/// at once when the thing it touched is itself a settled support.
pub fn process_collisions(
    state: &mut GameState,
    entities: &mut Entities,
    statics: &StaticGeometry,
    collisions: &[CollisionStart],
    land_on_stack: bool,
) -> Option<u32> {
    for pair in collisions {
        let active = entities.active()?;
        let Some(other) = pair.other(active.body) else {
            continue;
        };

        let below = entities.by_body(other);
        let on_stack = land_on_stack && below.is_some_and(|s| s.landed());
        if !statics.is_landing_surface(other) && !on_stack {
            continue;
        }
        let settles = statics.is_landing_surface(other) || below.is_some_and(|s| s.settled());

        let id = active.id;
        if land(state, entities, id, false) {
            if settles {
                if let Some(segment) = entities.get_mut(id) {
                    segment.mark_settled();
                }
            }
            return Some(id);
        }
    }
    None
}

fn rests_on(upper: &Aabb, lower: &Aabb) -> bool {
    (lower.min.y - upper.max.y).abs() <= SETTLE_TOLERANCE
        && upper.min.x < lower.max.x
        && upper.max.x > lower.min.x
}

/// Settle landed segments that now rest on the platform, the ground or a
/// settled segment. Falling segments are never touched; landing only happens
/// in [`process_collisions`]. Repeats until nothing changes so a whole chain
/// settles in one call. Returns the ids settled.
pub fn settle_resting<B: PhysicsBackend>(
    entities: &mut Entities,
    physics: &B,
    statics: &StaticGeometry,
) -> Vec<u32> {
    let bounds_of = |body: BodyHandle| physics.body(body).map(|info| info.bounds);
    let ground = [statics.platform, statics.ground]
        .into_iter()
        .filter_map(bounds_of)
        .collect::<Vec<_>>();

    let mut settled = Vec::new();
    loop {
        let stack: Vec<Aabb> = entities
            .settled()
            .filter_map(|s| bounds_of(s.body))
            .collect();

        let resting: Vec<u32> = entities
            .landed()
            .filter(|s| !s.settled())
            .filter_map(|s| bounds_of(s.body).map(|bounds| (s.id, bounds)))
            .filter(|(_, bounds)| {
                ground.iter().chain(&stack).any(|support| rests_on(bounds, support))
            })
            .map(|(id, _)| id)
            .collect();

        if resting.is_empty() {
            return settled;
        }
        for id in resting {
            if let Some(segment) = entities.get_mut(id) {
                segment.mark_settled();
                log::debug!("Segment {id} settled");
                settled.push(id);
            }
        }
    }
}

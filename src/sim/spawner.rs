//! Segment spawning and the live-segment cap

use glam::Vec2;
use rand::Rng;

use super::landing;
use super::state::{Entities, GameEvent, GameState};
use crate::assets::AssetCatalog;
use crate::error::SpawnError;
use crate::physics::{BodyDesc, PhysicsBackend};
use crate::settings::Settings;

/// Remove the oldest landed segments until there is room for one more.
/// The falling segment is never a candidate. Returns the evicted ids.
pub fn evict_for_spawn<B: PhysicsBackend>(
    state: &mut GameState,
    entities: &mut Entities,
    physics: &mut B,
) -> Vec<u32> {
    let mut evicted = Vec::new();
    while entities.live_count() >= state.max_live_segments {
        let Some(id) = entities.oldest_landed() else {
            break;
        };
        if let Some(segment) = entities.remove(id) {
            physics.remove_body(segment.body);
            state.events.push(GameEvent::Evicted { id });
            evicted.push(id);
        }
    }
    if !evicted.is_empty() {
        log::debug!("Evicted {} segment(s): {:?}", evicted.len(), evicted);
    }
    evicted
}

/// Create the next segment at the drop point and hand it control.
/// `camera_offset` only matters when the drop point follows the view.
///
/// The catalog entry is picked and checked before anything changes, so a
/// failed spawn leaves the world untouched. An abandoned falling segment is
/// counted as landed before control moves on.
pub fn spawn_segment<B, R>(
    state: &mut GameState,
    entities: &mut Entities,
    physics: &mut B,
    catalog: &AssetCatalog,
    settings: &Settings,
    camera_offset: f32,
    rng: &mut R,
) -> Result<u32, SpawnError>
where
    B: PhysicsBackend,
    R: Rng + ?Sized,
{
    if !state.is_playing {
        return Err(SpawnError::NotPlaying);
    }
    if catalog.is_empty() {
        return Err(SpawnError::EmptyCatalog);
    }
    let entry = catalog
        .get(rng.random_range(0..catalog.len()))
        .ok_or(SpawnError::EmptyCatalog)?;
    if !entry.ready {
        return Err(SpawnError::AssetUnavailable {
            key: entry.key.clone(),
        });
    }

    evict_for_spawn(state, entities, physics);

    if let Some(previous) = entities.active_id() {
        landing::land(state, entities, previous, true);
        entities.set_active(None);
    }

    let size = settings.segment_size();
    let body = physics.create_body(BodyDesc::dynamic(
        settings.drop_point(camera_offset),
        size,
        settings.material,
    ));
    // Falls from rest, whatever the backend defaults to
    physics.set_velocity(body, Vec2::ZERO);
    physics.set_angular_velocity(body, 0.0);

    let id = entities.insert(body, entry.key.clone(), size, state.time_ticks);
    entities.set_active(Some(id));
    state.events.push(GameEvent::Spawned {
        id,
        key: entry.key.clone(),
    });
    log::debug!("Spawned segment {id} ({})", entry.key);
    Ok(id)
}

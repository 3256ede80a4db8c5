//! Game state and core gameplay types
//!
//! Bodies live in the physics backend; everything here refers to them by
//! [`BodyHandle`] and segment id, resolved by lookup each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_LIVE_SEGMENTS;
use crate::physics::BodyHandle;

/// Why a session ended badly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Slid off the platform and sank past the grace distance
    OffPlatform,
    /// Lower edge passed the ground-fail line
    BelowGround,
    /// Rotated more than the spin limit
    RunawaySpin,
}

/// Terminal result of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure(FailureReason),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Short message for the end screen
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Success => "The stack reached the top!",
            Outcome::Failure(FailureReason::OffPlatform) => "A piece fell off the platform",
            Outcome::Failure(FailureReason::BelowGround) => "A piece fell below the ground",
            Outcome::Failure(FailureReason::RunawaySpin) => "A piece spun out of control",
        }
    }
}

/// Something that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: u32, key: String },
    /// `forced` when the segment was abandoned for the next one mid-air
    Landed { id: u32, forced: bool },
    Evicted { id: u32 },
    WallsRegenerated,
    GameOver(Outcome),
}

/// A falling or landed game piece
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    pub body: BodyHandle,
    /// Visual/shape key from the asset catalog
    pub key: String,
    pub size: Vec2,
    landed: bool,
    /// Resting on the platform, the ground or another settled segment
    settled: bool,
    /// Tick the segment was created on
    pub spawned_tick: u64,
}

impl Segment {
    pub fn landed(&self) -> bool {
        self.landed
    }

    /// Falling -> Landed. Returns false if it had already landed.
    pub fn mark_landed(&mut self) -> bool {
        if self.landed {
            return false;
        }
        self.landed = true;
        true
    }

    /// Only settled segments count toward stack height
    pub fn settled(&self) -> bool {
        self.settled
    }

    /// Record that a landed segment rests on the stack. Returns false if it
    /// was already settled or has not landed.
    pub fn mark_settled(&mut self) -> bool {
        if !self.landed || self.settled {
            return false;
        }
        self.settled = true;
        true
    }
}

/// Entity table for segments plus the single active reference
#[derive(Debug, Clone)]
pub struct Entities {
    /// Sorted by id, which is also spawn order
    segments: Vec<Segment>,
    active: Option<u32>,
    next_id: u32,
}

impl Default for Entities {
    fn default() -> Self {
        Self::new()
    }
}

impl Entities {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            active: None,
            next_id: 1,
        }
    }

    /// Add a new falling segment and return its id
    pub fn insert(&mut self, body: BodyHandle, key: String, size: Vec2, tick: u64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.segments.push(Segment {
            id,
            body,
            key,
            size,
            landed: false,
            settled: false,
            spawned_tick: tick,
        });
        id
    }

    pub fn remove(&mut self, id: u32) -> Option<Segment> {
        let index = self.segments.binary_search_by_key(&id, |s| s.id).ok()?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.segments.remove(index))
    }

    pub fn get(&self, id: u32) -> Option<&Segment> {
        self.segments
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.segments[i])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Segment> {
        self.segments
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &mut self.segments[i])
    }

    /// Segment owning a physics body, if any
    pub fn by_body(&self, body: BodyHandle) -> Option<&Segment> {
        self.segments.iter().find(|s| s.body == body)
    }

    pub fn by_body_mut(&mut self, body: BodyHandle) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.body == body)
    }

    pub fn active_id(&self) -> Option<u32> {
        self.active
    }

    pub fn active(&self) -> Option<&Segment> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn set_active(&mut self, id: Option<u32>) {
        self.active = id;
    }

    /// All live segments, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn landed(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.landed)
    }

    /// Landed segments resting on the stack
    pub fn settled(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.settled)
    }

    pub fn oldest_landed(&self) -> Option<u32> {
        self.landed().next().map(|s| s.id)
    }

    pub fn live_count(&self) -> usize {
        self.segments.len()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.active = None;
    }
}

/// Static level geometry handles. Walls are replaced whenever the camera moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGeometry {
    pub ground: BodyHandle,
    pub platform: BodyHandle,
    pub left_wall: BodyHandle,
    pub right_wall: BodyHandle,
}

impl StaticGeometry {
    /// Surfaces a segment can land on directly
    pub fn is_landing_surface(&self, body: BodyHandle) -> bool {
        body == self.ground || body == self.platform
    }

    pub fn is_wall(&self, body: BodyHandle) -> bool {
        body == self.left_wall || body == self.right_wall
    }
}

/// Session-wide record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub is_playing: bool,
    /// Host clock (seconds) when the session started
    pub start_time: f64,
    /// Seconds of play in this session
    pub elapsed_time: f64,
    /// Cumulative landings; eviction never lowers it
    pub landed_count: u32,
    /// Live segment cap
    pub max_live_segments: usize,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Set once the session ends
    pub outcome: Option<Outcome>,
    /// Events from the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(MAX_LIVE_SEGMENTS)
    }
}

impl GameState {
    pub fn new(max_live_segments: usize) -> Self {
        Self {
            is_playing: false,
            start_time: 0.0,
            elapsed_time: 0.0,
            landed_count: 0,
            max_live_segments,
            time_ticks: 0,
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Fresh record for a new session starting at `now`
    pub fn reset(&mut self, now: f64) {
        *self = Self {
            is_playing: true,
            start_time: now,
            ..Self::new(self.max_live_segments)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_landed_is_one_way() {
        let mut entities = Entities::new();
        let id = entities.insert(BodyHandle(4), "pose".into(), Vec2::ONE, 0);
        let segment = entities.get_mut(id).expect("segment exists");
        assert!(!segment.landed());
        assert!(segment.mark_landed());
        assert!(!segment.mark_landed());
        assert!(segment.landed());
    }

    #[test]
    fn test_only_landed_segments_settle() {
        let mut entities = Entities::new();
        let id = entities.insert(BodyHandle(4), "pose".into(), Vec2::ONE, 0);
        let segment = entities.get_mut(id).expect("segment exists");
        assert!(!segment.mark_settled());
        segment.mark_landed();
        assert!(segment.mark_settled());
        assert!(!segment.mark_settled());
        assert_eq!(entities.settled().count(), 1);
    }

    #[test]
    fn test_oldest_landed_skips_falling() {
        let mut entities = Entities::new();
        let a = entities.insert(BodyHandle(1), "a".into(), Vec2::ONE, 0);
        let b = entities.insert(BodyHandle(2), "b".into(), Vec2::ONE, 1);
        assert_eq!(entities.oldest_landed(), None);

        if let Some(s) = entities.get_mut(b) {
            s.mark_landed();
        }
        assert_eq!(entities.oldest_landed(), Some(b));
        if let Some(s) = entities.get_mut(a) {
            s.mark_landed();
        }
        assert_eq!(entities.oldest_landed(), Some(a));
    }

    #[test]
    fn test_removing_active_clears_reference() {
        let mut entities = Entities::new();
        let id = entities.insert(BodyHandle(1), "a".into(), Vec2::ONE, 0);
        entities.set_active(Some(id));
        assert!(entities.remove(id).is_some());
        assert_eq!(entities.active_id(), None);
        assert!(entities.remove(id).is_none());
    }

    #[test]
    fn test_reset_keeps_cap() {
        let mut state = GameState::new(12);
        state.landed_count = 9;
        state.outcome = Some(Outcome::Success);
        state.reset(42.0);
        assert!(state.is_playing);
        assert_eq!(state.landed_count, 0);
        assert_eq!(state.start_time, 42.0);
        assert_eq!(state.max_live_segments, 12);
        assert!(state.outcome.is_none());
    }
}

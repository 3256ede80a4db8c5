//! Win/loss detection over landed segments
//!
//! Falling segments are never judged. Failures are checked before success so
//! a stack that collapses on the same tick it reaches the top still loses.
//! With `settled_height`, only settled segments count toward the top, so an
//! abandoned segment still in the air can lose the game but never win it.

use super::state::{Entities, FailureReason, GameState, Outcome};
use crate::physics::{BodyInfo, PhysicsBackend};
use crate::settings::Settings;

/// Failure condition for a single landed body, if any
pub fn check_failure(body: &BodyInfo, settings: &Settings) -> Option<FailureReason> {
    if body.angle.abs() > settings.spin_limit {
        return Some(FailureReason::RunawaySpin);
    }

    let bounds = body.bounds;
    if bounds.max.y > settings.ground_fail_y {
        return Some(FailureReason::BelowGround);
    }

    let (left, right) = settings.platform_span();
    let off_platform = bounds.min.x < left || bounds.max.x > right;
    if off_platform && bounds.max.y > settings.platform_fail_y() {
        return Some(FailureReason::OffPlatform);
    }

    None
}

/// Evaluate the landed stack once. Returns `None` while the session should
/// continue or when no session is running.
pub fn evaluate<B: PhysicsBackend>(
    state: &GameState,
    entities: &Entities,
    physics: &B,
    settings: &Settings,
) -> Option<Outcome> {
    if !state.is_playing {
        return None;
    }

    let mut top: Option<f32> = None;
    for segment in entities.landed() {
        let Some(body) = physics.body(segment.body) else {
            continue;
        };
        if let Some(reason) = check_failure(&body, settings) {
            log::debug!("Segment {} failed: {:?}", segment.id, reason);
            return Some(Outcome::Failure(reason));
        }
        if !settings.settled_height || segment.settled() {
            let upper = body.bounds.min.y;
            top = Some(top.map_or(upper, |t| t.min(upper)));
        }
    }

    top.filter(|&y| y < settings.success_y)
        .map(|_| Outcome::Success)
}

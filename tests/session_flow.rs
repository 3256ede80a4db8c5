//! Whole-session runs on the built-in physics world

use pose_stack::consts::SIM_DT;
use pose_stack::physics::{PhysicsBackend, SimpleWorld};
use pose_stack::sim::{Command, FailureReason, GameEvent, Outcome, Session, TickInput};
use pose_stack::{AssetCatalog, Settings};

/// One minute of play at 60 Hz
const TICK_LIMIT: usize = 3600;

fn session(settings: Settings) -> Session<SimpleWorld> {
    let catalog = AssetCatalog::preloaded(["pose_a", "pose_b", "pose_c"]);
    let mut session = Session::with_simple_world(settings, catalog);
    session.start_game(0.0);
    session
}

/// At most one segment is ever falling, and it is the active one
fn assert_single_active(session: &Session<SimpleWorld>) {
    let falling: Vec<u32> = session
        .entities()
        .iter()
        .filter(|s| !s.landed())
        .map(|s| s.id)
        .collect();
    assert!(falling.len() <= 1, "several falling segments: {falling:?}");
    if let Some(id) = falling.first() {
        assert_eq!(session.entities().active_id(), Some(*id));
    }
}

/// Tick until the session ends, collecting every event
fn play(session: &mut Session<SimpleWorld>, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..TICK_LIMIT {
        if !session.state().is_playing {
            break;
        }
        session.tick(input, SIM_DT);
        events.extend(session.state().events.iter().cloned());
        assert_single_active(session);
    }
    events
}

/// Height measured from resting segments, drop point and success line
/// placed for a tall, scrolling stack
fn tall_stack_settings() -> Settings {
    Settings::from_json(
        r#"{
            "settled_height": true,
            "drop_follows_view": true,
            "camera_offset": 300.0,
            "success_y": -600.0
        }"#,
    )
    .expect("valid settings")
}

#[test]
fn test_untouched_stack_reaches_the_top() {
    let mut session = session(Settings::default());
    let events = play(&mut session, &TickInput::default());

    assert_eq!(session.state().outcome, Some(Outcome::Success));
    assert!(!session.state().is_playing);
    // Three upright segments clear the line
    assert_eq!(session.state().landed_count, 3);
    // Nothing rose above the drop point, so the view never scrolled
    assert_eq!(session.camera().offset, 0.0);
    assert!(matches!(
        events.last(),
        Some(GameEvent::GameOver(Outcome::Success))
    ));
}

#[test]
fn test_tall_stack_scrolls_the_view() {
    let mut session = session(tall_stack_settings());
    let events = play(&mut session, &TickInput::default());

    assert_eq!(session.state().outcome, Some(Outcome::Success));
    assert!(session.state().landed_count >= 6);
    assert!(session.camera().offset > 0.0);
    assert!(events.contains(&GameEvent::WallsRegenerated));

    // Walls follow the view
    let statics = session.statics().copied().expect("level built");
    let wall = session
        .physics()
        .body(statics.left_wall)
        .expect("wall exists");
    let view = session.frame().viewport;
    assert!(wall.bounds.min.y <= view.min.y && wall.bounds.max.y >= view.max.y);
}

#[test]
fn test_drifting_off_the_platform_fails() {
    let mut session = session(Settings::default());
    let mut input = TickInput::default();
    input.press(Command::MoveLeft);
    play(&mut session, &input);

    assert_eq!(
        session.state().outcome,
        Some(Outcome::Failure(FailureReason::OffPlatform))
    );
    assert_eq!(session.state().landed_count, 1);
}

#[test]
fn test_live_segments_stay_under_the_cap() {
    let settings =
        Settings::from_json(r#"{ "layout": "Compact", "max_live_segments": 3 }"#).expect("valid");
    let mut session = session(settings);

    let mut evicted = 0;
    for _ in 0..TICK_LIMIT {
        if !session.state().is_playing || session.state().landed_count >= 5 {
            break;
        }
        session.tick(&TickInput::default(), SIM_DT);
        assert!(session.entities().live_count() <= 3);
        assert_single_active(&session);
        evicted += session
            .state()
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Evicted { .. }))
            .count();
    }

    assert!(session.state().landed_count >= 3);
    assert!(evicted > 0);
    // Score is cumulative even though old segments are gone
    assert!(session.state().landed_count as usize > session.stack_size());
}

#[test]
fn test_restart_after_game_over() {
    let mut session = session(Settings::default());
    let mut input = TickInput::default();
    input.press(Command::MoveLeft);
    play(&mut session, &input);
    assert!(session.state().outcome.is_some());

    session.restart_game(60.0);
    assert!(session.state().is_playing);
    assert_eq!(session.state().outcome, None);
    assert_eq!(session.state().landed_count, 0);
    assert_eq!(session.entities().live_count(), 1);
    assert_eq!(session.camera().offset, 0.0);

    // The fresh session plays normally
    session.tick(&TickInput::default(), SIM_DT);
    assert_eq!(session.state().time_ticks, 1);
}

#[test]
fn test_abandoned_segment_above_the_line_wins() {
    let mut session = session(Settings::default());
    let spawn = TickInput {
        spawn_next: true,
        ..Default::default()
    };
    session.tick(&spawn, SIM_DT);
    // The abandoned segment hangs at the drop point, above the line
    assert_eq!(session.state().outcome, Some(Outcome::Success));
}

#[test]
fn test_abandoned_segments_do_not_count_as_height() {
    let mut session = session(tall_stack_settings());
    let spawn = TickInput {
        spawn_next: true,
        ..Default::default()
    };
    for _ in 0..3 {
        session.tick(&spawn, SIM_DT);
    }
    assert!(session.state().landed_count >= 3);
    assert_eq!(session.state().outcome, None);
    assert_eq!(session.entities().settled().count(), 0);
}

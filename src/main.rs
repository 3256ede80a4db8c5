//! Pose Stack headless runner
//!
//! Plays one session on the built-in physics world with a simple autopilot
//! and logs what happens. Usage: `pose-stack [settings.json] [max_seconds]`

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use pose_stack::consts::{MAX_SUBSTEPS, SIM_DT};
    use pose_stack::physics::SimpleWorld;
    use pose_stack::sim::{Command, GameEvent, Session, TickInput};
    use pose_stack::{AssetCatalog, Settings};

    /// Simulated display refresh, slower than the sim so substeps kick in
    const FRAME_DT: f32 = 1.0 / 50.0;
    /// How far off the stack line the autopilot tolerates
    const STEER_DEADBAND: f32 = 4.0;

    pub struct Runner {
        session: Session<SimpleWorld>,
        accumulator: f32,
        input: TickInput,
        time: f64,
    }

    impl Runner {
        pub fn new(settings: Settings) -> Self {
            let catalog = AssetCatalog::preloaded((1..=8).map(|i| format!("pose_{i:02}")));
            Self {
                session: Session::with_simple_world(settings, catalog),
                accumulator: 0.0,
                input: TickInput::default(),
                time: 0.0,
            }
        }

        pub fn start(&mut self) {
            self.session.start_game(self.time);
        }

        pub fn is_playing(&self) -> bool {
            self.session.state().is_playing
        }

        pub fn time(&self) -> f64 {
            self.time
        }

        /// Run as many fixed ticks as the elapsed frame time allows
        pub fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.time += f64::from(dt);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.steer();
                self.session.tick(&self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                for event in &self.session.state().events {
                    log_event(event);
                }
                self.input.clear_one_shots();
            }
        }

        /// Keep the active segment over the middle of the platform
        fn steer(&mut self) {
            self.input.release(Command::MoveLeft);
            self.input.release(Command::MoveRight);

            let frame = self.session.frame();
            let Some(active) = frame.segments.iter().find(|s| s.active) else {
                return;
            };
            let target = self.session.settings().platform_center().x;
            if active.position.x < target - STEER_DEADBAND {
                self.input.press(Command::MoveRight);
            } else if active.position.x > target + STEER_DEADBAND {
                self.input.press(Command::MoveLeft);
            }
        }

        pub fn summary(&self) -> String {
            let frame = self.session.frame();
            let result = frame
                .outcome
                .map_or("still playing", |outcome| outcome.message());
            format!(
                "{result}: {} landed, {} on screen, {:.1}s, camera {:.0}",
                frame.landed_count,
                self.session.stack_size(),
                frame.elapsed_time,
                self.session.camera().offset
            )
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::Spawned { id, key } => log::info!("Segment {id} spawned ({key})"),
            GameEvent::Landed { id, forced } => {
                log::info!("Segment {id} landed{}", if *forced { " (forced)" } else { "" })
            }
            GameEvent::Evicted { id } => log::info!("Segment {id} evicted"),
            GameEvent::WallsRegenerated => log::trace!("Walls regenerated"),
            GameEvent::GameOver(outcome) => log::info!("{}", outcome.message()),
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let settings = args
            .next()
            .map(Settings::load_or_default)
            .unwrap_or_default();
        let max_seconds = args
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(120.0);

        log::info!(
            "Pose Stack (headless) starting, {} layout, {max_seconds}s limit",
            settings.layout.as_str()
        );

        let mut runner = Runner::new(settings);
        runner.start();
        while runner.is_playing() && runner.time() < max_seconds {
            runner.update(FRAME_DT);
        }

        println!("{}", runner.summary());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    runner::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Session` directly
}

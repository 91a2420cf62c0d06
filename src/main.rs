//! Ping Pong entry point
//!
//! On native targets this plays a headless exhibition match between a simple
//! autopilot and the AI, logging what happens. The browser build is driven
//! from JS through `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use serde::Deserialize;

    use ping_pong::consts::MAX_DT;
    use ping_pong::sim::{
        FrameClock, GameEvent, GamePhase, Match, MoveDir, Signal, SignalSink, TickInput,
    };
    use ping_pong::{HeuristicAi, Settings, Tuning};

    /// Fixed step of the headless loop
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Simulated seconds before an unfinished match is abandoned
    const TIME_LIMIT: f32 = 600.0;

    /// Optional config file layout
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Config {
        tuning: Tuning,
        settings: Settings,
    }

    fn load_config(path: &Path) -> Config {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Can't read {}: {} - using defaults", path.display(), e);
                return Config::default();
            }
        };
        match serde_json::from_str::<Config>(&text) {
            Ok(mut config) => {
                config.tuning = config.tuning.sanitized();
                config.settings.set_volume(config.settings.volume);
                config
            }
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    /// Counts signals and logs them at debug level
    #[derive(Default)]
    struct LogSink {
        walls: u32,
        paddles: u32,
    }

    impl SignalSink for LogSink {
        fn signal(&mut self, signal: Signal) {
            match signal {
                Signal::Wall => self.walls += 1,
                Signal::Paddle => self.paddles += 1,
                Signal::Score => {}
            }
            log::debug!("signal: {:?}", signal);
        }
    }

    /// Left paddle driver: follow the ball while it approaches
    fn autopilot<S: SignalSink>(game: &Match<HeuristicAi, S, FrameClock>) -> MoveDir {
        let ball = game.ball();
        let paddle = game.player_paddle();
        if !ball.in_play || ball.vel.x > 0.0 {
            return MoveDir::Stop;
        }
        let dead_zone = paddle.height * 0.25;
        let offset = ball.pos.y - paddle.y;
        if offset < -dead_zone {
            MoveDir::Up
        } else if offset > dead_zone {
            MoveDir::Down
        } else {
            MoveDir::Stop
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::PointScored {
                scorer,
                player_score,
                ai_score,
            } => log::info!(
                "Point to {}: {} - {}",
                scorer.as_str(),
                player_score,
                ai_score
            ),
            GameEvent::PaddleHit { side, speed } => {
                log::debug!("{} hit at {:.0} px/s", side.as_str(), speed)
            }
            other => log::trace!("{:?}", other),
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let mut args = std::env::args().skip(1);
        let config = args
            .next()
            .map(|path| load_config(Path::new(&path)))
            .unwrap_or_default();
        let seed = match args.next().map(|s| s.parse::<u64>()) {
            Some(Ok(seed)) => seed,
            Some(Err(e)) => {
                log::warn!("Invalid seed ({}), using 0", e);
                0
            }
            None => 0,
        };

        log::info!("Ping Pong exhibition, seed {}", seed);

        let mut game = Match::new(
            config.tuning,
            HeuristicAi::new(config.settings.difficulty),
            LogSink::default(),
            FrameClock::default(),
            seed,
        );
        game.start();

        let dt = FRAME_DT.min(MAX_DT);
        while game.phase() == GamePhase::Running && game.state().elapsed < TIME_LIMIT {
            let input = TickInput {
                direction: autopilot(&game),
                pause: false,
            };
            game.update(dt, &input);
            for event in game.drain_events() {
                log_event(&event);
            }
        }

        match game.summary() {
            Some(summary) => {
                println!(
                    "{} wins {} - {} in {} (peak speed {:.0} px/s)",
                    summary.winner.as_str(),
                    summary.player_score,
                    summary.ai_score,
                    summary.duration_text(),
                    summary.peak_speed
                );
            }
            None => println!(
                "No result after {}: {} - {}",
                ping_pong::format_time(game.state().elapsed),
                game.state().player_score,
                game.state().ai_score
            ),
        }
        let sink = game.sink();
        println!("{} paddle hits, {} wall bounces", sink.paddles, sink.walls);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry is `platform::web::init`
}

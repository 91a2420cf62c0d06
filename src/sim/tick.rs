//! Per-frame simulation step
//!
//! [`Match`] owns everything that changes during play and advances it once
//! per rendered frame.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::clock::{Clock, FrameClock};
use super::collision::{paddle_contact, resolve_paddle_hit};
use super::signal::{NullSink, Signal, SignalSink};
use super::state::{
    Ball, GameEvent, GamePhase, MatchState, MatchSummary, MoveDir, Paddle, ServeTimer, Side,
};
use crate::ai::{AiStrategy, Difficulty, HeuristicAi};
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Player paddle command
    pub direction: MoveDir,
    /// Pause toggle
    pub pause: bool,
}

/// Screen shake added on a wall bounce
const WALL_SHAKE: f32 = 5.0;
/// Screen shake added on a paddle hit
const PADDLE_SHAKE: f32 = 3.0;

/// A match between the player and an AI opponent
///
/// Collaborators are injected: the AI strategy decides the right paddle,
/// the sink hears impact signals, the clock times AI reactions.
pub struct Match<A = HeuristicAi, S = NullSink, C = FrameClock> {
    tuning: Tuning,
    state: MatchState,
    ball: Ball,
    player: Paddle,
    opponent: Paddle,
    ai: A,
    sink: S,
    clock: C,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl Match {
    /// Headless match with the stock AI at its default difficulty
    pub fn with_seed(tuning: Tuning, seed: u64) -> Self {
        Match::new(
            tuning,
            HeuristicAi::default(),
            NullSink,
            FrameClock::new(),
            seed,
        )
    }
}

impl<A: AiStrategy, S: SignalSink, C: Clock> Match<A, S, C> {
    pub fn new(tuning: Tuning, ai: A, sink: S, clock: C, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        let mut opponent = Paddle::new(Side::Ai, &tuning);
        opponent.smoothing = ai.profile().centering_speed;

        Self {
            state: MatchState::new(tuning.ball.initial_speed),
            ball: Ball::new(&tuning),
            player: Paddle::new(Side::Player, &tuning),
            opponent,
            ai,
            sink,
            clock,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            tuning,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn player_paddle(&self) -> &Paddle {
        &self.player
    }

    pub fn ai_paddle(&self) -> &Paddle {
        &self.opponent
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.opponent,
        }
    }

    pub fn ai(&self) -> &A {
        &self.ai
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fraction of the ball's speed ramp used (0.0 - 1.0)
    pub fn speed_progress(&self) -> f32 {
        self.tuning.speed_progress(self.ball.speed)
    }

    /// Final result, once the match has ended
    pub fn summary(&self) -> Option<MatchSummary> {
        if self.state.phase != GamePhase::Ended {
            return None;
        }
        let winner = self.state.winner(self.tuning.game.winning_score)?;
        Some(MatchSummary {
            winner,
            player_score: self.state.player_score,
            ai_score: self.state.ai_score,
            duration: self.state.elapsed,
            peak_speed: self.state.peak_speed,
        })
    }

    /// Begin a fresh match (also "play again" after the end)
    pub fn start(&mut self) {
        self.reset_table();
        self.state.started = true;
        self.set_phase(GamePhase::Running);

        let toward = if self.rng.random_bool(0.5) {
            Side::Ai
        } else {
            Side::Player
        };
        self.serve(toward);

        log::info!(
            "Match started against {} AI (first to {})",
            self.ai.difficulty().as_str(),
            self.tuning.game.winning_score
        );
    }

    /// Returns true if the match was running
    pub fn pause(&mut self) -> bool {
        if self.state.phase != GamePhase::Running {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        true
    }

    /// Returns true if the match was paused
    pub fn resume(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Running);
        true
    }

    pub fn toggle_pause(&mut self) {
        if !self.pause() {
            self.resume();
        }
    }

    /// Abandon the match and return to the idle state
    pub fn back_to_menu(&mut self) {
        self.reset_table();
        self.state.started = false;
        self.set_phase(GamePhase::Idle);
    }

    /// Change the opponent's skill; allowed at any time
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.ai.set_difficulty(difficulty);
        self.opponent.smoothing = self.ai.profile().centering_speed;
        log::info!("AI difficulty set to {}", difficulty.as_str());
    }

    /// Advance the match by `dt` seconds
    ///
    /// Does nothing unless the match is running. `dt` is clamped to
    /// `tuning.game.max_dt` so a stalled frame can't destabilise the physics.
    pub fn update(&mut self, dt: f32, input: &TickInput) {
        if input.pause {
            self.toggle_pause();
        }

        if self.state.phase != GamePhase::Running {
            return;
        }

        let dt = dt.max(0.0).min(self.tuning.game.max_dt);

        self.clock.advance(dt);
        self.state.elapsed += dt;
        self.state.decay_screen_shake();

        self.fire_serve_timer();

        // 1. Player input
        self.player.set_velocity(input.direction);

        // 2. Player paddle
        self.player.step(dt, &self.tuning);

        // 3. AI decision, then its paddle
        self.ai.update(
            &mut self.opponent,
            &self.ball,
            &self.tuning,
            self.clock.now(),
            &mut self.rng,
        );
        self.opponent.step(dt, &self.tuning);

        if !self.ball.in_play {
            return;
        }

        // 4. Ball and walls
        if let Some(point) = self.ball.step(dt, &self.tuning) {
            self.ball.spawn_impact(point, &mut self.rng);
            self.state.add_screen_shake(WALL_SHAKE);
            self.sink.signal(Signal::Wall);
            self.events.push(GameEvent::WallImpact {
                x: point.x,
                y: point.y,
            });
        }

        // 5. Paddles
        self.check_collisions();

        // 6. Scoring
        self.check_scoring();
    }

    fn check_collisions(&mut self) {
        let tolerance = self.tuning.game.collision_tolerance;

        for side in [Side::Player, Side::Ai] {
            let paddle = match side {
                Side::Player => &self.player,
                Side::Ai => &self.opponent,
            };
            if !paddle_contact(&self.ball, paddle, tolerance) {
                continue;
            }

            resolve_paddle_hit(&mut self.ball, paddle, &self.tuning);

            self.state.peak_speed = self.state.peak_speed.max(self.ball.speed);
            self.state.add_screen_shake(PADDLE_SHAKE);
            self.ball.spawn_impact(self.ball.pos, &mut self.rng);
            self.sink.signal(Signal::Paddle);
            self.events.push(GameEvent::PaddleHit {
                side,
                speed: self.ball.speed,
            });
        }
    }

    fn check_scoring(&mut self) {
        let margin = self.tuning.ball.margin;
        let scorer = if self.ball.pos.x < -margin {
            Side::Ai
        } else if self.ball.pos.x > self.tuning.arena.width + margin {
            Side::Player
        } else {
            return;
        };

        self.state.award_point(scorer);
        // Out of play until the next serve, so the crossing counts once
        self.ball.park(&self.tuning);

        self.sink.signal(Signal::Score);
        self.events.push(GameEvent::PointScored {
            scorer,
            player_score: self.state.player_score,
            ai_score: self.state.ai_score,
        });
        log::debug!(
            "Point to {:?}: {}-{}",
            scorer,
            self.state.player_score,
            self.state.ai_score
        );

        if self.state.winner(self.tuning.game.winning_score).is_some() {
            self.end_match();
        } else {
            self.state.serve = Some(ServeTimer {
                fire_at: self.state.elapsed + self.tuning.game.serve_delay,
                toward: self.state.trailing_side(),
            });
        }
    }

    fn fire_serve_timer(&mut self) {
        let Some(timer) = self.state.serve else {
            return;
        };
        if self.state.elapsed >= timer.fire_at {
            self.state.serve = None;
            self.serve(timer.toward);
        }
    }

    fn serve(&mut self, toward: Side) {
        self.ball.reset(toward, &self.tuning, &mut self.rng);
        self.events.push(GameEvent::Served { toward });
        log::debug!("Serve toward {:?}", toward);
    }

    fn end_match(&mut self) {
        self.state.started = false;
        self.state.serve = None;
        self.set_phase(GamePhase::Ended);

        if let Some(summary) = self.summary() {
            log::info!(
                "Match over: {:?} wins {}-{} in {}, peak speed {:.0}",
                summary.winner,
                summary.player_score,
                summary.ai_score,
                summary.duration_text(),
                summary.peak_speed
            );
            self.events.push(GameEvent::MatchEnded { summary });
        }
    }

    fn reset_table(&mut self) {
        self.state.reset(self.tuning.ball.initial_speed);
        self.player.recenter(&self.tuning);
        self.opponent.recenter(&self.tuning);
        self.opponent.smoothing = self.ai.profile().centering_speed;
        self.ai.reset();
        self.ball.park(&self.tuning);
        self.ball.particles.clear();
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.events.push(GameEvent::PhaseChanged { phase });
        }
    }

    #[cfg(test)]
    pub(crate) fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    type Recorded = Match<HeuristicAi, Vec<Signal>, FrameClock>;

    fn recorded(seed: u64) -> Recorded {
        Match::new(
            Tuning::default(),
            HeuristicAi::default(),
            Vec::new(),
            FrameClock::new(),
            seed,
        )
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    /// Tick until the ball is back in play
    fn wait_for_serve<A: AiStrategy, S: SignalSink, C: Clock>(m: &mut Match<A, S, C>) {
        for _ in 0..600 {
            if m.ball().in_play {
                return;
            }
            m.update(DT, &idle());
        }
        panic!("ball was never served");
    }

    /// Put the ball just past the given side's goal line
    fn force_point<A: AiStrategy, S: SignalSink, C: Clock>(m: &mut Match<A, S, C>, scorer: Side) {
        let width = m.tuning().arena.width;
        let ball = m.ball_mut();
        let dir = scorer.opponent().toward();
        ball.pos = Vec2::new(if dir > 0.0 { width + 20.0 } else { -20.0 }, 200.0);
        ball.vel = Vec2::new(dir * 350.0, 0.0);
        m.update(DT, &idle());
    }

    #[test]
    fn test_start_serves_ball() {
        let mut m = recorded(1);
        assert_eq!(m.phase(), GamePhase::Idle);

        m.start();

        assert_eq!(m.phase(), GamePhase::Running);
        assert!(m.state().started);
        assert!(m.ball().in_play);
        assert_eq!(m.ball().speed, m.tuning().ball.initial_speed);
        let events = m.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged {
            phase: GamePhase::Running
        }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Served { .. })));
        assert!(m.events().is_empty());
    }

    #[test]
    fn test_update_is_noop_unless_running() {
        let mut m = recorded(2);
        m.update(DT, &idle());
        assert_eq!(m.state().elapsed, 0.0);

        m.start();
        m.update(DT, &idle());
        let pos = m.ball().pos;
        let elapsed = m.state().elapsed;

        assert!(m.pause());
        for _ in 0..10 {
            m.update(DT, &idle());
        }
        assert_eq!(m.ball().pos, pos);
        assert_eq!(m.state().elapsed, elapsed);

        assert!(m.resume());
        m.update(DT, &idle());
        assert_ne!(m.ball().pos, pos);
    }

    #[test]
    fn test_pause_toggle_from_input() {
        let mut m = recorded(3);
        m.start();
        let toggle = TickInput {
            pause: true,
            ..Default::default()
        };
        m.update(DT, &toggle);
        assert_eq!(m.phase(), GamePhase::Paused);
        m.update(DT, &toggle);
        assert_eq!(m.phase(), GamePhase::Running);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut m = recorded(4);
        m.start();
        m.update(5.0, &idle());
        assert!((m.state().elapsed - m.tuning().game.max_dt).abs() < 1e-6);
        m.update(-1.0, &idle());
        assert!((m.state().elapsed - m.tuning().game.max_dt).abs() < 1e-6);
        assert!((m.clock().now() - m.tuning().game.max_dt as f64).abs() < 1e-6);
    }

    #[test]
    fn test_oversized_paddle_config_stays_in_bounds() {
        let mut tuning = Tuning::default();
        tuning.paddle.height = 500.0;
        let mut m = Match::with_seed(tuning, 5);
        m.start();

        let up = TickInput {
            direction: MoveDir::Up,
            ..Default::default()
        };
        for _ in 0..60 {
            m.update(DT, &up);
        }

        let t = m.tuning();
        let y = m.player_paddle().y;
        assert!(t.paddle_min_y() <= t.paddle_max_y());
        assert!(y >= t.paddle_min_y() && y <= t.paddle_max_y());
        assert_eq!(y, t.paddle_min_y());
    }

    #[test]
    fn test_top_wall_signal_emitted_once() {
        let mut m = recorded(5);
        m.start();
        let top = m.tuning().ball_top();
        {
            let ball = m.ball_mut();
            ball.pos = Vec2::new(400.0, top);
            ball.vel = Vec2::new(0.0, -50.0);
            ball.speed = 50.0;
        }
        m.update(DT, &idle());

        assert_eq!(m.ball().pos.y, top);
        assert_eq!(m.ball().vel.y, 50.0);
        assert_eq!(m.sink().as_slice(), &[Signal::Wall]);

        m.update(DT, &idle());
        assert_eq!(m.sink().len(), 1);
    }

    #[test]
    fn test_paddle_hit_reverses_and_speeds_up() {
        let mut m = recorded(6);
        m.start();
        let paddle_x = m.player_paddle().x;
        let paddle_y = m.player_paddle().y;
        {
            let ball = m.ball_mut();
            ball.pos = Vec2::new(paddle_x + 14.0, paddle_y);
            ball.vel = Vec2::new(-400.0, 0.0);
            ball.speed = 400.0;
        }
        m.update(DT, &idle());

        assert!(m.ball().vel.x > 0.0);
        assert_eq!(m.ball().speed, 415.0);
        assert_eq!(m.state().peak_speed, 415.0);
        assert_eq!(m.sink().as_slice(), &[Signal::Paddle]);
        assert!(m.events().iter().any(|e| matches!(
            e,
            GameEvent::PaddleHit {
                side: Side::Player,
                ..
            }
        )));

        // Receding now: the overlap on the next frame is not a second hit
        m.update(DT, &idle());
        assert_eq!(m.sink().len(), 1);
    }

    #[test]
    fn test_score_counts_once_per_crossing() {
        let mut m = recorded(7);
        m.start();
        force_point(&mut m, Side::Player);
        assert_eq!(m.state().player_score, 1);
        assert!(!m.ball().in_play);

        for _ in 0..30 {
            m.update(DT, &idle());
        }
        assert_eq!(m.state().player_score, 1);
        assert_eq!(m.state().ai_score, 0);
        let scores = m.sink().iter().filter(|s| **s == Signal::Score).count();
        assert_eq!(scores, 1);
    }

    #[test]
    fn test_serve_waits_for_delay_toward_trailing_side() {
        let mut m = recorded(8);
        m.start();
        force_point(&mut m, Side::Player);
        let scored_at = m.state().elapsed;
        let timer = m.state().serve.unwrap();
        assert_eq!(timer.toward, Side::Ai);
        assert!((timer.fire_at - scored_at - 1.5).abs() < 1e-5);

        wait_for_serve(&mut m);
        assert!(m.state().elapsed >= timer.fire_at);
        assert!(m.ball().vel.x > 0.0, "serve goes to the AI, who is behind");
        assert!(m.state().serve.is_none());
    }

    #[test]
    fn test_serve_toward_player_when_behind() {
        let mut m = recorded(9);
        m.start();
        force_point(&mut m, Side::Ai);
        wait_for_serve(&mut m);
        assert!(m.ball().vel.x < 0.0);
    }

    #[test]
    fn test_serve_held_while_paused() {
        let mut m = recorded(10);
        m.start();
        force_point(&mut m, Side::Ai);
        m.pause();
        for _ in 0..200 {
            m.update(DT, &idle());
        }
        assert!(!m.ball().in_play);
        m.resume();
        wait_for_serve(&mut m);
        assert!(m.ball().in_play);
    }

    #[test]
    fn test_player_wins_five_nil() {
        let mut m = recorded(11);
        m.start();
        for point in 1..=5 {
            wait_for_serve(&mut m);
            force_point(&mut m, Side::Player);
            assert_eq!(m.state().player_score, point);
        }

        assert_eq!(m.phase(), GamePhase::Ended);
        assert!(!m.state().started);
        let summary = m.summary().unwrap();
        assert_eq!(summary.winner, Side::Player);
        assert_eq!((summary.player_score, summary.ai_score), (5, 0));
        let ended = |e: &GameEvent| matches!(e, GameEvent::MatchEnded { .. });
        assert!(m.events().iter().any(ended));

        // Nothing moves after the end
        let elapsed = m.state().elapsed;
        m.update(DT, &idle());
        assert_eq!(m.state().elapsed, elapsed);
    }

    #[test]
    fn test_play_again_resets() {
        let mut m = recorded(12);
        m.start();
        for _ in 0..5 {
            wait_for_serve(&mut m);
            force_point(&mut m, Side::Ai);
        }
        assert_eq!(m.summary().unwrap().winner, Side::Ai);

        m.start();
        assert_eq!(m.phase(), GamePhase::Running);
        assert_eq!((m.state().player_score, m.state().ai_score), (0, 0));
        assert_eq!(m.state().elapsed, 0.0);
        assert!(m.summary().is_none());
    }

    #[test]
    fn test_back_to_menu() {
        let mut m = recorded(13);
        m.start();
        force_point(&mut m, Side::Player);
        m.back_to_menu();
        assert_eq!(m.phase(), GamePhase::Idle);
        assert_eq!(m.state().player_score, 0);
        assert!(m.state().serve.is_none());
        assert!(!m.ball().in_play);
    }

    #[test]
    fn test_difficulty_change_mid_match() {
        let mut m = recorded(14);
        m.start();
        m.update(DT, &idle());
        m.set_difficulty(Difficulty::Expert);
        assert_eq!(m.ai().difficulty(), Difficulty::Expert);
        let expert = Difficulty::Expert.profile();
        assert_eq!(m.ai_paddle().smoothing, expert.centering_speed);
        assert_eq!(m.phase(), GamePhase::Running);
    }

    #[test]
    fn test_same_seed_same_rally() {
        let mut a = Match::with_seed(Tuning::default(), 42);
        let mut b = Match::with_seed(Tuning::default(), 42);
        a.start();
        b.start();
        let input = TickInput {
            direction: MoveDir::Down,
            ..Default::default()
        };
        for _ in 0..300 {
            a.update(DT, &input);
            b.update(DT, &input);
        }
        assert_eq!(a.ball().pos, b.ball().pos);
        assert_eq!(a.ai_paddle().y, b.ai_paddle().y);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_rally_invariants(
            seed in any::<u64>(),
            moves in proptest::collection::vec(0u8..3, 600..1200),
            expert in any::<bool>(),
        ) {
            let mut m = recorded(seed);
            if expert {
                m.set_difficulty(Difficulty::Expert);
            }
            m.start();
            let tuning = *m.tuning();

            let mut last_total = 0;
            for mv in moves {
                let direction = match mv {
                    0 => MoveDir::Up,
                    1 => MoveDir::Down,
                    _ => MoveDir::Stop,
                };
                let speed_before = m.ball().speed;
                let vx_before = m.ball().vel.x;
                m.update(DT, &TickInput { direction, pause: false });

                for side in [Side::Player, Side::Ai] {
                    let y = m.paddle(side).y;
                    prop_assert!(y >= tuning.paddle_min_y() && y <= tuning.paddle_max_y());
                }

                let ball = m.ball();
                if ball.in_play {
                    prop_assert!(ball.speed >= tuning.ball.initial_speed);
                    prop_assert!(ball.speed <= tuning.ball.max_speed);
                    prop_assert!((ball.vel.length() - ball.speed).abs() < 0.05);
                    if ball.vel.x.signum() != vx_before.signum() && vx_before != 0.0 {
                        prop_assert!(ball.speed >= speed_before);
                    }
                }

                let total = m.state().player_score + m.state().ai_score;
                prop_assert!(total == last_total || total == last_total + 1);
                last_total = total;

                let top = m.state().player_score.max(m.state().ai_score);
                let ended = m.phase() == GamePhase::Ended;
                prop_assert_eq!(ended, top == tuning.game.winning_score);
                prop_assert!(top <= tuning.game.winning_score);
                if ended {
                    break;
                }
            }
        }

        #[test]
        fn prop_ends_exactly_at_winning_score(points in proptest::collection::vec(any::<bool>(), 1..12)) {
            let mut m = recorded(99);
            m.start();
            let w = m.tuning().game.winning_score;
            for player_scores in points {
                if m.phase() == GamePhase::Ended {
                    break;
                }
                wait_for_serve(&mut m);
                force_point(&mut m, if player_scores { Side::Player } else { Side::Ai });

                let (p, a) = (m.state().player_score, m.state().ai_score);
                prop_assert_eq!(m.phase() == GamePhase::Ended, p.max(a) == w);
                if let Some(summary) = m.summary() {
                    let winner_score = m.state().score(summary.winner);
                    let loser_score = m.state().score(summary.winner.opponent());
                    prop_assert_eq!(winner_score, w);
                    prop_assert!(loser_score < w);
                }
            }
        }
    }
}

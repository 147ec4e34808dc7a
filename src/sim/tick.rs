//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, plus the match
//! flow: scoring, win detection and the replay menu.

use super::rng::RandomSource;
use super::state::{GameEvent, GamePhase, GameState, MatchLength, Side};

/// Held movement keys for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
}

/// Single key presses that drive the match flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Space on the game over screen
    Confirm,
    /// Digit key in the replay menu
    SelectMatch(MatchLength),
    /// Escape in the replay menu
    Exit,
    /// Window/tab close from the environment
    Quit,
}

/// Whether the frame driver should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl<R: RandomSource> GameState<R> {
    /// Move the player paddle from held keys. Ignored once the match is over.
    pub fn handle_continuous_input(&mut self, input: &TickInput) {
        if self.is_game_over() {
            return;
        }
        if input.up {
            let speed = self.player.speed;
            self.player.move_by(-speed, self.height);
        }
        if input.down {
            let speed = self.player.speed;
            self.player.move_by(speed, self.height);
        }
    }

    /// React to a single key press
    pub fn handle_discrete_event(&mut self, event: ControlEvent) -> Flow {
        match (self.phase, event) {
            (_, ControlEvent::Quit) => {
                log::info!("Quit requested");
                Flow::Exit
            }
            (GamePhase::GameOver, ControlEvent::Confirm) => {
                self.phase = GamePhase::AwaitingReplayChoice;
                self.events.push(GameEvent::ReplayMenuOpened);
                log::debug!("Replay menu opened");
                Flow::Continue
            }
            (GamePhase::AwaitingReplayChoice, ControlEvent::SelectMatch(length)) => {
                self.match_length = length;
                self.reset_game();
                self.events.push(GameEvent::MatchStarted { length });
                log::info!("New match: {} (first to {})", length.as_str(), length.winning_score());
                Flow::Continue
            }
            (GamePhase::AwaitingReplayChoice, ControlEvent::Exit) => {
                log::info!("Exit selected from replay menu");
                Flow::Exit
            }
            _ => Flow::Continue,
        }
    }

    /// Advance the rally by one tick
    pub fn update(&mut self) {
        if self.is_game_over() {
            return;
        }

        self.time_ticks += 1;

        self.ball.advance();

        if self.ball.bounce_off_walls(self.height) {
            self.events.push(GameEvent::WallBounce);
        }

        if let Some(side) = self.ball.check_collision(&self.player, &self.ai) {
            self.events.push(GameEvent::PaddleHit { side });
        }

        let ball = self.ball.bounding_rect();
        if ball.left() <= 0.0 {
            self.score_point(Side::Ai);
        } else if ball.right() >= self.width {
            self.score_point(Side::Player);
        }

        self.ai.auto_track(&self.ball, self.height);
    }

    fn score_point(&mut self, scorer: Side) {
        self.score.award(scorer);
        self.serve();
        self.events.push(GameEvent::PointScored { scorer });
        log::debug!(
            "Point to {:?}: {} - {}",
            scorer,
            self.score.player,
            self.score.ai
        );
        self.check_for_winner();
    }

    /// End the match once a side reaches the winning score.
    /// Only a match in play can end; later calls change nothing.
    pub fn check_for_winner(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let target = self.winning_score();
        let winner = if self.score.player >= target {
            Some(Side::Player)
        } else if self.score.ai >= target {
            Some(Side::Ai)
        } else {
            None
        };

        if let Some(winner) = winner {
            self.winner = Some(winner);
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::MatchOver { winner });
            log::info!(
                "{} ({} - {})",
                winner.winner_text(),
                self.score.player,
                self.score.ai
            );
        }
    }

    /// Zero the score and serve a fresh ball with the current match length
    pub fn reset_game(&mut self) {
        self.score.player = 0;
        self.score.ai = 0;
        self.serve();
        self.phase = GamePhase::Playing;
        self.winner = None;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick<R: RandomSource>(state: &mut GameState<R>, input: &TickInput) {
    state.handle_continuous_input(input);
    state.update();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Score, ScriptedRng};
    use glam::Vec2;
    use proptest::prelude::*;

    fn scripted_state() -> GameState<ScriptedRng> {
        GameState::with_rng(ScriptedRng::new([true, true, false, false]))
    }

    /// Put the ball one tick away from crossing the right boundary,
    /// level with the AI paddle's top so it slips past underneath.
    fn ball_about_to_exit_right<R: RandomSource>(state: &mut GameState<R>) {
        state.ai.pos.y = 0.0;
        state.ball.pos = Vec2::new(state.width - BALL_SIZE - 2.0, 500.0);
        state.ball.vel = Vec2::new(BALL_SPEED, 0.0);
    }

    fn ball_about_to_exit_left<R: RandomSource>(state: &mut GameState<R>) {
        state.player.pos.y = 0.0;
        state.ball.pos = Vec2::new(2.0, 500.0);
        state.ball.vel = Vec2::new(-BALL_SPEED, 0.0);
    }

    #[test]
    fn test_tick_moves_ball_by_velocity() {
        let mut state = scripted_state();
        state.ball.pos = Vec2::new(400.0, 300.0);
        state.ball.vel = Vec2::new(5.0, -3.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ball.pos, Vec2::new(405.0, 297.0));
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_player_input_moves_paddle() {
        let mut state = scripted_state();
        let start = state.player.pos.y;
        state.handle_continuous_input(&TickInput {
            up: true,
            down: false,
        });
        assert_eq!(state.player.pos.y, start - PADDLE_SPEED);
        state.handle_continuous_input(&TickInput {
            up: false,
            down: true,
        });
        assert_eq!(state.player.pos.y, start);
        // Both held cancel out
        state.handle_continuous_input(&TickInput { up: true, down: true });
        assert_eq!(state.player.pos.y, start);
    }

    #[test]
    fn test_input_ignored_when_game_over() {
        for phase in [GamePhase::GameOver, GamePhase::AwaitingReplayChoice] {
            let mut state = scripted_state();
            state.phase = phase;
            let start = state.player.pos.y;
            state.handle_continuous_input(&TickInput {
                up: true,
                down: false,
            });
            assert_eq!(state.player.pos.y, start, "{:?}", phase);
            state.handle_continuous_input(&TickInput {
                up: false,
                down: true,
            });
            assert_eq!(state.player.pos.y, start, "{:?}", phase);
        }
    }

    #[test]
    fn test_update_is_noop_when_game_over() {
        let mut state = scripted_state();
        state.phase = GamePhase::AwaitingReplayChoice;
        let before = state.ball.pos;
        state.update();
        assert_eq!(state.ball.pos, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_ball_exit_left_scores_for_ai() {
        let mut state = scripted_state();
        ball_about_to_exit_left(&mut state);
        state.update();

        assert_eq!(state.score, Score { player: 0, ai: 1 });
        assert!(state.ball.is_centered(state.width, state.height));
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PointScored { scorer: Side::Ai })
        );
    }

    #[test]
    fn test_ball_exit_right_scores_for_player() {
        let mut state = scripted_state();
        ball_about_to_exit_right(&mut state);
        state.update();

        assert_eq!(state.score, Score { player: 1, ai: 0 });
        assert!(state.ball.is_centered(state.width, state.height));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_match_point_ends_game() {
        let mut state = scripted_state();
        state.score.player = 4;
        ball_about_to_exit_right(&mut state);
        state.update();

        assert_eq!(state.score, Score { player: 5, ai: 0 });
        assert!(state.is_game_over());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.winner_text(), "Player Wins!");
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::MatchOver { winner: Side::Player })
        );
    }

    #[test]
    fn test_game_over_persists_until_reset() {
        let mut state = scripted_state();
        state.score.ai = 4;
        ball_about_to_exit_left(&mut state);
        state.update();
        assert_eq!(state.winner_text(), "AI Wins!");

        for _ in 0..100 {
            tick(&mut state, &TickInput::default());
            assert!(state.is_game_over());
        }
        // Stray keys do nothing on the game over screen
        let select = ControlEvent::SelectMatch(MatchLength::BestOf3);
        assert_eq!(state.handle_discrete_event(select), Flow::Continue);
        assert_eq!(state.handle_discrete_event(ControlEvent::Exit), Flow::Continue);
        assert_eq!(state.phase, GamePhase::GameOver);

        state.reset_game();
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_replay_flow_select_five() {
        let mut state = scripted_state();
        state.match_length = MatchLength::BestOf3;
        state.score = Score { player: 3, ai: 1 };
        state.check_for_winner();
        assert_eq!(state.phase, GamePhase::GameOver);

        assert_eq!(state.handle_discrete_event(ControlEvent::Confirm), Flow::Continue);
        assert_eq!(state.phase, GamePhase::AwaitingReplayChoice);
        assert!(state.is_game_over());

        let flow = state.handle_discrete_event(ControlEvent::SelectMatch(MatchLength::BestOf5));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(state.winning_score(), 5);
        assert_eq!(state.score, Score::default());
        assert!(!state.is_game_over());
        assert_eq!(state.winner_text(), "");
        assert!(state.ball.is_centered(state.width, state.height));

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ReplayMenuOpened));
        assert!(events.contains(&GameEvent::MatchStarted {
            length: MatchLength::BestOf5
        }));
    }

    #[test]
    fn test_match_over_raised_once() {
        let mut state = scripted_state();
        state.score.player = 5;
        state.check_for_winner();
        state.check_for_winner();

        let match_overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::MatchOver { .. }))
            .count();
        assert_eq!(match_overs, 1);
        assert_eq!(state.winner, Some(Side::Player));

        // Still nothing new once the replay menu is up
        state.handle_discrete_event(ControlEvent::Confirm);
        state.check_for_winner();
        assert_eq!(state.phase, GamePhase::AwaitingReplayChoice);
        assert_eq!(state.drain_events(), vec![GameEvent::ReplayMenuOpened]);
    }

    #[test]
    fn test_replay_menu_exit() {
        let mut state = scripted_state();
        state.phase = GamePhase::AwaitingReplayChoice;
        assert_eq!(state.handle_discrete_event(ControlEvent::Exit), Flow::Exit);
    }

    #[test]
    fn test_quit_exits_from_any_phase() {
        for phase in [
            GamePhase::Playing,
            GamePhase::GameOver,
            GamePhase::AwaitingReplayChoice,
        ] {
            let mut state = scripted_state();
            state.phase = phase;
            assert_eq!(state.handle_discrete_event(ControlEvent::Quit), Flow::Exit);
        }
    }

    #[test]
    fn test_confirm_ignored_while_playing() {
        let mut state = scripted_state();
        assert_eq!(state.handle_discrete_event(ControlEvent::Confirm), Flow::Continue);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_reset_game_serves_from_rng() {
        let mut state = GameState::with_rng(ScriptedRng::new([false, true]));
        state.score = Score { player: 2, ai: 3 };
        state.ball.pos = Vec2::new(50.0, 60.0);
        state.reset_game();

        assert_eq!(state.score, Score::default());
        assert!(state.ball.is_centered(state.width, state.height));
        assert_eq!(state.ball.vel, Vec2::new(-BALL_SPEED, BALL_SERVE_DY));
    }

    #[test]
    fn test_paddle_hit_and_wall_events() {
        let mut state = scripted_state();
        state.ball.pos = Vec2::new(400.0, 1.0);
        state.ball.vel = Vec2::new(BALL_SPEED, -BALL_SERVE_DY);
        state.update();
        assert_eq!(state.drain_events(), vec![GameEvent::WallBounce]);

        let y = state.player.center_y() - BALL_SIZE / 2.0;
        state.ball.pos = Vec2::new(22.0, y);
        state.ball.vel = Vec2::new(-BALL_SPEED, 0.0);
        state.update();
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PaddleHit { side: Side::Player }]
        );
        assert!(state.ball.vel.x > 0.0);
    }

    #[test]
    fn test_ai_tracks_ball_each_update() {
        let mut state = scripted_state();
        state.ball.pos = Vec2::new(400.0, 550.0);
        state.ball.vel = Vec2::new(BALL_SPEED, 0.0);
        let start = state.ai.pos.y;
        state.update();
        assert_eq!(state.ai.pos.y, start + PADDLE_SPEED);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput { up: true, down: false },
            TickInput::default(),
            TickInput { up: false, down: true },
        ];

        for i in 0..2_000 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.ball.pos, state2.ball.pos);
        assert_eq!(state1.ai.pos, state2.ai.pos);
    }

    proptest! {
        #[test]
        fn prop_positions_stay_in_bounds(
            seed in any::<u64>(),
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..400),
        ) {
            let mut state = GameState::new(seed);
            for (up, down) in inputs {
                tick(&mut state, &TickInput { up, down });
                let max_ball_y = state.height - state.ball.size.y;
                prop_assert!(state.ball.pos.y >= 0.0 && state.ball.pos.y <= max_ball_y);
                for paddle in [&state.player, &state.ai] {
                    prop_assert!(paddle.pos.y >= 0.0);
                    prop_assert!(paddle.pos.y <= state.height - paddle.size.y);
                }
                prop_assert!(state.ball.vel.x.abs() <= BALL_SPEED);
                prop_assert!(state.ball.vel.y.abs() <= BALL_SPEED);
            }
        }

        #[test]
        fn prop_paddle_clamped_for_any_delta(start in 0.0f32..500.0, delta in -1.0e6f32..1.0e6) {
            let mut paddle = crate::sim::Paddle::new(PADDLE_MARGIN, PLAYFIELD_HEIGHT);
            paddle.pos.y = start;
            paddle.move_by(delta, PLAYFIELD_HEIGHT);
            prop_assert!(paddle.pos.y >= 0.0);
            prop_assert!(paddle.pos.y <= PLAYFIELD_HEIGHT - PADDLE_HEIGHT);
        }

        #[test]
        fn prop_game_over_exactly_at_winning_score(seed in any::<u64>(), ticks in 1usize..5_000) {
            let mut state = GameState::new(seed);
            state.match_length = MatchLength::BestOf3;
            for _ in 0..ticks {
                let was_over = state.is_game_over();
                state.update();
                let reached = state.score.player >= 3 || state.score.ai >= 3;
                prop_assert_eq!(state.is_game_over(), reached);
                if was_over {
                    prop_assert!(state.is_game_over());
                }
                prop_assert!(state.score.player <= 3 && state.score.ai <= 3);
            }
        }
    }
}

//! Game state and core simulation types
//!
//! Everything one match session needs lives in `GameState`: both paddles, the
//! ball, the score, the match length and the current phase.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::ball_paddle_collision;
use super::rect::Rect;
use super::rng::{self, RandomSource};
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active rally
    Playing,
    /// A side reached the winning score; waiting for confirm
    GameOver,
    /// Replay menu is up, waiting for a match length or exit
    AwaitingReplayChoice,
}

/// One side of the table. The player owns the left paddle, the AI the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    /// Banner shown when this side wins the match
    pub fn winner_text(self) -> &'static str {
        match self {
            Side::Player => "Player Wins!",
            Side::Ai => "AI Wins!",
        }
    }
}

/// Match length offered by the replay menu (first to N points)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchLength {
    BestOf3,
    #[default]
    BestOf5,
    BestOf7,
}

impl MatchLength {
    /// Points needed to win
    pub fn winning_score(self) -> u32 {
        match self {
            MatchLength::BestOf3 => 3,
            MatchLength::BestOf5 => 5,
            MatchLength::BestOf7 => 7,
        }
    }

    /// Map a menu digit to a match length
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '3' => Some(MatchLength::BestOf3),
            '5' => Some(MatchLength::BestOf5),
            '7' => Some(MatchLength::BestOf7),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLength::BestOf3 => "Best of 3",
            MatchLength::BestOf5 => "Best of 5",
            MatchLength::BestOf7 => "Best of 7",
        }
    }
}

/// Things that happened during a tick, consumed by audio and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PaddleHit { side: Side },
    WallBounce,
    PointScored { scorer: Side },
    MatchOver { winner: Side },
    ReplayMenuOpened,
    MatchStarted { length: MatchLength },
}

/// Points per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player: u32,
    pub ai: u32,
}

impl Score {
    pub fn award(&mut self, side: Side) {
        match side {
            Side::Player => self.player += 1,
            Side::Ai => self.ai += 1,
        }
    }
}

/// A vertical paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Maximum travel per tick
    pub speed: f32,
}

impl Paddle {
    /// Paddle at column `x`, vertically centered in the playfield
    pub fn new(x: f32, playfield_height: f32) -> Self {
        Self {
            pos: Vec2::new(x, playfield_height / 2.0 - PADDLE_HEIGHT / 2.0),
            size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            speed: PADDLE_SPEED,
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Shift vertically, keeping the whole paddle inside the playfield
    pub fn move_by(&mut self, delta: f32, playfield_height: f32) {
        let max_y = (playfield_height - self.size.y).max(0.0);
        self.pos.y = (self.pos.y + delta).clamp(0.0, max_y);
    }

    /// Step toward the ball's vertical center, never faster than `speed`
    pub fn auto_track(&mut self, ball: &Ball, playfield_height: f32) {
        let diff = ball.bounding_rect().center().y - self.center_y();
        let step = diff.clamp(-self.speed, self.speed);
        self.move_by(step, playfield_height);
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    pub size: Vec2,
}

impl Ball {
    /// Stationary ball centered in the playfield
    pub fn new(playfield_width: f32, playfield_height: f32) -> Self {
        let size = Vec2::splat(BALL_SIZE);
        Self {
            pos: Self::center_pos(size, playfield_width, playfield_height),
            vel: Vec2::ZERO,
            size,
        }
    }

    fn center_pos(size: Vec2, playfield_width: f32, playfield_height: f32) -> Vec2 {
        (Vec2::new(playfield_width, playfield_height) - size) / 2.0
    }

    pub fn bounding_rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Move one tick along the current velocity
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }

    /// Clamp against the top and bottom walls, sending the ball back in.
    /// Returns true when a wall was hit.
    pub fn bounce_off_walls(&mut self, playfield_height: f32) -> bool {
        let max_y = playfield_height - self.size.y;
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.vel.y.abs();
            true
        } else if self.pos.y > max_y {
            self.pos.y = max_y;
            self.vel.y = -self.vel.y.abs();
            true
        } else {
            false
        }
    }

    /// Bounce off whichever paddle the ball is travelling into.
    ///
    /// `left` is the player's paddle and `right` the AI's. A hit sends the
    /// ball back out from the paddle face; the vertical speed follows where it
    /// landed, from `-BALL_MAX_BOUNCE_DY` at the top edge to
    /// `BALL_MAX_BOUNCE_DY` at the bottom edge.
    pub fn check_collision(&mut self, left: &Paddle, right: &Paddle) -> Option<Side> {
        let rect = self.bounding_rect();

        if self.vel.x < 0.0 {
            let paddle = left.bounding_rect();
            let result = ball_paddle_collision(&rect, &paddle);
            if result.hit {
                self.vel.x = self.vel.x.abs();
                self.vel.y = result.offset * BALL_MAX_BOUNCE_DY;
                self.pos.x = paddle.right();
                return Some(Side::Player);
            }
        } else if self.vel.x > 0.0 {
            let paddle = right.bounding_rect();
            let result = ball_paddle_collision(&rect, &paddle);
            if result.hit {
                self.vel.x = -self.vel.x.abs();
                self.vel.y = result.offset * BALL_MAX_BOUNCE_DY;
                self.pos.x = paddle.left() - self.size.x;
                return Some(Side::Ai);
            }
        }

        None
    }

    /// Re-center and serve in a random diagonal direction
    pub fn reset(
        &mut self,
        rng: &mut impl RandomSource,
        playfield_width: f32,
        playfield_height: f32,
    ) {
        self.pos = Self::center_pos(self.size, playfield_width, playfield_height);
        let dx = if rng.coin_flip() { BALL_SPEED } else { -BALL_SPEED };
        let dy = if rng.coin_flip() {
            BALL_SERVE_DY
        } else {
            -BALL_SERVE_DY
        };
        self.vel = Vec2::new(dx, dy);
    }

    /// True when the ball sits exactly at the playfield center
    pub fn is_centered(&self, playfield_width: f32, playfield_height: f32) -> bool {
        self.pos == Self::center_pos(self.size, playfield_width, playfield_height)
    }
}

/// Complete session state. The single owner of everything that mutates.
#[derive(Debug, Clone)]
pub struct GameState<R = Pcg32> {
    pub width: f32,
    pub height: f32,
    /// Left paddle, keyboard controlled
    pub player: Paddle,
    /// Right paddle, auto-tracking
    pub ai: Paddle,
    pub ball: Ball,
    pub score: Score,
    pub phase: GamePhase,
    pub match_length: MatchLength,
    pub winner: Option<Side>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the last drain
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: R,
}

impl GameState<Pcg32> {
    /// Create a new session with a seeded RNG
    pub fn new(seed: u64) -> Self {
        Self::with_rng(rng::seeded(seed))
    }
}

impl<R> GameState<R> {
    /// Points needed to end the current match
    pub fn winning_score(&self) -> u32 {
        self.match_length.winning_score()
    }

    /// True from the winning point until the next match starts
    pub fn is_game_over(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::GameOver | GamePhase::AwaitingReplayChoice
        )
    }

    /// Winner banner, empty while no one has won
    pub fn winner_text(&self) -> &'static str {
        self.winner.map(Side::winner_text).unwrap_or("")
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<R: RandomSource> GameState<R> {
    /// Create a new session on the default playfield with the given RNG
    pub fn with_rng(mut rng: R) -> Self {
        let (width, height) = (PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
        let mut ball = Ball::new(width, height);
        ball.reset(&mut rng, width, height);

        Self {
            width,
            height,
            player: Paddle::new(PADDLE_MARGIN, height),
            ai: Paddle::new(width - PADDLE_MARGIN - PADDLE_WIDTH, height),
            ball,
            score: Score::default(),
            phase: GamePhase::Playing,
            match_length: MatchLength::default(),
            winner: None,
            time_ticks: 0,
            events: Vec::new(),
            rng,
        }
    }

    /// Re-serve the ball from the center
    pub fn serve(&mut self) {
        self.ball.reset(&mut self.rng, self.width, self.height);
    }
}

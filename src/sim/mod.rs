//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick
//! - Injected RNG only
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod rect;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, ball_paddle_collision};
pub use rect::Rect;
pub use rng::{RandomSource, ScriptedRng};
pub use state::{Ball, GameEvent, GamePhase, GameState, MatchLength, Paddle, Score, Side};
pub use tick::{ControlEvent, Flow, TickInput, tick};

//! Classic Pong - two paddles, one ball, first to N points
//!
//! Core modules:
//! - `sim`: Deterministic simulation (paddles, ball, scoring, match flow)
//! - `scene`: Translates game state into draw requests
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Procedural sound effects
//! - `controls`: Keyboard mapping
//! - `settings`: Player preferences

pub mod audio;
pub mod controls;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
///
/// Velocities and speeds are in pixels per simulation tick.
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one physics step per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    pub const PADDLE_SPEED: f32 = 7.0;
    /// Gap between a paddle and its side wall
    pub const PADDLE_MARGIN: f32 = 10.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 7.0;
    /// Horizontal speed, constant for the whole rally
    pub const BALL_SPEED: f32 = 5.0;
    /// Vertical speed on serve
    pub const BALL_SERVE_DY: f32 = 3.0;
    /// Vertical speed after an edge hit on a paddle
    pub const BALL_MAX_BOUNCE_DY: f32 = 5.0;
}

//! Scene description
//!
//! Turns game state into draw requests against a `Canvas`. Nothing here
//! mutates the game; the renderer and the DOM text layer consume the
//! resulting `DrawList`.

use glam::Vec2;

use crate::sim::{GamePhase, GameState, Rect};

/// Linear RGB color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// CSS `rgb()` string for DOM text
    pub fn to_css(&self) -> String {
        format!(
            "rgb({}, {}, {})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8
        )
    }
}

/// Font sizes in playfield pixels
pub const SCORE_FONT_SIZE: f32 = 30.0;
pub const BANNER_FONT_SIZE: f32 = 50.0;
pub const MENU_FONT_SIZE: f32 = 40.0;
pub const PROMPT_FONT_SIZE: f32 = 30.0;

pub const PLAY_AGAIN_PROMPT: &str = "Press SPACE to Play Again";
pub const REPLAY_PROMPT: &str = "Press the corresponding key to select";
pub const REPLAY_OPTIONS: [&str; 4] = ["3: Best of 3", "5: Best of 5", "7: Best of 7", "ESC: Exit"];

/// Drawing surface. Coordinates are playfield pixels, origin top-left.
pub trait Canvas {
    fn fill(&mut self, color: Color);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    /// Ellipse inscribed in `rect`
    fn draw_ellipse(&mut self, rect: Rect, color: Color);
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);
    /// Text horizontally centered on `center_x`, top edge at `top_y`
    fn draw_text(&mut self, text: &str, size: f32, center_x: f32, top_y: f32, color: Color);
}

/// Draw the table: paddles, ball, divider, scores and the game over banner.
/// While the replay menu is up the menu replaces the table.
pub fn render<R>(state: &GameState<R>, canvas: &mut impl Canvas) {
    if state.phase == GamePhase::AwaitingReplayChoice {
        render_replay_menu(canvas, state.width);
        return;
    }

    let (w, h) = (state.width, state.height);
    canvas.fill(Color::BLACK);

    canvas.draw_rect(state.player.bounding_rect(), Color::WHITE);
    canvas.draw_rect(state.ai.bounding_rect(), Color::WHITE);
    canvas.draw_ellipse(state.ball.bounding_rect(), Color::WHITE);
    canvas.draw_line(Vec2::new(w / 2.0, 0.0), Vec2::new(w / 2.0, h), Color::WHITE);

    canvas.draw_text(
        &state.score.player.to_string(),
        SCORE_FONT_SIZE,
        w / 4.0,
        20.0,
        Color::WHITE,
    );
    canvas.draw_text(
        &state.score.ai.to_string(),
        SCORE_FONT_SIZE,
        w * 3.0 / 4.0,
        20.0,
        Color::WHITE,
    );

    if state.phase == GamePhase::GameOver {
        canvas.draw_text(
            state.winner_text(),
            BANNER_FONT_SIZE,
            w / 2.0,
            h / 2.0 - 50.0,
            Color::WHITE,
        );
        canvas.draw_text(
            PLAY_AGAIN_PROMPT,
            PROMPT_FONT_SIZE,
            w / 2.0,
            h / 2.0 + 20.0,
            Color::WHITE,
        );
    }
}

/// Match length picker shown after confirming on the game over screen
pub fn render_replay_menu(canvas: &mut impl Canvas, width: f32) {
    canvas.fill(Color::BLACK);
    canvas.draw_text(REPLAY_PROMPT, PROMPT_FONT_SIZE, width / 2.0, 100.0, Color::WHITE);
    for (i, option) in REPLAY_OPTIONS.iter().enumerate() {
        let top = 150.0 + i as f32 * 60.0;
        canvas.draw_text(option, MENU_FONT_SIZE, width / 2.0, top, Color::WHITE);
    }
}

/// A recorded draw request
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill(Color),
    Rect {
        rect: Rect,
        color: Color,
    },
    Ellipse {
        rect: Rect,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
    Text {
        text: String,
        size: f32,
        center_x: f32,
        top_y: f32,
        color: Color,
    },
}

/// Canvas that records commands for a backend to replay
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Color of the last fill, black if none
    pub fn clear_color(&self) -> Color {
        self.commands
            .iter()
            .rev()
            .find_map(|c| match c {
                DrawCommand::Fill(color) => Some(*color),
                _ => None,
            })
            .unwrap_or(Color::BLACK)
    }

    /// All text strings in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Canvas for DrawList {
    fn fill(&mut self, color: Color) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn draw_ellipse(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Ellipse { rect, color });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn draw_text(&mut self, text: &str, size: f32, center_x: f32, top_y: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            size,
            center_x,
            top_y,
            color,
        });
    }
}

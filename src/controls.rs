//! Keyboard input handling
//!
//! Key names follow `KeyboardEvent.key` values so the browser build can pass
//! them straight through.

use crate::sim::{Ball, ControlEvent, MatchLength, Paddle, TickInput};

/// Held movement keys. Key repeat is ignored; a key counts as held from its
/// keydown until its keyup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKeys {
    up: bool,
    down: bool,
}

impl HeldKeys {
    /// Handle key down event. Returns true if the key moves the paddle.
    pub fn key_down(&mut self, key: &str) -> bool {
        match key {
            "ArrowUp" | "w" | "W" => self.up = true,
            "ArrowDown" | "s" | "S" => self.down = true,
            _ => return false,
        }
        true
    }

    /// Handle key up event
    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowUp" | "w" | "W" => self.up = false,
            "ArrowDown" | "s" | "S" => self.down = false,
            _ => {}
        }
    }

    /// Forget everything held, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    pub fn tick_input(&self) -> TickInput {
        TickInput {
            up: self.up,
            down: self.down,
        }
    }
}

/// Toggles sound on and off
pub fn is_mute_key(key: &str) -> bool {
    matches!(key, "m" | "M")
}

/// Held keys that steer `paddle` toward the ball once it comes within
/// `reach` pixels horizontally. Drives the player paddle in attract mode.
pub fn autopilot(paddle: &Paddle, ball: &Ball, reach: f32) -> TickInput {
    let ball_rect = ball.bounding_rect();
    let paddle_rect = paddle.bounding_rect();
    let gap = (ball_rect.center().x - paddle_rect.center().x).abs();
    if gap > reach {
        return TickInput::default();
    }

    let diff = ball_rect.center().y - paddle.center_y();
    TickInput {
        up: diff < -paddle.speed,
        down: diff > paddle.speed,
    }
}

/// Map a single key press to a match-flow event
pub fn control_for_key(key: &str) -> Option<ControlEvent> {
    match key {
        " " | "Spacebar" => Some(ControlEvent::Confirm),
        "Escape" => Some(ControlEvent::Exit),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(digit), None) => MatchLength::from_digit(digit).map(ControlEvent::SelectMatch),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys() {
        let mut keys = HeldKeys::default();
        assert!(keys.key_down("w"));
        assert_eq!(keys.tick_input(), TickInput { up: true, down: false });
        assert!(keys.key_down("ArrowDown"));
        assert_eq!(keys.tick_input(), TickInput { up: true, down: true });
        keys.key_up("W");
        assert_eq!(keys.tick_input(), TickInput { up: false, down: true });
        assert!(!keys.key_down("x"));
        keys.release_all();
        assert_eq!(keys.tick_input(), TickInput::default());
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(control_for_key(" "), Some(ControlEvent::Confirm));
        assert_eq!(control_for_key("Escape"), Some(ControlEvent::Exit));
        assert_eq!(
            control_for_key("7"),
            Some(ControlEvent::SelectMatch(MatchLength::BestOf7))
        );
        assert_eq!(control_for_key("4"), None);
        assert_eq!(control_for_key("35"), None);
        assert_eq!(control_for_key("w"), None);
    }

    #[test]
    fn test_mute_key() {
        assert!(is_mute_key("m"));
        assert!(is_mute_key("M"));
        assert!(!is_mute_key("n"));
    }

    #[test]
    fn test_autopilot_tracks_ball_in_reach() {
        let paddle = Paddle::new(10.0, 600.0);
        let mut ball = Ball::new(800.0, 600.0);

        // Level with the paddle center
        assert_eq!(autopilot(&paddle, &ball, 1000.0), TickInput::default());

        ball.pos.y = 100.0;
        assert_eq!(
            autopilot(&paddle, &ball, 1000.0),
            TickInput { up: true, down: false }
        );
        ball.pos.y = 500.0;
        assert_eq!(
            autopilot(&paddle, &ball, 1000.0),
            TickInput { up: false, down: true }
        );
    }

    #[test]
    fn test_autopilot_idle_out_of_reach() {
        let paddle = Paddle::new(10.0, 600.0);
        let mut ball = Ball::new(800.0, 600.0);
        ball.pos.y = 100.0;
        assert_eq!(autopilot(&paddle, &ball, 100.0), TickInput::default());
    }
}

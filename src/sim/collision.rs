//! Collision detection between the ball and the paddles
//!
//! Both shapes are axis-aligned rectangles, so detection is a plain overlap
//! test. The interesting output is where on the paddle the ball landed, which
//! drives the bounce angle.

use super::rect::Rect;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Ball center relative to paddle center, -1 (top edge) to 1 (bottom edge)
    pub offset: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            offset: 0.0,
        }
    }
}

/// Check collision between the ball and a paddle
pub fn ball_paddle_collision(ball: &Rect, paddle: &Rect) -> CollisionResult {
    if !ball.intersects(paddle) {
        return CollisionResult::miss();
    }

    let half_height = paddle.size.y / 2.0;
    let offset = if half_height > 0.0 {
        ((ball.center().y - paddle.center().y) / half_height).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    CollisionResult { hit: true, offset }
}

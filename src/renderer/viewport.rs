//! Playfield to screen mapping
//!
//! The playfield keeps its aspect ratio and is centered in whatever surface
//! it is drawn on; the leftover bands stay black.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the playfield's top-left corner
    pub offset: Vec2,
    /// Screen pixels per playfield pixel
    pub scale: f32,
}

impl Viewport {
    /// Largest uniform scale that fits `field` inside `screen`
    pub fn fit(screen: Vec2, field: Vec2) -> Self {
        if field.x <= 0.0 || field.y <= 0.0 {
            return Self {
                offset: Vec2::ZERO,
                scale: 1.0,
            };
        }
        let scale = (screen.x / field.x).min(screen.y / field.y).max(0.0);
        Self {
            offset: (screen - field * scale) / 2.0,
            scale,
        }
    }

    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        self.offset + p * self.scale
    }
}

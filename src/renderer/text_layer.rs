//! DOM text overlay
//!
//! Scores, banners and menu lines are drawn as absolutely positioned divs
//! stacked over the canvas. Nodes are pooled and reused between frames.

use glam::Vec2;

use super::Viewport;
use crate::scene::Color;

/// Inline style for one text node. Position and size are in CSS pixels.
pub fn text_style(size: f32, center_x: f32, top_y: f32, color: Color, viewport: &Viewport) -> String {
    let pos = viewport.to_screen(Vec2::new(center_x, top_y));
    format!(
        "position:absolute;left:{:.1}px;top:{:.1}px;transform:translateX(-50%);\
         font:{:.1}px Arial,sans-serif;line-height:1;white-space:nowrap;\
         pointer-events:none;color:{}",
        pos.x,
        pos.y,
        size * viewport.scale,
        color.to_css()
    )
}

#[cfg(target_arch = "wasm32")]
pub use dom::TextLayer;

#[cfg(target_arch = "wasm32")]
mod dom {
    use web_sys::{Document, Element};

    use super::{Viewport, text_style};
    use crate::scene::{DrawCommand, DrawList};

    pub struct TextLayer {
        document: Document,
        root: Element,
        nodes: Vec<Element>,
    }

    impl TextLayer {
        /// Attach to the overlay element with the given id
        pub fn attach(document: &Document, root_id: &str) -> Option<Self> {
            let root = document.get_element_by_id(root_id)?;
            Some(Self {
                document: document.clone(),
                root,
                nodes: Vec::new(),
            })
        }

        /// Mirror the scene's text commands into the DOM
        pub fn sync(&mut self, scene: &DrawList, viewport: &Viewport) {
            let mut used = 0;
            for cmd in &scene.commands {
                let DrawCommand::Text {
                    text,
                    size,
                    center_x,
                    top_y,
                    color,
                } = cmd
                else {
                    continue;
                };
                let Some(node) = self.node(used) else {
                    break;
                };
                if node.text_content().as_deref() != Some(text.as_str()) {
                    node.set_text_content(Some(text));
                }
                let style = text_style(*size, *center_x, *top_y, *color, viewport);
                if node.get_attribute("style").as_deref() != Some(style.as_str()) {
                    let _ = node.set_attribute("style", &style);
                }
                used += 1;
            }

            for node in &self.nodes[used..] {
                let _ = node.set_attribute("style", "display:none");
            }
        }

        /// Pooled node at `index`, created on first use
        fn node(&mut self, index: usize) -> Option<&Element> {
            while self.nodes.len() <= index {
                let el = match self.document.create_element("div") {
                    Ok(el) => el,
                    Err(e) => {
                        log::warn!("Could not create text node: {:?}", e);
                        return None;
                    }
                };
                if let Err(e) = self.root.append_child(&el) {
                    log::warn!("Could not attach text node: {:?}", e);
                    return None;
                }
                self.nodes.push(el);
            }
            self.nodes.get(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_scales_with_viewport() {
        let vp = Viewport::fit(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        let style = text_style(30.0, 200.0, 20.0, Color::WHITE, &vp);
        assert!(style.contains("left:100.0px"));
        assert!(style.contains("top:10.0px"));
        assert!(style.contains("font:15.0px"));
        assert!(style.contains("color:rgb(255, 255, 255)"));
    }

    #[test]
    fn test_style_includes_letterbox_offset() {
        let vp = Viewport::fit(Vec2::new(1000.0, 600.0), Vec2::new(800.0, 600.0));
        let style = text_style(40.0, 400.0, 150.0, Color::WHITE, &vp);
        assert!(style.contains("left:500.0px"));
        assert!(style.contains("top:150.0px"));
    }
}

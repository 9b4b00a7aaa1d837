//! `Renderer` backend for the egui viewer.
//!
//! The view renders into a shared [`Frame`]; the UI draws whatever frame is
//! current on its next repaint.

use std::cell::RefCell;
use std::rc::Rc;

use nxplot_view::{Renderer, Scene};

/// The latest scene of a window.
#[derive(Default)]
pub struct Frame {
    /// Scene to draw, `None` once the view is closed.
    pub scene: Option<Scene>,
    /// Bumped on every render, so textures know when to rebuild.
    pub generation: u64,
}

/// Renderer that hands scenes to the egui UI.
pub struct EguiRenderer {
    frame: Rc<RefCell<Frame>>,
}

impl EguiRenderer {
    /// Creates a renderer writing into `frame`.
    pub fn new(frame: Rc<RefCell<Frame>>) -> Self {
        Self { frame }
    }
}

impl Renderer for EguiRenderer {
    fn render(&mut self, scene: &Scene) {
        let mut frame = self.frame.borrow_mut();
        frame.scene = Some(scene.clone());
        frame.generation += 1;
    }

    fn clear(&mut self) {
        let mut frame = self.frame.borrow_mut();
        frame.scene = None;
        frame.generation += 1;
    }
}

//! Drawing of resolved scenes.

mod plot;
mod renderer;
mod texture;

pub use plot::{draw_scene, PlotInteraction};
pub use renderer::{EguiRenderer, Frame};
pub use texture::TextureCache;

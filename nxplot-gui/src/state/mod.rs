//! Application state modules.

mod controls;
mod processing;
mod window;

pub use controls::{AxisRow, ViewControls, ZRow};
pub use processing::ProcessingState;
pub use window::{DragState, FileState, ProjectionForm, WindowState};

//! UI rendering modules.
//!
//! - `control_panel`: top bar, file groups and axis controls
//! - `main_view`: tabs and the plot area with zoom boxes
//! - `projection_window`: the projection panel of a window
//! - `theme`: styling

mod control_panel;
mod main_view;
mod projection_window;
pub mod theme;

//! nxplot-view: Interactive plot views over N-dimensional NeXus data.
//!
//! This crate holds everything a plot window knows, independent of the
//! toolkit that draws it:
//! - **State** - which dimensions are displayed, sliced or summed, and every
//!   axis window, scale and lock ([`ViewState`])
//! - **Interaction** - zoom boxes, zoom history, z-slice slideshows and the
//!   control-panel contracts ([`AxisControl`], [`SpinControl`])
//! - **Rendering** - fully resolved [`Scene`]s handed to a [`Renderer`]
//! - **Windows** - [`PlotView`] orchestration and the [`PlotViewRegistry`]
//!
#![warn(missing_docs)]

pub mod colormap;
pub mod config;
pub mod controls;
pub mod observer;
pub mod options;
mod panel;
mod plotview;
mod registry;
pub mod render;
mod slideshow;
pub mod state;
pub mod zoom;

pub use colormap::Colormap;
pub use config::PlotConfig;
pub use controls::{
    format_value, AxisControl, ControlEvent, ControlId, ControlMessage, SignalBlocker, SpinControl,
};
pub use observer::{ChangeEvent, SubscriptionId, ViewChange};
pub use options::{Aspect, Interpolation, LineFormat, PlotOptions};
pub use panel::ProjectionPanel;
pub use plotview::{Phase, PlotView};
pub use registry::PlotViewRegistry;
pub use render::{DrawCommand, RecordingRenderer, Renderer, Scene};
pub use slideshow::{Direction, Slideshow};
pub use state::{AxisRef, Curve, DisplayAxis, ViewState};
pub use zoom::{DataTransform, MouseButton, ScreenPoint, ScreenRect, ZoomBox, ZoomHistory};

// Re-export the shared error type
pub use nxplot_core::{Error, Result};

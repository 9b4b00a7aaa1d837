//! nxplot-core: Axis models and projections for NeXus plot views.
//!
//! This crate provides the data-side foundations of a plot view: the array
//! data source contract, the axis model with its limit and locking rules,
//! degenerate-range handling, and the reduction of N-D signals to the 1-D or
//! 2-D arrays that are rendered.
//!

pub mod axis;
pub mod data;
pub mod error;
pub mod limits;
pub mod projection;

pub use axis::{boundaries, centers, PlotAxis};
pub use data::{NxData, NxField};
pub use error::{Error, Result};
pub use limits::nonsingular;
pub use projection::{fix_projection, IndexRange, Projection, ProjectionRequest};

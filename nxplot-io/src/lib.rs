//! nxplot-io: NeXus file access for nxplot.
//!
//! This crate reads `NXdata` groups from NeXus/HDF5 files into
//! [`nxplot_core::NxData`], following the `signal`, `axes`,
//! `<axis>_indices` and `errors` conventions. HDF5 access is behind the
//! `hdf5` feature; the attribute conventions themselves are always available.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod nexus;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use crate::hdf5::{list_nxdata, read_nxdata, write_nxdata};
pub use nexus::{assign_axes, complete_axes, parse_axes, NxDataInfo};

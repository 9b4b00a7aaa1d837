//! Application message types for async communication.
//!
//! File access runs on worker threads; results come back to the UI thread
//! through a channel as `AppMessage`s.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nxplot_core::NxData;
use nxplot_io::NxDataInfo;

/// Messages sent from background workers to the UI thread.
pub enum AppMessage {
    /// NXdata groups found in a file.
    GroupsListed(PathBuf, Vec<NxDataInfo>),

    /// A group was read and validated.
    ///
    /// Contains the file, the group path, the data and the time taken.
    GroupLoaded {
        /// Source file.
        path: PathBuf,
        /// Group path inside the file.
        group: String,
        /// Data ready to plot.
        data: Arc<NxData>,
        /// Read duration.
        elapsed: Duration,
    },

    /// Reading failed.
    LoadError(String),
}

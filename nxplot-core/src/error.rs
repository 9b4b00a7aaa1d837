//! Error types for nxplot-core.

use thiserror::Error;

/// Result type alias for nxplot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain and validation errors raised by plotting operations.
///
/// These are raised before any view state is written, so a caller that
/// receives one can assume the model is exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The data has no signal field to plot.
    #[error("No plotting signal defined")]
    NoSignal,

    /// The signal or an associated array has an unusable shape.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// An axis array is inconsistent with the signal, or an axis index is out of range.
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    /// The same dimension was selected for more than one display axis.
    #[error("duplicate axes selected: dimension {0}")]
    DuplicateAxes(usize),

    /// A displayed projection dimension collapses to at most one index.
    #[error("projection axis {dim} has zero range ({start}..{stop})")]
    ZeroRange {
        /// Dimension index in the full signal.
        dim: usize,
        /// Start index.
        start: usize,
        /// Stop index (exclusive).
        stop: usize,
    },

    /// Limits do not fit the signal shape.
    #[error("invalid limits: {0}")]
    InvalidLimits(String),

    /// A plot option could not be interpreted.
    #[error("invalid option {name}: {value}")]
    InvalidOption {
        /// Option name.
        name: String,
        /// Offending value.
        value: String,
    },

    /// An operation needs a plot that has not been drawn yet.
    #[error("plot view has no data")]
    NotInitialized,

    /// The plot view has been closed.
    #[error("plot view {0} is closed")]
    Closed(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidOption`].
    pub fn option(name: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidOption {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(Error::NoSignal.to_string(), "No plotting signal defined");
        let err = Error::ZeroRange {
            dim: 1,
            start: 3,
            stop: 3,
        };
        assert_eq!(err.to_string(), "projection axis 1 has zero range (3..3)");
        assert_eq!(
            Error::option("cmap", "plasma-ish").to_string(),
            "invalid option cmap: plasma-ish"
        );
    }
}

//! Plot view configuration.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;
use crate::options::Interpolation;

/// Defaults and tunables shared by every plot view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlotConfig {
    /// Fraction of the new data span added beyond a side that an overlay reaches.
    pub overlay_padding: f64,
    /// Colormap used when a plot names none.
    pub default_colormap: Colormap,
    /// Interpolation used when a plot names none.
    pub default_interpolation: Interpolation,
    /// Initial slideshow interval in milliseconds.
    pub slideshow_interval_ms: u64,
    /// Shortest slideshow interval reachable by repeated presses.
    pub min_slideshow_interval_ms: u64,
    /// Sum over z ranges wider than one slice instead of taking the first slice.
    pub summed: bool,
    /// Recompute intensity limits from the visible slice on every render.
    pub autoscale: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            overlay_padding: 0.05,
            default_colormap: Colormap::Viridis,
            default_interpolation: Interpolation::Nearest,
            slideshow_interval_ms: 1000,
            min_slideshow_interval_ms: 15,
            summed: true,
            autoscale: false,
        }
    }
}

impl PlotConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overlay padding fraction.
    #[must_use]
    pub fn with_overlay_padding(mut self, padding: f64) -> Self {
        self.overlay_padding = padding;
        self
    }

    /// Sets the default colormap.
    #[must_use]
    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.default_colormap = colormap;
        self
    }

    /// Sets the autoscale default.
    #[must_use]
    pub fn with_autoscale(mut self, autoscale: bool) -> Self {
        self.autoscale = autoscale;
        self
    }

    /// Initial slideshow interval.
    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow_interval_ms)
    }

    /// Lower bound for the slideshow interval.
    pub fn min_slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.min_slideshow_interval_ms.min(self.slideshow_interval_ms))
    }
}

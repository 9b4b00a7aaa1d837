//! Projection panel: build a 1-D or 2-D projection of the plotted signal.
//!
//! The panel holds value limits for every plotted dimension, seeded from the
//! view's axes and from the last zoom box, and turns them into a
//! [`ProjectionRequest`] against the view's data.

use std::collections::BTreeMap;

use nxplot_core::{Error, NxData, NxField, ProjectionRequest, Result};

use crate::state::{AxisRef, ViewState};
use crate::zoom::ZoomRect;

/// Settings of a projection of the plotted data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPanel {
    x: usize,
    y: Option<usize>,
    limits: BTreeMap<usize, (f64, f64)>,
    summed: bool,
}

impl ProjectionPanel {
    /// Seeds a panel from a view: its displayed axes, their limits and the
    /// last zoom box.
    ///
    /// # Errors
    /// `InvalidAxis` when the view has no dimension on x.
    pub fn new(state: &ViewState) -> Result<Self> {
        let x = state
            .x()
            .dim()
            .ok_or_else(|| Error::InvalidAxis("view has no x dimension".to_string()))?;
        let limits = state
            .axes()
            .iter()
            .map(|(&dim, axis)| (dim, axis.get_limits()))
            .collect();
        let mut panel = Self {
            x,
            y: state.y().dim(),
            limits,
            summed: state.summed(),
        };
        if let Some(rect) = state.zoom() {
            panel.apply_zoom(rect);
        }
        Ok(panel)
    }

    /// Horizontal dimension of the projection.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Vertical dimension, `None` for a 1-D projection.
    pub fn y(&self) -> Option<usize> {
        self.y
    }

    /// Value limits of a dimension.
    pub fn limits(&self, dim: usize) -> Option<(f64, f64)> {
        self.limits.get(&dim).copied()
    }

    /// Whether collapsed ranges are summed.
    pub fn summed(&self) -> bool {
        self.summed
    }

    /// Chooses the horizontal dimension.
    pub fn set_x(&mut self, dim: usize) {
        self.x = dim;
    }

    /// Chooses the vertical dimension; `None` makes the projection 1-D.
    pub fn set_y(&mut self, dim: Option<usize>) {
        self.y = dim;
    }

    /// Sets the value limits of a dimension.
    pub fn set_limits(&mut self, dim: usize, lo: f64, hi: f64) {
        let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
        self.limits.insert(dim, (lo, hi));
    }

    /// Sum over collapsed ranges instead of taking their first index.
    pub fn set_summed(&mut self, summed: bool) {
        self.summed = summed;
    }

    /// Copies the windows of a zoom box into the limits.
    pub fn apply_zoom(&mut self, rect: &ZoomRect) {
        for window in [rect.x, rect.y] {
            if let AxisRef::Dim(dim) = window.axis {
                self.set_limits(dim, window.lo, window.hi);
            }
        }
    }

    /// Index request for the current settings against the view's data.
    ///
    /// # Errors
    /// `DuplicateAxes` when x and y are the same dimension, `InvalidAxis` for
    /// dimensions that are not plotted.
    pub fn request(&self, state: &ViewState) -> Result<ProjectionRequest> {
        if self.y == Some(self.x) {
            return Err(Error::DuplicateAxes(self.x));
        }
        let data = state.data();
        let shape = data.shape();
        let squeezed = data.squeezed_dims();
        let position = |dim: usize| {
            squeezed
                .iter()
                .position(|&d| d == dim)
                .filter(|_| state.axes().contains_key(&dim))
                .ok_or_else(|| Error::InvalidAxis(format!("dimension {dim} is not plotted")))
        };
        let mut keep = Vec::with_capacity(2);
        if let Some(y) = self.y {
            keep.push(position(y)?);
        }
        keep.push(position(self.x)?);

        let limits: Vec<(usize, usize)> = squeezed
            .iter()
            .map(|&dim| match (state.axes().get(&dim), self.limits.get(&dim)) {
                (Some(axis), Some(&(lo, hi))) => axis.index_range(lo, hi),
                (Some(axis), None) => axis.current_index_range(),
                (None, _) => (0, shape[dim]),
            })
            .collect();
        Ok(ProjectionRequest::squeezed(shape, &keep, &limits).summed(self.summed))
    }

    /// Projects the view's data into a new group that can be plotted.
    ///
    /// # Errors
    /// Errors of [`ProjectionPanel::request`] and of the projection itself,
    /// notably `ZeroRange` when a kept window covers a single bin.
    pub fn project(&self, state: &ViewState) -> Result<NxData> {
        let request = self.request(state)?;
        let data = state.data();
        let signal = data.signal()?;
        let projection =
            request.project(&signal.values, data.errors.as_ref(), &state.full_axes())?;

        let axes = projection
            .axes
            .iter()
            .map(|axis| NxField {
                name: axis.name().to_string(),
                values: ndarray::Array1::from(axis.data().to_vec()).into_dyn(),
                long_name: axis.long_name().map(str::to_string),
                units: axis.units().map(str::to_string),
            })
            .collect();
        let mut result = NxData::new(NxField {
            name: signal.name.clone(),
            values: projection.values,
            long_name: signal.long_name.clone(),
            units: signal.units.clone(),
        })
        .with_name(format!("{}_projection", data.name))
        .with_axes(axes)
        .with_title(format!("{} (projection)", state.title()));
        result.errors = projection.errors;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};

    use crate::config::PlotConfig;
    use crate::options::PlotOptions;
    use crate::zoom::AxisWindow;

    fn cube() -> ViewState {
        #[allow(clippy::cast_precision_loss)]
        let values =
            Array::from_shape_vec(IxDyn(&[3, 4, 5]), (0..60).map(|i| i as f64).collect()).unwrap();
        let data = Arc::new(NxData::new(NxField::new("counts", values)));
        ViewState::plot(data, &PlotOptions::default(), &PlotConfig::default(), None).unwrap()
    }

    #[test]
    fn test_seeded_from_view() {
        let panel = ProjectionPanel::new(&cube()).unwrap();
        assert_eq!(panel.x(), 2);
        assert_eq!(panel.y(), Some(1));
        assert_eq!(panel.limits(0), Some((0.0, 0.0)));
    }

    #[test]
    fn test_duplicate_axes() {
        let state = cube();
        let mut panel = ProjectionPanel::new(&state).unwrap();
        panel.set_y(Some(2));
        assert_eq!(panel.request(&state), Err(Error::DuplicateAxes(2)));
    }

    #[test]
    fn test_summed_line_projection() {
        let state = cube();
        let mut panel = ProjectionPanel::new(&state).unwrap();
        panel.set_y(None);
        panel.set_summed(true);
        panel.set_limits(0, 0.0, 2.0);
        let data = panel.project(&state).unwrap();
        assert_eq!(data.shape(), &[5]);
        // sum over k and j of 20k + 5j
        assert_relative_eq!(data.signal().unwrap().values[[0]], 330.0);
        assert_eq!(data.axes.len(), 1);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_zoom_seeds_limits_and_zero_range() {
        let mut state = cube();
        state.stage_zoom(ZoomRect {
            x: AxisWindow {
                axis: AxisRef::Dim(2),
                lo: 1.1,
                hi: 1.2,
            },
            y: AxisWindow {
                axis: AxisRef::Dim(1),
                lo: 0.0,
                hi: 3.0,
            },
        });
        let panel = ProjectionPanel::new(&state).unwrap();
        assert_eq!(panel.limits(2), Some((1.1, 1.2)));
        assert!(matches!(
            panel.project(&state),
            Err(Error::ZeroRange { .. })
        ));
    }
}

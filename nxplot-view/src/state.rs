//! The state of one plot window: what is shown and how.
//!
//! A [`ViewState`] is built by [`ViewState::plot`] and then mutated in place
//! by limit edits, zooms, axis swaps and scale changes. Every mutating method
//! validates its arguments before writing, so an `Err` leaves the state as it
//! was.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use ndarray::{ArrayD, Axis, Slice};

use nxplot_core::limits::{
    expand_window, finite_min_max, log_safe_limits, EMPTY_RANGE, LOG_FALLBACK,
};
use nxplot_core::{Error, NxData, PlotAxis, Projection, ProjectionRequest, Result};

use crate::colormap::Colormap;
use crate::config::PlotConfig;
use crate::options::{Aspect, Interpolation, LineFormat, PlotOptions};
use crate::zoom::{ViewLimits, ZoomRect};

/// Reference to one of the axes of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AxisRef {
    /// Axis of a signal dimension (full, unsqueezed numbering).
    Dim(usize),
    /// The intensity axis: y of a 1-D plot, colour of a 2-D plot.
    Signal,
}

impl AxisRef {
    /// Signal dimension, if this is a dimension axis.
    pub fn dim(self) -> Option<usize> {
        match self {
            AxisRef::Dim(dim) => Some(dim),
            AxisRef::Signal => None,
        }
    }
}

/// Display axis that a data dimension can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayAxis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// One 1-D data set drawn on a line plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// Legend label.
    pub label: String,
    /// Bin centres.
    pub x: Vec<f64>,
    /// Signal values.
    pub y: Vec<f64>,
    /// Uncertainties, when the data has them.
    pub errors: Option<Vec<f64>>,
    /// Marker and line style.
    pub fmt: LineFormat,
}

impl Curve {
    fn x_extent(&self) -> Option<(f64, f64)> {
        finite_min_max(&self.x)
    }

    fn y_extent(&self) -> Option<(f64, f64)> {
        match &self.errors {
            Some(errors) => {
                let bounds: Vec<f64> = self
                    .y
                    .iter()
                    .zip(errors)
                    .flat_map(|(y, e)| [y - e.abs(), y + e.abs()])
                    .collect();
                finite_min_max(&bounds)
            }
            None => finite_min_max(&self.y),
        }
    }
}

/// Everything a plot window currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    data: Arc<NxData>,
    axes: BTreeMap<usize, PlotAxis>,
    signal: PlotAxis,
    x: AxisRef,
    y: AxisRef,
    z: Vec<usize>,
    active_z: Option<usize>,
    color_dim: Option<usize>,
    aspect: Aspect,
    aspect_pinned: bool,
    colormap: Colormap,
    interpolation: Interpolation,
    autoscale: bool,
    summed: bool,
    skew: Option<f64>,
    zoom: Option<ZoomRect>,
    reset: ViewLimits,
    curves: Vec<Curve>,
    title: String,
}

fn make_axis(data: &NxData, dim: usize) -> PlotAxis {
    let len = data.shape()[dim];
    match data.axes.get(dim) {
        Some(field) => PlotAxis::from_field(field, dim, len),
        None => PlotAxis::index(dim, len),
    }
}

fn positive_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let positive: Vec<f64> = values.filter(|v| *v > 0.0).collect();
    finite_min_max(&positive)
}

fn check_finite(lo: f64, hi: f64) -> Result<()> {
    if lo.is_finite() && hi.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidLimits(format!("limits {lo}..{hi} are not finite")))
    }
}

impl ViewState {
    /// Builds the state for plotting `data`.
    ///
    /// `previous` is the state of the window being plotted into, if any; it
    /// supplies the axes an overlay is added to and the settings a new plot
    /// inherits (colormap, interpolation, autoscale, a pinned aspect).
    ///
    /// # Errors
    /// `NoSignal`, `InvalidShape` and `InvalidAxis` from data validation,
    /// `InvalidShape` for single-valued signals and `InvalidOption` for
    /// unparseable options or `image` on data that is not RGB(A).
    pub fn plot(
        data: Arc<NxData>,
        options: &PlotOptions,
        config: &PlotConfig,
        previous: Option<&ViewState>,
    ) -> Result<Self> {
        data.validate()?;
        let resolved = options.resolve(config)?;
        let signal = data.signal()?;
        let shape = data.shape().to_vec();

        let mut dims = data.squeezed_dims();
        if dims.is_empty() {
            return Err(Error::InvalidShape(format!(
                "signal {} has a single value",
                signal.name
            )));
        }
        let color_dim = if options.image {
            match dims.last() {
                Some(&last) if dims.len() == 3 && matches!(shape[last], 3 | 4) => Some(last),
                _ => return Err(Error::option("image", format!("{shape:?}"))),
            }
        } else {
            None
        };
        if color_dim.is_some() {
            dims.pop();
        }

        let axes: BTreeMap<usize, PlotAxis> =
            dims.iter().map(|&dim| (dim, make_axis(&data, dim))).collect();
        let title = data
            .title
            .clone()
            .unwrap_or_else(|| signal.label());

        let mut state = ViewState {
            data: Arc::clone(&data),
            signal: PlotAxis::signal(signal.name.clone(), &signal.values.view())
                .with_labels(signal.long_name.clone(), signal.units.clone()),
            x: AxisRef::Dim(dims[dims.len() - 1]),
            y: AxisRef::Signal,
            z: Vec::new(),
            active_z: None,
            color_dim,
            aspect: Aspect::Auto,
            aspect_pinned: false,
            colormap: match (&options.cmap, previous) {
                (None, Some(p)) => p.colormap,
                _ => resolved.colormap,
            },
            interpolation: match (&options.interpolation, previous) {
                (None, Some(p)) => p.interpolation,
                _ => resolved.interpolation,
            },
            autoscale: previous.map_or(config.autoscale, |p| p.autoscale),
            summed: previous.map_or(config.summed, |p| p.summed),
            skew: None,
            zoom: None,
            reset: ViewLimits {
                x: (0.0, 1.0),
                y: (0.0, 1.0),
            },
            curves: Vec::new(),
            title,
            axes,
        };

        if dims.len() == 1 {
            let curve = state.curve(resolved.fmt)?;
            let previous_1d = previous.filter(|p| p.is_1d());
            match (options.over, previous_1d) {
                (true, Some(previous)) => return previous.overlay(data, curve, options, config),
                (true, None) => warn!("nothing to overlay on; starting a new plot"),
                _ => {}
            }
            if let Some((lo, hi)) = curve.y_extent() {
                state.signal.set_range(lo, hi);
                state.signal.reset_limits();
            }
            state.curves.push(curve);
        } else {
            let n = dims.len();
            state.y = AxisRef::Dim(dims[n - 2]);
            state.z = dims[..n - 2].to_vec();
            state.active_z = state.z.last().copied();
            for dim in &state.z {
                if let Some(axis) = state.axes.get_mut(dim) {
                    let first = axis.value_from_index(0);
                    axis.set_limits(first, first);
                    axis.set_locked(true);
                }
            }
            if color_dim.is_none() {
                let projection = state.visible_projection()?;
                let window = state.window_values(&projection);
                let values = window.view();
                state.signal = PlotAxis::signal(signal.name.clone(), &values)
                    .with_labels(signal.long_name.clone(), signal.units.clone());
            }
        }

        state.apply_overrides(options)?;
        state.apply_log_options(options)?;

        match (color_dim, resolved.aspect, previous) {
            (Some(_), _, _) => state.aspect = Aspect::Equal,
            (None, Some(aspect), _) => {
                state.aspect = aspect;
                state.aspect_pinned = aspect != Aspect::Auto;
            }
            (None, None, Some(p)) if p.aspect_pinned && !state.is_1d() => {
                state.aspect = p.aspect;
                state.aspect_pinned = true;
            }
            _ => {}
        }

        state.reset = state.view_limits();
        debug!(
            "plotted {} with shape {:?}: x={:?} y={:?} z={:?}",
            state.title, shape, state.x, state.y, state.z
        );
        Ok(state)
    }

    fn overlay(
        &self,
        data: Arc<NxData>,
        curve: Curve,
        options: &PlotOptions,
        config: &PlotConfig,
    ) -> Result<Self> {
        let mut state = self.clone();
        let padding = config.overlay_padding;
        if let Some(extent) = curve.x_extent() {
            let axis = state.axis_mut(state.x)?;
            let (lo, hi) = expand_window(axis.get_limits(), extent, padding);
            axis.expand_range(lo, hi);
            axis.set_limits(lo, hi);
        }
        if let Some(extent) = curve.y_extent() {
            let (lo, hi) = expand_window(state.signal.get_limits(), extent, padding);
            state.signal.expand_range(lo, hi);
            state.signal.set_limits(lo, hi);
        }
        state.data = data;
        state.curves.push(curve);
        state.apply_overrides(options)?;
        state.apply_log_options(options)?;
        state.reset = state.view_limits();
        debug!("overlaid curve {} on {}", state.curves.len(), state.title);
        Ok(state)
    }

    fn curve(&self, fmt: LineFormat) -> Result<Curve> {
        let dim = self.x.dim().ok_or(Error::NotInitialized)?;
        let axis = self.axis(self.x)?;
        let shape = self.data.shape();
        let request = ProjectionRequest::squeezed(shape, &[0], &[(0, shape[dim])]);
        let signal = self.data.signal()?;
        let projection = request.project(
            &signal.values,
            self.data.errors.as_ref(),
            &self.full_axes(),
        )?;
        Ok(Curve {
            label: signal.label(),
            x: axis.centers().to_vec(),
            y: projection.values.iter().copied().collect(),
            errors: projection.errors.map(|e| e.iter().copied().collect()),
            fmt,
        })
    }

    fn apply_overrides(&mut self, options: &PlotOptions) -> Result<()> {
        let vlims = if self.is_1d() {
            (None, None)
        } else {
            (options.vmin, options.vmax)
        };
        for (axis, (lo, hi)) in [
            (self.x, (options.xmin, options.xmax)),
            (self.y, (options.ymin, options.ymax)),
            (AxisRef::Signal, vlims),
        ] {
            if lo.is_none() && hi.is_none() {
                continue;
            }
            let target = self.axis_mut(axis)?;
            let lo = lo.unwrap_or(target.lo());
            let hi = hi.unwrap_or(target.hi());
            check_finite(lo, hi)?;
            target.expand_range(lo, hi);
            target.set_limits(lo, hi);
        }
        Ok(())
    }

    fn apply_log_options(&mut self, options: &PlotOptions) -> Result<()> {
        let mut wanted = Vec::new();
        if options.logx {
            wanted.push(self.x);
        }
        if options.logy {
            wanted.push(self.y);
        }
        if options.log {
            wanted.push(AxisRef::Signal);
        }
        for axis in wanted {
            self.set_log(axis, true)?;
        }
        Ok(())
    }

    /// The data being shown (the latest one for overlays).
    pub fn data(&self) -> &Arc<NxData> {
        &self.data
    }

    /// Axis for a reference.
    ///
    /// # Errors
    /// `InvalidAxis` when the view has no such axis.
    pub fn axis(&self, axis: AxisRef) -> Result<&PlotAxis> {
        match axis {
            AxisRef::Signal => Ok(&self.signal),
            AxisRef::Dim(dim) => self
                .axes
                .get(&dim)
                .ok_or_else(|| Error::InvalidAxis(format!("dimension {dim} is not plotted"))),
        }
    }

    fn axis_mut(&mut self, axis: AxisRef) -> Result<&mut PlotAxis> {
        match axis {
            AxisRef::Signal => Ok(&mut self.signal),
            AxisRef::Dim(dim) => self
                .axes
                .get_mut(&dim)
                .ok_or_else(|| Error::InvalidAxis(format!("dimension {dim} is not plotted"))),
        }
    }

    /// Dimension axes, keyed by signal dimension.
    pub fn axes(&self) -> &BTreeMap<usize, PlotAxis> {
        &self.axes
    }

    /// The intensity axis.
    pub fn signal_axis(&self) -> &PlotAxis {
        &self.signal
    }

    /// Reference of the horizontal axis.
    pub fn x(&self) -> AxisRef {
        self.x
    }

    /// Reference of the vertical axis.
    pub fn y(&self) -> AxisRef {
        self.y
    }

    /// Horizontal axis.
    pub fn x_axis(&self) -> &PlotAxis {
        self.axis(self.x).unwrap_or(&self.signal)
    }

    /// Vertical axis (the signal axis of a 1-D plot).
    pub fn y_axis(&self) -> &PlotAxis {
        self.axis(self.y).unwrap_or(&self.signal)
    }

    /// Slice dimensions, in signal order.
    pub fn z_dims(&self) -> &[usize] {
        &self.z
    }

    /// Slice dimension stepped by the slideshow.
    pub fn active_z(&self) -> Option<usize> {
        self.active_z
    }

    /// Colour channel dimension of an RGB(A) image.
    pub fn color_dim(&self) -> Option<usize> {
        self.color_dim
    }

    /// Whether this is a line plot.
    pub fn is_1d(&self) -> bool {
        self.y == AxisRef::Signal
    }

    /// Whether the signal is drawn as an RGB(A) image.
    pub fn is_rgb(&self) -> bool {
        self.color_dim.is_some()
    }

    /// Number of displayed data dimensions (1 or 2).
    pub fn ndim(&self) -> usize {
        if self.is_1d() {
            1
        } else {
            2
        }
    }

    /// Aspect ratio.
    pub fn aspect(&self) -> Aspect {
        self.aspect
    }

    /// Colormap.
    pub fn colormap(&self) -> Colormap {
        self.colormap
    }

    /// Interpolation.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Whether intensity limits follow the visible slice.
    pub fn autoscale(&self) -> bool {
        self.autoscale
    }

    /// Whether z ranges are summed.
    pub fn summed(&self) -> bool {
        self.summed
    }

    /// Skew angle in degrees, `None` when the axes are orthogonal.
    pub fn skew(&self) -> Option<f64> {
        self.skew
    }

    /// Last zoom rectangle, committed or staged.
    pub fn zoom(&self) -> Option<&ZoomRect> {
        self.zoom.as_ref()
    }

    /// Limits restored by Home.
    pub fn reset_limits(&self) -> ViewLimits {
        self.reset
    }

    /// Curves of a line plot.
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Plot title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current x and y limits.
    pub fn view_limits(&self) -> ViewLimits {
        ViewLimits {
            x: self.x_axis().get_limits(),
            y: self.y_axis().get_limits(),
        }
    }

    /// Sets both limits of an axis.
    ///
    /// Dimension axes are clamped to their data range; the signal axis grows
    /// its range instead. On a log axis the result is made positive.
    ///
    /// # Errors
    /// `InvalidAxis` for an unknown axis and `InvalidLimits` for non-finite limits.
    pub fn set_limits(&mut self, axis: AxisRef, lo: f64, hi: f64) -> Result<()> {
        check_finite(lo, hi)?;
        let target = self.axis_mut(axis)?;
        if axis == AxisRef::Signal {
            target.expand_range(lo, hi);
            target.set_limits(lo, hi);
        } else {
            target.set_limits(lo, hi);
            target.clamp_limits();
        }
        if target.log() {
            self.enforce_log(axis)?;
        }
        Ok(())
    }

    /// Moves the upper limit through the lock-aware path.
    ///
    /// On a locked dimension axis `hi` is clamped so the window stays in range.
    ///
    /// # Errors
    /// `InvalidAxis` for an unknown axis and `InvalidLimits` for a non-finite value.
    pub fn set_hi(&mut self, axis: AxisRef, hi: f64) -> Result<()> {
        check_finite(hi, hi)?;
        let target = self.axis_mut(axis)?;
        let hi = match (axis, target.locked()) {
            (AxisRef::Signal, _) => hi,
            (AxisRef::Dim(_), true) => hi.clamp(
                (target.min() + target.diff()).min(target.max()),
                target.max(),
            ),
            (AxisRef::Dim(_), false) => hi.clamp(target.min(), target.max()),
        };
        target.set_hi(hi);
        if target.log() {
            self.enforce_log(axis)?;
        }
        Ok(())
    }

    /// Moves the lower limit. Never moves `hi`.
    ///
    /// # Errors
    /// `InvalidAxis` for an unknown axis and `InvalidLimits` for a non-finite value.
    pub fn set_lo(&mut self, axis: AxisRef, lo: f64) -> Result<()> {
        check_finite(lo, lo)?;
        let target = self.axis_mut(axis)?;
        let lo = match axis {
            AxisRef::Signal => lo,
            AxisRef::Dim(_) => lo.max(target.min()),
        };
        target.set_lo(lo);
        if target.log() {
            self.enforce_log(axis)?;
        }
        Ok(())
    }

    /// Locks or unlocks the window width of an axis.
    ///
    /// # Errors
    /// `InvalidAxis` for an unknown axis.
    pub fn set_locked(&mut self, axis: AxisRef, locked: bool) -> Result<()> {
        self.axis_mut(axis)?.set_locked(locked);
        Ok(())
    }

    /// Switches an axis between log and linear scale.
    ///
    /// Enabling log raises `lo` to the smallest positive visible value, or
    /// uses `(0.01, 0.1)` when nothing visible is positive.
    ///
    /// # Errors
    /// `InvalidAxis` for an unknown axis; projection errors while reading the
    /// visible slice.
    pub fn set_log(&mut self, axis: AxisRef, log: bool) -> Result<()> {
        self.axis_mut(axis)?.set_log(log);
        if log {
            self.enforce_log(axis)?;
        }
        Ok(())
    }

    fn enforce_log(&mut self, axis: AxisRef) -> Result<()> {
        let positive = self.positive_visible(axis)?;
        let target = self.axis_mut(axis)?;
        let (lo, hi) = log_safe_limits(target.lo(), target.hi(), positive);
        if (lo, hi) == LOG_FALLBACK && positive.is_none() {
            warn!("no positive values on {}; using {LOG_FALLBACK:?}", target.name());
        }
        target.expand_range(lo, hi);
        target.set_limits(lo, hi);
        Ok(())
    }

    fn positive_visible(&self, axis: AxisRef) -> Result<Option<(f64, f64)>> {
        Ok(match axis {
            AxisRef::Signal if self.is_1d() => {
                let (lo, hi) = self.x_axis().get_limits();
                positive_extent(self.curves.iter().flat_map(|c| {
                    c.x.iter()
                        .zip(&c.y)
                        .filter(move |&(&x, _)| x >= lo && x <= hi)
                        .map(|(_, &y)| y)
                }))
            }
            AxisRef::Signal => {
                let projection = self.visible_projection()?;
                positive_extent(self.window_values(&projection).iter().copied())
            }
            AxisRef::Dim(_) if self.is_1d() && axis == self.x => {
                positive_extent(self.curves.iter().flat_map(|c| c.x.iter().copied()))
            }
            AxisRef::Dim(_) => positive_extent(self.axis(axis)?.centers().iter().copied()),
        })
    }

    /// Turns intensity autoscaling on or off.
    pub fn set_autoscale(&mut self, autoscale: bool) {
        self.autoscale = autoscale;
    }

    /// Sum over z ranges instead of taking their first slice.
    pub fn set_summed(&mut self, summed: bool) {
        self.summed = summed;
    }

    /// Sets the colormap.
    pub fn set_colormap(&mut self, colormap: Colormap) {
        self.colormap = colormap;
    }

    /// Sets the interpolation.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Pins an aspect ratio; `Auto` unpins it.
    pub fn set_aspect(&mut self, aspect: Aspect) {
        self.aspect = aspect;
        self.aspect_pinned = aspect != Aspect::Auto;
    }

    /// Sets the angle between the x and y axes; 90 or `None` is orthogonal.
    ///
    /// # Errors
    /// `InvalidOption` on a line plot, with a log axis, or for angles outside `(0, 180)`.
    pub fn set_skew(&mut self, angle: Option<f64>) -> Result<()> {
        match angle {
            None => {
                self.skew = None;
                return Ok(());
            }
            Some(a) if self.is_1d() || !(a > 0.0 && a < 180.0) => {
                return Err(Error::option("skew", a));
            }
            Some(a) if self.x_axis().log() || self.y_axis().log() => {
                return Err(Error::option("skew", a));
            }
            Some(a) => {
                #[allow(clippy::float_cmp)]
                let orthogonal = a == 90.0;
                self.skew = if orthogonal { None } else { Some(a) };
            }
        }
        Ok(())
    }

    /// Chooses the z dimension stepped by the slideshow.
    ///
    /// # Errors
    /// `InvalidAxis` when `dim` is not a slice dimension.
    pub fn set_active_z(&mut self, dim: usize) -> Result<()> {
        if !self.z.contains(&dim) {
            return Err(Error::InvalidAxis(format!("dimension {dim} is not a z axis")));
        }
        self.active_z = Some(dim);
        Ok(())
    }

    /// Steps the active z axis by `steps` slices.
    ///
    /// Returns `Ok(false)` without changing anything when the step would
    /// leave the axis; the caller pauses the slideshow.
    ///
    /// # Errors
    /// `InvalidAxis` when the plot has no z axis.
    pub fn step_z(&mut self, steps: isize) -> Result<bool> {
        let dim = self
            .active_z
            .ok_or_else(|| Error::InvalidAxis("plot has no z axis".to_string()))?;
        self.step_axis(dim, steps)
    }

    /// Steps z dimension `dim` by `steps` slices, moving `hi` through the
    /// lock-aware path.
    ///
    /// # Errors
    /// `InvalidAxis` when `dim` is not a z dimension.
    pub fn step_axis(&mut self, dim: usize, steps: isize) -> Result<bool> {
        if !self.z.contains(&dim) {
            return Err(Error::InvalidAxis(format!("dimension {dim} is not a z axis")));
        }
        let axis = self.axis_mut(AxisRef::Dim(dim))?;
        #[allow(clippy::cast_possible_wrap)]
        let target = axis.index_from_value(axis.hi()) as isize + steps;
        #[allow(clippy::cast_possible_wrap)]
        let len = axis.len() as isize;
        if target < 0 || target >= len {
            return Ok(false);
        }
        #[allow(clippy::cast_sign_loss)]
        let hi = axis.value_from_index(target as usize);
        if axis.locked() && hi - axis.diff() < axis.min() {
            return Ok(false);
        }
        axis.set_hi(hi);
        debug!("z axis {dim} stepped to {hi}");
        Ok(true)
    }

    /// Records a right-button zoom box without changing the display.
    pub fn stage_zoom(&mut self, rect: ZoomRect) {
        self.zoom = Some(rect);
    }

    /// Applies a left-button zoom box to the x and y limits.
    ///
    /// # Errors
    /// `InvalidAxis` when the box was drawn for other axes than the current
    /// ones; `InvalidLimits` for non-finite limits.
    pub fn commit_zoom(&mut self, rect: ZoomRect) -> Result<()> {
        if rect.x.axis != self.x || rect.y.axis != self.y {
            return Err(Error::InvalidAxis(
                "zoom box does not match the displayed axes".to_string(),
            ));
        }
        check_finite(rect.x.lo, rect.x.hi)?;
        check_finite(rect.y.lo, rect.y.hi)?;
        self.set_limits(self.x, rect.x.lo, rect.x.hi)?;
        self.set_limits(self.y, rect.y.lo, rect.y.hi)?;
        self.zoom = Some(rect);
        Ok(())
    }

    /// Sets the x and y limits together (Home, back, forward).
    ///
    /// # Errors
    /// `InvalidLimits` for non-finite limits.
    pub fn apply_view_limits(&mut self, limits: ViewLimits) -> Result<()> {
        check_finite(limits.x.0, limits.x.1)?;
        check_finite(limits.y.0, limits.y.1)?;
        self.set_limits(self.x, limits.x.0, limits.x.1)?;
        self.set_limits(self.y, limits.y.0, limits.y.1)
    }

    /// Maps signal dimension `dim` to a display axis.
    ///
    /// Choosing the dimension shown on the other display axis swaps x and y
    /// and keeps both windows. Choosing a z dimension resets its window to the
    /// full range and demotes the replaced axis to a locked slice at index 0.
    ///
    /// # Errors
    /// `InvalidAxis` on line plots, RGB images and for dimensions that are not plotted.
    pub fn change_axis(&mut self, which: DisplayAxis, dim: usize) -> Result<()> {
        if self.is_1d() || self.is_rgb() {
            return Err(Error::InvalidAxis(
                "axes can only be changed on 2-D plots".to_string(),
            ));
        }
        if !self.axes.contains_key(&dim) {
            return Err(Error::InvalidAxis(format!("dimension {dim} is not plotted")));
        }
        let (current, other) = match which {
            DisplayAxis::X => (self.x, self.y),
            DisplayAxis::Y => (self.y, self.x),
        };
        let incoming = AxisRef::Dim(dim);
        if current == incoming {
            return Ok(());
        }
        if other == incoming {
            std::mem::swap(&mut self.x, &mut self.y);
            self.reset = ViewLimits {
                x: self.reset.y,
                y: self.reset.x,
            };
        } else {
            let old = current
                .dim()
                .ok_or_else(|| Error::InvalidAxis("display axis is not a dimension".to_string()))?;
            let range = {
                let axis = self.axis_mut(incoming)?;
                axis.set_locked(false);
                axis.reset_limits();
                axis.range()
            };
            let demoted = self.axis_mut(current)?;
            demoted.set_locked(false);
            let first = demoted.value_from_index(0);
            demoted.set_limits(first, first);
            demoted.set_locked(true);

            self.z.retain(|&d| d != dim);
            self.z.push(old);
            self.z.sort_unstable();
            if self.active_z == Some(dim) {
                self.active_z = Some(old);
            }
            match which {
                DisplayAxis::X => {
                    self.x = incoming;
                    self.reset.x = range;
                }
                DisplayAxis::Y => {
                    self.y = incoming;
                    self.reset.y = range;
                }
            }
        }
        self.zoom = None;
        debug!("axes changed: x={:?} y={:?} z={:?}", self.x, self.y, self.z);
        Ok(())
    }

    /// Replaces the data with a new version of the same shape, keeping limits.
    ///
    /// # Errors
    /// Validation errors of the new data, or `InvalidShape` when its shape differs.
    pub fn replace_data(&mut self, data: Arc<NxData>) -> Result<()> {
        data.validate()?;
        if data.shape() != self.data.shape() {
            return Err(Error::InvalidShape(format!(
                "new data has shape {:?}, expected {:?}",
                data.shape(),
                self.data.shape()
            )));
        }
        let mut candidate = self.clone();
        candidate.data = data;
        if candidate.is_1d() {
            let fmt = candidate.curves.last().map_or(LineFormat::POINTS, |c| c.fmt);
            let curve = candidate.curve(fmt)?;
            match candidate.curves.last_mut() {
                Some(last) => *last = curve,
                None => candidate.curves.push(curve),
            }
        }
        *self = candidate;
        Ok(())
    }

    /// One axis per dimension of the full signal.
    pub fn full_axes(&self) -> Vec<PlotAxis> {
        (0..self.data.shape().len())
            .map(|dim| {
                self.axes
                    .get(&dim)
                    .cloned()
                    .unwrap_or_else(|| make_axis(&self.data, dim))
            })
            .collect()
    }

    /// Projection of the signal onto the displayed axes of a 2-D plot.
    ///
    /// The displayed dimensions keep their full range (rows are y, columns
    /// x, then the colour channel); z dimensions are reduced over their
    /// current window.
    ///
    /// # Errors
    /// `InvalidAxis` on line plots; projection errors.
    pub fn visible_projection(&self) -> Result<Projection> {
        let (AxisRef::Dim(x), AxisRef::Dim(y)) = (self.x, self.y) else {
            return Err(Error::InvalidAxis(
                "line plots have no image projection".to_string(),
            ));
        };
        let shape = self.data.shape();
        let squeezed = self.data.squeezed_dims();
        let position = |dim: usize| squeezed.iter().position(|&d| d == dim);
        let mut keep: Vec<usize> = [y, x].into_iter().filter_map(position).collect();
        if let Some(c) = self.color_dim.and_then(position) {
            keep.push(c);
        }
        let limits: Vec<(usize, usize)> = squeezed
            .iter()
            .map(|&dim| {
                if dim == x || dim == y || Some(dim) == self.color_dim {
                    (0, shape[dim])
                } else {
                    self.axes
                        .get(&dim)
                        .map_or((0, 1), PlotAxis::current_index_range)
                }
            })
            .collect();
        let signal = self.data.signal()?;
        ProjectionRequest::squeezed(shape, &keep, &limits)
            .summed(self.summed)
            .project(&signal.values, self.data.errors.as_ref(), &self.full_axes())
    }

    /// Part of a 2-D projection inside the current x and y windows.
    pub fn window_values(&self, projection: &Projection) -> ArrayD<f64> {
        let mut view = projection.values.view();
        if view.ndim() >= 2 {
            for (index, axis) in [(0, self.y_axis()), (1, self.x_axis())] {
                let (start, stop) = axis.current_index_range();
                let stop = stop.min(view.len_of(Axis(index)));
                let start = start.min(stop);
                #[allow(clippy::cast_possible_wrap)]
                view.slice_axis_inplace(Axis(index), Slice::from(start as isize..stop as isize));
            }
        }
        view.to_owned()
    }

    /// Re-derives what is rendered.
    ///
    /// Returns the image projection of a 2-D plot (`None` for line plots).
    /// With autoscale on, the intensity limits are recomputed from the
    /// finite values of the visible window, falling back to `(0.0, 0.1)`.
    ///
    /// # Errors
    /// Projection errors.
    pub fn refresh(&mut self) -> Result<Option<Projection>> {
        if self.is_1d() {
            return Ok(None);
        }
        let projection = self.visible_projection()?;
        if self.autoscale && !self.is_rgb() {
            let window = self.window_values(&projection);
            let values: Vec<f64> = window.iter().copied().collect();
            let (lo, hi) = finite_min_max(&values).unwrap_or(EMPTY_RANGE);
            self.signal.set_range(lo, hi);
            self.signal.reset_limits();
            if self.signal.log() {
                self.enforce_log(AxisRef::Signal)?;
            }
        }
        Ok(Some(projection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};
    use nxplot_core::NxField;

    fn ramp(shape: &[usize]) -> Arc<NxData> {
        let n: usize = shape.iter().product();
        #[allow(clippy::cast_precision_loss)]
        let values = Array::from_shape_vec(IxDyn(shape), (0..n).map(|i| i as f64).collect())
            .unwrap();
        NxData::new(NxField::new("counts", values)).shared()
    }

    fn plot(data: Arc<NxData>) -> ViewState {
        ViewState::plot(data, &PlotOptions::default(), &PlotConfig::default(), None).unwrap()
    }

    #[test]
    fn test_no_signal() {
        let err = ViewState::plot(
            NxData::default().shared(),
            &PlotOptions::default(),
            &PlotConfig::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, Error::NoSignal);
    }

    #[test]
    fn test_one_d_plot() {
        let state = plot(ramp(&[5]));
        assert!(state.is_1d());
        assert_eq!(state.x(), AxisRef::Dim(0));
        assert_eq!(state.curves().len(), 1);
        assert_eq!(state.signal_axis().range(), (0.0, 4.0));
        assert_eq!(state.reset_limits().x, (-0.5, 4.5));
    }

    #[test]
    fn test_log_clamp_uses_visible_points() {
        let values = vec![0.2, -1.0, 0.0, 3.0, 4.0, 8.0];
        let data = NxData::new(NxField::from_vec("y", values)).shared();
        let mut state = plot(data);
        state.set_limits(AxisRef::Dim(0), 2.5, 5.5).unwrap();
        state.set_log(AxisRef::Signal, true).unwrap();
        let signal = state.signal_axis();
        assert_relative_eq!(signal.lo(), 3.0);
        assert!(signal.hi() >= 8.0);
    }

    #[test]
    fn test_two_d_defaults() {
        let state = plot(ramp(&[3, 4, 5]));
        assert_eq!(state.x(), AxisRef::Dim(2));
        assert_eq!(state.y(), AxisRef::Dim(1));
        assert_eq!(state.z_dims(), &[0]);
        let z = state.axis(AxisRef::Dim(0)).unwrap();
        assert!(z.locked());
        assert_eq!(z.get_limits(), (0.0, 0.0));
        // first slice holds 0..20
        assert_eq!(state.signal_axis().range(), (0.0, 19.0));
    }

    #[test]
    fn test_size_one_dims_are_skipped() {
        let state = plot(ramp(&[1, 4, 5]));
        assert_eq!(state.x(), AxisRef::Dim(2));
        assert_eq!(state.y(), AxisRef::Dim(1));
        assert!(state.z_dims().is_empty());
        let projection = state.visible_projection().unwrap();
        assert_eq!(projection.shape(), &[4, 5]);
    }

    #[test]
    fn test_overrides_and_log() {
        let options = PlotOptions {
            log: true,
            ..PlotOptions::default().with_vlim(-5.0, 10.0)
        };
        let state =
            ViewState::plot(ramp(&[4, 5]), &options, &PlotConfig::default(), None).unwrap();
        let (lo, hi) = state.signal_axis().get_limits();
        assert_relative_eq!(lo, 1.0);
        assert_relative_eq!(hi, 10.0);
    }

    #[test]
    fn test_step_z_pauses_at_end() {
        let mut state = plot(ramp(&[3, 4, 5]));
        assert!(state.step_z(1).unwrap());
        assert!(state.step_z(1).unwrap());
        assert!(!state.step_z(1).unwrap());
        assert_eq!(state.axis(AxisRef::Dim(0)).unwrap().get_limits(), (2.0, 2.0));
        assert!(!plot(ramp(&[3, 4, 5])).step_z(-1).unwrap());
    }

    #[test]
    fn test_autoscale_follows_slice() {
        let mut state = plot(ramp(&[3, 4, 5]));
        state.set_autoscale(true);
        state.step_z(2).unwrap();
        state.refresh().unwrap();
        assert_eq!(state.signal_axis().get_limits(), (40.0, 59.0));
    }

    #[test]
    fn test_skew_validation() {
        let mut state = plot(ramp(&[4, 5]));
        assert!(state.set_skew(Some(200.0)).is_err());
        state.set_skew(Some(90.0)).unwrap();
        assert_eq!(state.skew(), None);
        state.set_skew(Some(60.0)).unwrap();
        assert_eq!(state.skew(), Some(60.0));
        assert!(plot(ramp(&[5])).set_skew(Some(60.0)).is_err());
    }

    #[test]
    fn test_rgb_requires_channels() {
        let options = PlotOptions {
            image: true,
            ..PlotOptions::default()
        };
        let state =
            ViewState::plot(ramp(&[4, 5, 3]), &options, &PlotConfig::default(), None).unwrap();
        assert!(state.is_rgb());
        assert_eq!(state.aspect(), Aspect::Equal);
        assert_eq!(state.visible_projection().unwrap().shape(), &[4, 5, 3]);

        let err = ViewState::plot(ramp(&[4, 5]), &options, &PlotConfig::default(), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }
}

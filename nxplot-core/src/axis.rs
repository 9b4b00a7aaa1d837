//! Plot axis model: coordinate values plus display limits.
//!
//! A [`PlotAxis`] describes one logical axis of a plot. Dimension axes carry
//! the coordinate array of one signal dimension (either N bin centres or N+1
//! bin boundaries); the synthetic signal axis (`dim == None`) only carries the
//! intensity range.
//!
//! # Locking
//!
//! Locking is deliberately asymmetric. A locked axis keeps its window width
//! `diff` fixed when the *upper* limit moves ([`PlotAxis::set_hi`] recomputes
//! `lo = hi - diff`), while moving the lower limit ([`PlotAxis::set_lo`]) never
//! moves `hi`. Slice stepping through a z axis depends on this.

use ndarray::ArrayViewD;

use crate::data::{make_label, NxField};
use crate::limits::{finite_min_max, finite_range_or_default, nonsingular, EMPTY_RANGE};

/// One plot axis and its current display window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlotAxis {
    name: String,
    long_name: Option<String>,
    units: Option<String>,
    data: Vec<f64>,
    dim: Option<usize>,
    centers: Vec<f64>,
    boundaries: Vec<f64>,
    min: f64,
    max: f64,
    lo: f64,
    hi: f64,
    diff: f64,
    locked: bool,
    reversed: bool,
    equally_spaced: bool,
    log: bool,
}

/// Bin centres for a dimension of length `dimlen`.
///
/// `data` may already hold `dimlen` centres or `dimlen + 1` boundaries.
#[must_use]
pub fn centers(data: &[f64], dimlen: usize) -> Vec<f64> {
    if data.len() == dimlen + 1 {
        data.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    } else {
        data.to_vec()
    }
}

/// Bin boundaries for a dimension of length `dimlen`.
///
/// Centres are converted by taking midpoints and extrapolating the outer edges
/// by half of the first and last spacing. A single centre `c` gets `[c - 0.5, c + 0.5]`.
#[must_use]
pub fn boundaries(data: &[f64], dimlen: usize) -> Vec<f64> {
    if data.len() == dimlen + 1 {
        return data.to_vec();
    }
    match data.len() {
        0 => Vec::new(),
        1 => vec![data[0] - 0.5, data[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(data[0] - 0.5 * (data[1] - data[0]));
            edges.extend(data.windows(2).map(|w| 0.5 * (w[0] + w[1])));
            edges.push(data[n - 1] + 0.5 * (data[n - 1] - data[n - 2]));
            edges
        }
    }
}

fn is_equally_spaced(data: &[f64]) -> bool {
    if data.len() < 3 {
        return true;
    }
    let spacing: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let (Some((smin, smax)), Some((dmin, dmax))) =
        (finite_min_max(&spacing), finite_min_max(data))
    else {
        return true;
    };
    smax - smin <= (dmax - dmin) / 1000.0
}

impl PlotAxis {
    /// Creates a dimension axis from coordinate values.
    ///
    /// # Arguments
    /// * `name` - Axis name
    /// * `data` - Centres (`dimlen` values) or boundaries (`dimlen + 1` values)
    /// * `dim` - Index of the signal dimension this axis describes
    /// * `dimlen` - Length of that dimension
    pub fn new(name: impl Into<String>, data: Vec<f64>, dim: usize, dimlen: usize) -> Self {
        let reversed = data.len() > 1 && data[0] > data[data.len() - 1];
        let equally_spaced = is_equally_spaced(&data);
        let centers = centers(&data, dimlen);
        let boundaries = boundaries(&data, dimlen);
        let (min, max) = finite_min_max(&boundaries).unwrap_or(EMPTY_RANGE);
        let (min, max) = nonsingular(min, max);
        Self {
            name: name.into(),
            long_name: None,
            units: None,
            data,
            dim: Some(dim),
            centers,
            boundaries,
            min,
            max,
            lo: min,
            hi: max,
            diff: max - min,
            locked: false,
            reversed,
            equally_spaced,
            log: false,
        }
    }

    /// Creates a dimension axis from a NeXus field, keeping its label attributes.
    pub fn from_field(field: &NxField, dim: usize, dimlen: usize) -> Self {
        let mut axis = Self::new(field.name.clone(), field.to_vec(), dim, dimlen);
        axis.long_name.clone_from(&field.long_name);
        axis.units.clone_from(&field.units);
        axis
    }

    /// Creates an integer index axis `0..dimlen` for a dimension without coordinates.
    #[allow(clippy::cast_precision_loss)]
    pub fn index(dim: usize, dimlen: usize) -> Self {
        let data = (0..dimlen).map(|i| i as f64).collect();
        Self::new(format!("Axis{dim}"), data, dim, dimlen)
    }

    /// Creates the synthetic intensity axis from signal values.
    pub fn signal(name: impl Into<String>, values: &ArrayViewD<'_, f64>) -> Self {
        let (min, max) = finite_range_or_default(values);
        let (min, max) = nonsingular(min, max);
        Self {
            name: name.into(),
            long_name: None,
            units: None,
            data: Vec::new(),
            dim: None,
            centers: Vec::new(),
            boundaries: Vec::new(),
            min,
            max,
            lo: min,
            hi: max,
            diff: max - min,
            locked: false,
            reversed: false,
            equally_spaced: true,
            log: false,
        }
    }

    /// Sets the label attributes.
    #[must_use]
    pub fn with_labels(mut self, long_name: Option<String>, units: Option<String>) -> Self {
        self.long_name = long_name;
        self.units = units;
        self
    }

    /// Axis name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label: `long_name`, else `name (units)`, else `name`.
    pub fn label(&self) -> String {
        make_label(&self.name, self.long_name.as_deref(), self.units.as_deref())
    }

    /// `long_name` attribute.
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// `units` attribute.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Raw coordinate values as supplied.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Signal dimension, or `None` for the signal axis.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    /// Reassigns the signal dimension (used when re-indexing projected axes).
    pub fn set_dim(&mut self, dim: usize) {
        self.dim = Some(dim);
    }

    /// Bin centres.
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Bin boundaries.
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.centers.len()
    }

    /// Whether the axis has no bins (true for the signal axis).
    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Data-derived minimum.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Data-derived maximum.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Data-derived range.
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Lower display limit.
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Upper display limit.
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Locked window width.
    pub fn diff(&self) -> f64 {
        self.diff
    }

    /// Whether the window width is locked.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Whether the coordinates decrease.
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    /// Whether bins are uniform to within 0.1% of the range.
    pub fn equally_spaced(&self) -> bool {
        self.equally_spaced
    }

    /// Whether the axis is displayed on a log scale.
    pub fn log(&self) -> bool {
        self.log
    }

    /// Sets the log flag. Limit clamping for log scales is done by the view.
    pub fn set_log(&mut self, log: bool) {
        self.log = log;
    }

    /// Sets both limits, swapping them if given in reverse order.
    ///
    /// Equal limits are accepted as a single-value window.
    pub fn set_limits(&mut self, lo: f64, hi: f64) {
        let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
        self.lo = lo;
        self.hi = hi;
        self.diff = hi - lo;
    }

    /// Current limits `(lo, hi)`.
    pub fn get_limits(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Moves the upper limit.
    ///
    /// On a locked axis the lower limit follows so that `hi - lo == diff`.
    pub fn set_hi(&mut self, hi: f64) {
        self.hi = hi;
        if self.locked {
            self.lo = hi - self.diff;
        } else {
            if self.lo > hi {
                self.lo = hi;
            }
            self.diff = self.hi - self.lo;
        }
    }

    /// Moves the lower limit. Never moves `hi`, even when locked.
    pub fn set_lo(&mut self, lo: f64) {
        self.lo = lo.min(self.hi);
        self.diff = self.hi - self.lo;
    }

    /// Locks or unlocks the window width at its current value.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            self.diff = self.hi - self.lo;
        }
    }

    /// Restores `min <= lo <= hi <= max`.
    pub fn clamp_limits(&mut self) {
        let lo = self.lo.clamp(self.min, self.max);
        let hi = self.hi.clamp(self.min, self.max);
        self.set_limits(lo, hi);
    }

    /// Resets the window to the full data range.
    pub fn reset_limits(&mut self) {
        self.set_limits(self.min, self.max);
    }

    /// Grows the data range so it includes `lo..=hi`. Never shrinks it.
    pub fn expand_range(&mut self, lo: f64, hi: f64) {
        self.min = self.min.min(lo.min(hi));
        self.max = self.max.max(lo.max(hi));
    }

    /// Replaces the data range (used by the signal axis when the data changes).
    pub fn set_range(&mut self, min: f64, max: f64) {
        let (min, max) = nonsingular(min, max);
        self.min = min;
        self.max = max;
    }

    /// Index of the centre nearest to `value`.
    pub fn index_from_value(&self, value: f64) -> usize {
        self.centers
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_finite())
            .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
            .map_or(0, |(i, _)| i)
    }

    /// Centre value at `idx`, clamped to the last centre.
    pub fn value_from_index(&self, idx: usize) -> f64 {
        match self.centers.len() {
            0 => self.min,
            n => self.centers[idx.min(n - 1)],
        }
    }

    /// Lower boundary of bin `idx`, clamped at the edges.
    pub fn min_boundary_value(&self, idx: usize) -> f64 {
        match self.boundaries.len() {
            0 | 1 => self.min,
            n => self.boundaries[idx.min(n - 2)],
        }
    }

    /// Upper boundary of bin `idx`, clamped at the edges.
    pub fn max_boundary_value(&self, idx: usize) -> f64 {
        match self.boundaries.len() {
            0 | 1 => self.max,
            n => self.boundaries[(idx + 1).min(n - 1)],
        }
    }

    /// Half-open index range of the bins overlapping `lo..=hi`.
    ///
    /// A single-value window selects the bin nearest to it. A window that
    /// misses every bin selects the bin nearest to `lo`.
    pub fn index_range(&self, lo: f64, hi: f64) -> (usize, usize) {
        let n = self.len();
        if n == 0 {
            return (0, 0);
        }
        let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
        if lo == hi {
            let idx = self.index_from_value(lo);
            return (idx, idx + 1);
        }
        let mut start = None;
        let mut stop = 0;
        for i in 0..n {
            let (a, b) = (self.boundaries[i], self.boundaries[i + 1]);
            let (bmin, bmax) = if a <= b { (a, b) } else { (b, a) };
            if bmax > lo && bmin < hi {
                start.get_or_insert(i);
                stop = i + 1;
            }
        }
        match start {
            Some(start) => (start, stop),
            None => {
                let idx = self.index_from_value(lo);
                (idx, idx + 1)
            }
        }
    }

    /// Half-open index range covered by the current window.
    pub fn current_index_range(&self) -> (usize, usize) {
        self.index_range(self.lo, self.hi)
    }

    /// Copy of this axis restricted to bins `start..stop`.
    ///
    /// Labels and lock state are kept; the data range is recomputed from the
    /// retained boundaries and the window is clamped into it.
    #[must_use]
    pub fn sliced(&self, start: usize, stop: usize) -> Self {
        let stop = stop.min(self.len());
        let start = start.min(stop);
        let data = if self.data.len() == self.centers.len() + 1 {
            self.data[start..=stop].to_vec()
        } else {
            self.data[start..stop].to_vec()
        };
        let mut axis = Self::new(self.name.clone(), data, self.dim.unwrap_or(0), stop - start);
        axis.dim = self.dim;
        axis.long_name.clone_from(&self.long_name);
        axis.units.clone_from(&self.units);
        axis.log = self.log;
        axis.set_limits(self.lo, self.hi);
        axis.clamp_limits();
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn ten() -> PlotAxis {
        PlotAxis::index(0, 10)
    }

    #[test]
    fn test_centers_and_boundaries() {
        assert_eq!(centers(&[0.0, 1.0, 2.0], 2), vec![0.5, 1.5]);
        assert_eq!(centers(&[0.0, 1.0, 2.0], 3), vec![0.0, 1.0, 2.0]);
        assert_eq!(boundaries(&[0.0, 1.0, 2.0], 3), vec![-0.5, 0.5, 1.5, 2.5]);
        assert_eq!(boundaries(&[0.0, 1.0, 2.0], 2), vec![0.0, 1.0, 2.0]);
        assert_eq!(boundaries(&[4.0], 1), vec![3.5, 4.5]);
    }

    #[test]
    fn test_new_axis_range() {
        let axis = ten();
        assert_relative_eq!(axis.min(), -0.5);
        assert_relative_eq!(axis.max(), 9.5);
        assert_eq!(axis.get_limits(), (axis.min(), axis.max()));
        assert!(axis.equally_spaced());
        assert!(!axis.reversed());
        assert_eq!(axis.label(), "Axis0");
    }

    #[test]
    fn test_descending_and_uneven() {
        let mut axis = PlotAxis::new("t", vec![5.0, 4.0, 2.0, 1.0], 0, 4);
        assert!(axis.reversed());
        assert!(!axis.equally_spaced());
        assert!(axis.min() < axis.max());
        assert_eq!(axis.index_from_value(4.1), 1);
        assert_relative_eq!(axis.value_from_index(3), 1.0);
        axis.set_limits(4.5, 1.5);
        assert_eq!(axis.get_limits(), (1.5, 4.5));
    }

    #[test]
    fn test_set_limits_orders_endpoints() {
        let mut axis = ten();
        axis.set_limits(7.0, 3.0);
        assert_eq!(axis.get_limits(), (3.0, 7.0));
        assert_relative_eq!(axis.diff(), 4.0);
        axis.set_limits(4.0, 4.0);
        assert_eq!(axis.get_limits(), (4.0, 4.0));
    }

    #[test]
    fn test_lock_moves_lo_with_hi() {
        let mut axis = ten();
        axis.set_limits(2.0, 5.0);
        axis.set_locked(true);
        axis.set_hi(8.0);
        assert_relative_eq!(axis.lo(), 5.0);
        assert_relative_eq!(axis.hi(), 8.0);
        assert_relative_eq!(axis.hi() - axis.lo(), axis.diff());
    }

    #[test]
    fn test_lock_is_asymmetric() {
        let mut axis = ten();
        axis.set_limits(2.0, 5.0);
        axis.set_locked(true);
        axis.set_lo(3.0);
        assert_relative_eq!(axis.hi(), 5.0);
        assert_relative_eq!(axis.diff(), 2.0);
    }

    #[test]
    fn test_index_value_mapping() {
        let axis = PlotAxis::new("x", vec![0.0, 0.5, 1.0, 1.5], 0, 4);
        assert_eq!(axis.index_from_value(0.74), 1);
        assert_eq!(axis.index_from_value(100.0), 3);
        assert_relative_eq!(axis.value_from_index(2), 1.0);
        assert_relative_eq!(axis.value_from_index(99), 1.5);
    }

    #[test]
    fn test_boundary_values_clamp() {
        let axis = PlotAxis::new("x", vec![0.0, 1.0, 2.0, 3.0], 0, 3);
        assert_relative_eq!(axis.min_boundary_value(0), 0.0);
        assert_relative_eq!(axis.max_boundary_value(0), 1.0);
        assert_relative_eq!(axis.min_boundary_value(10), 2.0);
        assert_relative_eq!(axis.max_boundary_value(10), 3.0);
    }

    #[test]
    fn test_index_range() {
        let axis = ten();
        assert_eq!(axis.index_range(2.0, 5.0), (2, 6));
        assert_eq!(axis.index_range(2.6, 4.4), (3, 5));
        assert_eq!(axis.index_range(3.2, 3.2), (3, 4));
        assert_eq!(axis.index_range(-0.5, 9.5), (0, 10));
    }

    #[test]
    fn test_signal_axis() {
        let values = arr2(&[[1.0, f64::INFINITY], [3.0, 2.0]]).into_dyn();
        let axis = PlotAxis::signal("counts", &values.view());
        assert_eq!(axis.dim(), None);
        assert_eq!(axis.range(), (1.0, 3.0));
        assert!(axis.is_empty());

        let flat = arr1(&[5.0, 5.0]).into_dyn();
        let axis = PlotAxis::signal("flat", &flat.view());
        assert!(axis.min() < axis.max());
    }

    #[test]
    fn test_clamp_and_expand() {
        let mut axis = ten();
        axis.set_limits(-4.0, 20.0);
        axis.clamp_limits();
        assert_eq!(axis.get_limits(), axis.range());
        axis.expand_range(-10.0, 3.0);
        assert_relative_eq!(axis.min(), -10.0);
        assert_relative_eq!(axis.max(), 9.5);
    }

    #[test]
    fn test_sliced_axis() {
        let axis = PlotAxis::new("x", vec![0.0, 1.0, 2.0, 3.0, 4.0], 2, 4);
        let sliced = axis.sliced(1, 3);
        assert_eq!(sliced.boundaries(), &[1.0, 2.0, 3.0]);
        assert_eq!(sliced.centers(), &[1.5, 2.5]);
        assert_eq!(sliced.dim(), Some(2));
        assert_eq!(sliced.get_limits(), (1.0, 3.0));
    }
}

//! Limit arithmetic shared by axes, autoscaling and overlays.
//!
//! Everything here absorbs numeric degeneracy (empty data, single-valued
//! ranges, infinities) with fallbacks instead of failing.

use ndarray::ArrayViewD;
use rayon::prelude::*;

/// Expansion applied by [`nonsingular`] to degenerate ranges.
pub const EXPANDER: f64 = 0.05;

/// Relative width below which [`nonsingular`] treats a range as degenerate.
pub const TINY: f64 = 1e-15;

/// Fallback range for data with no finite values.
pub const EMPTY_RANGE: (f64, f64) = (0.0, 0.1);

/// Fallback range for log scaling when no positive values are visible.
pub const LOG_FALLBACK: (f64, f64) = (0.01, 0.1);

/// Slices at least this long are reduced in parallel.
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Expand a degenerate range so that downstream normalisation never divides by zero.
///
/// Follows the matplotlib convention: non-finite input becomes
/// `(-EXPANDER, EXPANDER)`, reversed input is swapped, and a range narrower than
/// `TINY` relative to its magnitude is widened by `EXPANDER` of each endpoint.
#[must_use]
pub fn nonsingular(vmin: f64, vmax: f64) -> (f64, f64) {
    if !vmin.is_finite() || !vmax.is_finite() {
        return (-EXPANDER, EXPANDER);
    }
    let (mut vmin, mut vmax) = if vmax < vmin {
        (vmax, vmin)
    } else {
        (vmin, vmax)
    };

    let maxabs = vmin.abs().max(vmax.abs());
    if maxabs < (1e6 / TINY) * f64::MIN_POSITIVE {
        vmin = -EXPANDER;
        vmax = EXPANDER;
    } else if vmax - vmin <= maxabs * TINY {
        if vmax == 0.0 && vmin == 0.0 {
            vmin = -EXPANDER;
            vmax = EXPANDER;
        } else {
            vmin -= EXPANDER * vmin.abs();
            vmax += EXPANDER * vmax.abs();
        }
    }
    (vmin, vmax)
}

fn fold_finite(acc: Option<(f64, f64)>, value: f64) -> Option<(f64, f64)> {
    if !value.is_finite() {
        return acc;
    }
    Some(match acc {
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
        None => (value, value),
    })
}

fn merge(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((alo, ahi)), Some((blo, bhi))) => Some((alo.min(blo), ahi.max(bhi))),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Minimum and maximum of the finite values in a slice, ignoring NaN and ±inf.
#[must_use]
pub fn finite_min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() >= PARALLEL_THRESHOLD {
        values
            .par_iter()
            .fold(|| None, |acc, &v| fold_finite(acc, v))
            .reduce(|| None, merge)
    } else {
        values.iter().copied().fold(None, fold_finite)
    }
}

/// Minimum and maximum of the finite values in an array view.
#[must_use]
pub fn finite_min_max_view(view: &ArrayViewD<'_, f64>) -> Option<(f64, f64)> {
    match view.as_slice_memory_order() {
        Some(slice) => finite_min_max(slice),
        None => view.iter().copied().fold(None, fold_finite),
    }
}

/// Finite range of an array view, or [`EMPTY_RANGE`] when it has no finite values.
#[must_use]
pub fn finite_range_or_default(view: &ArrayViewD<'_, f64>) -> (f64, f64) {
    finite_min_max_view(view).unwrap_or(EMPTY_RANGE)
}

/// Smallest and largest strictly positive finite values of a view.
#[must_use]
pub fn positive_min_max(view: &ArrayViewD<'_, f64>) -> Option<(f64, f64)> {
    view.iter()
        .copied()
        .filter(|v| *v > 0.0)
        .fold(None, fold_finite)
}

/// Clamp a window so that it is usable on a log scale.
///
/// `lo` is raised to the smallest positive visible value; if nothing visible
/// is positive the window becomes [`LOG_FALLBACK`].
#[must_use]
pub fn log_safe_limits(lo: f64, hi: f64, positive: Option<(f64, f64)>) -> (f64, f64) {
    let Some((pmin, pmax)) = positive else {
        return LOG_FALLBACK;
    };
    let lo = if lo > 0.0 { lo } else { pmin };
    let hi = if hi > lo { hi } else { pmax.max(lo) };
    if hi > lo {
        (lo, hi)
    } else {
        nonsingular(lo, hi)
    }
}

/// Grow an existing window to cover new data without ever shrinking it.
///
/// A side is moved only when the new data reaches or passes it; that side is
/// then placed `padding` of the new span beyond the data so markers do not sit
/// on the plot edge.
#[must_use]
pub fn expand_window(current: (f64, f64), data: (f64, f64), padding: f64) -> (f64, f64) {
    let (lo, hi) = current;
    let (dmin, dmax) = data;
    let pad = (dmax - dmin).abs() * padding.max(0.0);
    let lo = if dmin <= lo { dmin - pad } else { lo };
    let hi = if dmax >= hi { dmax + pad } else { hi };
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, ArrayD, IxDyn};

    #[test]
    fn test_nonsingular_single_value() {
        let (lo, hi) = nonsingular(5.0, 5.0);
        assert!(lo < hi);
        assert_relative_eq!(lo, 4.75);
        assert_relative_eq!(hi, 5.25);
    }

    #[test]
    fn test_nonsingular_zero_and_non_finite() {
        assert_eq!(nonsingular(0.0, 0.0), (-EXPANDER, EXPANDER));
        assert_eq!(nonsingular(f64::NAN, 1.0), (-EXPANDER, EXPANDER));
        assert_eq!(nonsingular(3.0, 1.0), (1.0, 3.0));
    }

    #[test]
    fn test_finite_min_max_skips_inf_and_nan() {
        let values = [f64::NEG_INFINITY, 2.0, f64::NAN, -1.0, f64::INFINITY];
        assert_eq!(finite_min_max(&values), Some((-1.0, 2.0)));
        assert_eq!(finite_min_max(&[f64::INFINITY]), None);
    }

    #[test]
    fn test_finite_min_max_parallel_path() {
        #[allow(clippy::cast_precision_loss)]
        let values: Vec<f64> = (0..PARALLEL_THRESHOLD + 10).map(|i| i as f64).collect();
        let (lo, hi) = finite_min_max(&values).unwrap();
        assert_relative_eq!(lo, 0.0);
        #[allow(clippy::cast_precision_loss)]
        let expected = (PARALLEL_THRESHOLD + 9) as f64;
        assert_relative_eq!(hi, expected);
    }

    #[test]
    fn test_empty_fallback() {
        let empty = ArrayD::<f64>::zeros(IxDyn(&[0]));
        assert_eq!(finite_range_or_default(&empty.view()), EMPTY_RANGE);
    }

    #[test]
    fn test_log_safe_limits() {
        let data = arr1(&[-2.0, 0.0, 0.5, 3.0]).into_dyn();
        let positive = positive_min_max(&data.view());
        assert_eq!(log_safe_limits(-2.0, 3.0, positive), (0.5, 3.0));
        assert_eq!(log_safe_limits(-2.0, -1.0, positive), (0.5, 3.0));
        assert_eq!(log_safe_limits(-2.0, 3.0, None), LOG_FALLBACK);
    }

    #[test]
    fn test_expand_window_is_monotone() {
        let current = (0.0, 10.0);
        let (lo, hi) = expand_window(current, (2.0, 12.0), 0.05);
        assert_relative_eq!(lo, 0.0);
        assert_relative_eq!(hi, 12.5);

        let (lo, hi) = expand_window(current, (0.0, 4.0), 0.05);
        assert_relative_eq!(lo, -0.2);
        assert_relative_eq!(hi, 10.0);
    }
}

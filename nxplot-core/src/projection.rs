//! Reduction of N-D signals to the 1-D or 2-D arrays that get rendered.
//!
//! A projection keeps an ordered list of dimensions and collapses every other
//! dimension, either by taking a single index or by summing over its index
//! range. Signals often carry length-1 dimensions (a single detector frame
//! stored as `(1, ny, nx)`); [`fix_projection`] maps requests made against the
//! squeezed shape back onto the full shape.

use log::debug;
use ndarray::{ArrayD, Axis, IxDyn, Slice};

use crate::axis::PlotAxis;
use crate::{Error, Result};

/// Half-open index range `(start, stop)` of one dimension.
pub type IndexRange = (usize, usize);

/// Reinserts length-1 dimensions into a projection request.
///
/// `keep_dims` and `limits` describe the squeezed array (length-1 dimensions
/// removed). When `shape.len() - limits.len()` equals the number of length-1
/// dimensions, `(0, 0)` is inserted into `limits` at every length-1 position and
/// each kept index is shifted up by one for every length-1 dimension at or
/// before it. Kept indices that cannot be squeezed indices (not below the
/// squeezed rank) are treated as full-rank indices and left alone.
///
/// A shape without length-1 dimensions is returned unchanged.
#[must_use]
pub fn fix_projection(
    shape: &[usize],
    keep_dims: &[usize],
    limits: &[IndexRange],
) -> (Vec<usize>, Vec<IndexRange>) {
    let size_one = shape.iter().filter(|&&n| n == 1).count();
    if size_one == 0
        || limits.len() > shape.len()
        || shape.len() - limits.len() != size_one
    {
        return (keep_dims.to_vec(), limits.to_vec());
    }

    let squeezed: Vec<usize> = (0..shape.len()).filter(|&i| shape[i] != 1).collect();
    let keep = if keep_dims.iter().all(|&d| d < squeezed.len()) {
        keep_dims.iter().map(|&d| squeezed[d]).collect()
    } else {
        keep_dims.to_vec()
    };

    let mut remaining = limits.iter().copied();
    let full_limits = shape
        .iter()
        .map(|&n| {
            if n == 1 {
                (0, 0)
            } else {
                remaining.next().unwrap_or((0, n))
            }
        })
        .collect();
    (keep, full_limits)
}

/// A request to reduce a signal to its kept dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionRequest {
    /// Dimensions to keep, in display order.
    pub keep_dims: Vec<usize>,
    /// Index range for every dimension of the full signal.
    pub limits: Vec<IndexRange>,
    /// Sum over collapsed ranges instead of taking their first index.
    pub summed: bool,
}

/// The reduced array and the axes that survive the reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Reduced signal, one dimension per kept dimension.
    pub values: ArrayD<f64>,
    /// Reduced uncertainties, when the signal has them.
    pub errors: Option<ArrayD<f64>>,
    /// Axes of the kept dimensions, re-indexed `0..k` in display order.
    pub axes: Vec<PlotAxis>,
    /// Kept dimensions of the full signal, in display order.
    pub keep_dims: Vec<usize>,
}

impl ProjectionRequest {
    /// Creates a request against the full signal shape.
    pub fn new(keep_dims: Vec<usize>, limits: Vec<IndexRange>) -> Self {
        Self {
            keep_dims,
            limits,
            summed: false,
        }
    }

    /// Creates a request against the squeezed shape, reinserting length-1 dimensions.
    pub fn squeezed(shape: &[usize], keep_dims: &[usize], limits: &[IndexRange]) -> Self {
        let (keep_dims, limits) = fix_projection(shape, keep_dims, limits);
        Self::new(keep_dims, limits)
    }

    /// Sums over collapsed ranges.
    #[must_use]
    pub fn summed(mut self, summed: bool) -> Self {
        self.summed = summed;
        self
    }

    /// Checks the request against a signal shape.
    ///
    /// # Errors
    /// `InvalidShape` when the limits do not cover every dimension,
    /// `InvalidAxis` for out-of-range or missing kept dimensions,
    /// `DuplicateAxes` when a dimension is kept twice, `InvalidLimits` for
    /// ranges outside the shape and `ZeroRange` when a kept range spans at most
    /// one index.
    pub fn validate(&self, shape: &[usize]) -> Result<()> {
        if self.limits.len() != shape.len() {
            return Err(Error::InvalidShape(format!(
                "{} limits supplied for a {}-D signal",
                self.limits.len(),
                shape.len()
            )));
        }
        if self.keep_dims.is_empty() {
            return Err(Error::InvalidAxis("no projection axes selected".to_string()));
        }
        for (i, &dim) in self.keep_dims.iter().enumerate() {
            if dim >= shape.len() {
                return Err(Error::InvalidAxis(format!(
                    "dimension {dim} is out of range for a {}-D signal",
                    shape.len()
                )));
            }
            if self.keep_dims[..i].contains(&dim) {
                return Err(Error::DuplicateAxes(dim));
            }
        }
        for (dim, &(start, stop)) in self.limits.iter().enumerate() {
            let kept = self.keep_dims.contains(&dim);
            if kept {
                if stop > shape[dim] || start > stop {
                    return Err(Error::InvalidLimits(format!(
                        "range {start}..{stop} is outside dimension {dim} of length {}",
                        shape[dim]
                    )));
                }
                if stop - start <= 1 {
                    return Err(Error::ZeroRange { dim, start, stop });
                }
            } else if start >= shape[dim] {
                return Err(Error::InvalidLimits(format!(
                    "index {start} is outside dimension {dim} of length {}",
                    shape[dim]
                )));
            }
        }
        Ok(())
    }

    /// Reduces `values` (and `errors`, when given) to the kept dimensions.
    ///
    /// `axes` holds one axis per dimension of the full signal.
    ///
    /// # Errors
    /// Any error from [`ProjectionRequest::validate`], or `InvalidAxis` when
    /// `axes` does not match the signal rank.
    pub fn project(
        &self,
        values: &ArrayD<f64>,
        errors: Option<&ArrayD<f64>>,
        axes: &[PlotAxis],
    ) -> Result<Projection> {
        let shape = values.shape();
        self.validate(shape)?;
        if axes.len() != shape.len() {
            return Err(Error::InvalidAxis(format!(
                "{} axes supplied for a {}-D signal",
                axes.len(),
                shape.len()
            )));
        }

        let reduced = self.reduce(values);
        let errors = errors.map(|e| {
            if self.summed {
                self.reduce(&e.mapv(|v| v * v)).mapv(f64::sqrt)
            } else {
                self.reduce(e)
            }
        });

        let axes = self
            .keep_dims
            .iter()
            .enumerate()
            .map(|(i, &dim)| {
                let (start, stop) = self.limits[dim];
                let mut axis = axes[dim].sliced(start, stop);
                axis.set_dim(i);
                axis
            })
            .collect();

        debug!(
            "projected {:?} onto dims {:?} -> {:?} (summed: {})",
            shape,
            self.keep_dims,
            reduced.shape(),
            self.summed
        );

        Ok(Projection {
            values: reduced,
            errors,
            axes,
            keep_dims: self.keep_dims.clone(),
        })
    }

    fn collapsed_range(&self, dim: usize, len: usize) -> (usize, usize) {
        let (start, stop) = self.limits[dim];
        if self.summed {
            (start, stop.max(start + 1).min(len))
        } else {
            (start, start + 1)
        }
    }

    fn reduce(&self, values: &ArrayD<f64>) -> ArrayD<f64> {
        let shape = values.shape().to_vec();
        let mut view = values.view();
        for (dim, &len) in shape.iter().enumerate() {
            let (start, stop) = if self.keep_dims.contains(&dim) {
                self.limits[dim]
            } else {
                self.collapsed_range(dim, len)
            };
            #[allow(clippy::cast_possible_wrap)]
            view.slice_axis_inplace(Axis(dim), Slice::from(start as isize..stop as isize));
        }

        let mut reduced = view.to_owned();
        for dim in (0..shape.len()).rev() {
            if self.keep_dims.contains(&dim) {
                continue;
            }
            reduced = if self.summed {
                reduced.sum_axis(Axis(dim))
            } else {
                reduced.index_axis_move(Axis(dim), 0)
            };
        }

        let mut sorted = self.keep_dims.clone();
        sorted.sort_unstable();
        let order: Vec<usize> = self
            .keep_dims
            .iter()
            .filter_map(|dim| sorted.iter().position(|d| d == dim))
            .collect();
        reduced
            .permuted_axes(IxDyn(&order))
            .as_standard_layout()
            .into_owned()
    }
}

impl Projection {
    /// Number of kept dimensions.
    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    /// Shape of the reduced signal.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array;

    fn cube(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        #[allow(clippy::cast_precision_loss)]
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Array::from_shape_vec(IxDyn(shape), values).unwrap()
    }

    fn axes_for(shape: &[usize]) -> Vec<PlotAxis> {
        shape
            .iter()
            .enumerate()
            .map(|(dim, &n)| PlotAxis::index(dim, n))
            .collect()
    }

    #[test]
    fn test_fix_projection_inserts_size_one() {
        let (keep, limits) = fix_projection(&[1, 10, 20], &[0, 1], &[(0, 10), (0, 20)]);
        assert_eq!(keep, vec![1, 2]);
        assert_eq!(limits, vec![(0, 0), (0, 10), (0, 20)]);
    }

    #[test]
    fn test_fix_projection_full_rank_keep_dims() {
        let (keep, limits) = fix_projection(&[1, 10, 20], &[1, 2], &[(0, 10), (0, 20)]);
        assert_eq!(keep, vec![1, 2]);
        assert_eq!(limits, vec![(0, 0), (0, 10), (0, 20)]);
    }

    #[test]
    fn test_fix_projection_interior_size_one() {
        let (keep, limits) = fix_projection(&[10, 1, 20], &[1], &[(2, 3), (0, 20)]);
        assert_eq!(keep, vec![2]);
        assert_eq!(limits, vec![(2, 3), (0, 0), (0, 20)]);
    }

    #[test]
    fn test_fix_projection_noop_without_size_one() {
        let limits = [(0, 5), (1, 4), (2, 3)];
        let (keep, fixed) = fix_projection(&[5, 5, 5], &[1, 0], &limits);
        assert_eq!(keep, vec![1, 0]);
        assert_eq!(fixed, limits.to_vec());
    }

    #[test]
    fn test_zero_range_rejected() {
        let values = cube(&[5, 5, 5]);
        let request = ProjectionRequest::new(vec![1], vec![(2, 2), (3, 3), (0, 5)]);
        let err = request
            .project(&values, None, &axes_for(&[5, 5, 5]))
            .unwrap_err();
        assert_eq!(
            err,
            Error::ZeroRange {
                dim: 1,
                start: 3,
                stop: 3
            }
        );
    }

    #[test]
    fn test_duplicate_and_out_of_range() {
        let shape = [4, 4];
        let request = ProjectionRequest::new(vec![0, 0], vec![(0, 4), (0, 4)]);
        assert_eq!(request.validate(&shape), Err(Error::DuplicateAxes(0)));
        let request = ProjectionRequest::new(vec![0], vec![(0, 4), (4, 4)]);
        assert!(matches!(
            request.validate(&shape),
            Err(Error::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_slice_projection_shape_and_values() {
        let values = cube(&[3, 4, 5]);
        let request = ProjectionRequest::new(vec![2, 1], vec![(1, 2), (0, 4), (1, 4)]);
        let projection = request
            .project(&values, None, &axes_for(&[3, 4, 5]))
            .unwrap();
        assert_eq!(projection.shape(), &[3, 4]);
        assert_eq!(projection.axes.len(), 2);
        assert_eq!(projection.axes[0].dim(), Some(0));
        assert_eq!(projection.axes[0].name(), "Axis2");
        // values[1, j, i] = 20 + 5j + i; result[k, j] = values[1, j, k + 1]
        assert_relative_eq!(projection.values[[0, 0]], 21.0);
        assert_relative_eq!(projection.values[[2, 3]], 38.0);
    }

    #[test]
    fn test_summed_projection() {
        let values = cube(&[3, 4]);
        let request = ProjectionRequest::new(vec![1], vec![(0, 3), (0, 4)]).summed(true);
        let projection = request.project(&values, None, &axes_for(&[3, 4])).unwrap();
        assert_eq!(projection.shape(), &[4]);
        // column sums of [[0,1,2,3],[4,5,6,7],[8,9,10,11]]
        assert_relative_eq!(projection.values[[0]], 12.0);
        assert_relative_eq!(projection.values[[3]], 21.0);
    }

    #[test]
    fn test_summed_errors_add_in_quadrature() {
        let values = cube(&[2, 3]);
        let errors = ArrayD::from_elem(IxDyn(&[2, 3]), 3.0);
        let request = ProjectionRequest::new(vec![1], vec![(0, 2), (0, 3)]).summed(true);
        let projection = request
            .project(&values, Some(&errors), &axes_for(&[2, 3]))
            .unwrap();
        let errors = projection.errors.unwrap();
        assert_relative_eq!(errors[[0]], (18.0_f64).sqrt());
    }

    #[test]
    fn test_squeezed_request_projects_full_signal() {
        let values = cube(&[1, 10, 20]);
        let request = ProjectionRequest::squeezed(&[1, 10, 20], &[0, 1], &[(0, 10), (0, 20)]);
        let projection = request
            .project(&values, None, &axes_for(&[1, 10, 20]))
            .unwrap();
        assert_eq!(projection.shape(), &[10, 20]);
        assert_eq!(projection.keep_dims, vec![1, 2]);
    }
}

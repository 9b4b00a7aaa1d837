//! The array data source consumed by plot views.
//!
//! `NxData` mirrors the parts of a NeXus `NXdata` group that plotting needs:
//! a signal, its axes, optional uncertainties and the `long_name`/`units`
//! attributes used for labels.

use std::sync::Arc;

use ndarray::{Array1, ArrayD};

use crate::{Error, Result};

/// A named numeric array with NeXus label attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct NxField {
    /// Field name.
    pub name: String,
    /// Values.
    pub values: ArrayD<f64>,
    /// `long_name` attribute.
    pub long_name: Option<String>,
    /// `units` attribute.
    pub units: Option<String>,
}

impl NxField {
    /// Creates a field without attributes.
    pub fn new(name: impl Into<String>, values: ArrayD<f64>) -> Self {
        Self {
            name: name.into(),
            values,
            long_name: None,
            units: None,
        }
    }

    /// Creates a 1-D field from a vector.
    pub fn from_vec(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, Array1::from(values).into_dyn())
    }

    /// Sets the `long_name` attribute.
    #[must_use]
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// Sets the `units` attribute.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Shape of the values.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Display label: `long_name`, else `name (units)`, else `name`.
    pub fn label(&self) -> String {
        make_label(&self.name, self.long_name.as_deref(), self.units.as_deref())
    }

    /// Values flattened in logical order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}

pub(crate) fn make_label(name: &str, long_name: Option<&str>, units: Option<&str>) -> String {
    match (long_name, units) {
        (Some(long_name), _) if !long_name.is_empty() => long_name.to_string(),
        (_, Some(units)) if !units.is_empty() => format!("{name} ({units})"),
        _ => name.to_string(),
    }
}

/// A plottable group: signal, axes and uncertainties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NxData {
    /// Group name.
    pub name: String,
    /// Signal to plot.
    pub signal: Option<NxField>,
    /// One axis per signal dimension, or none.
    pub axes: Vec<NxField>,
    /// Uncertainties aligned with the signal.
    pub errors: Option<ArrayD<f64>>,
    /// Plot title.
    pub title: Option<String>,
}

impl NxData {
    /// Creates a group around a signal.
    pub fn new(signal: NxField) -> Self {
        Self {
            name: "data".to_string(),
            signal: Some(signal),
            axes: Vec::new(),
            errors: None,
            title: None,
        }
    }

    /// Sets the group name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the axes, one per signal dimension.
    #[must_use]
    pub fn with_axes(mut self, axes: Vec<NxField>) -> Self {
        self.axes = axes;
        self
    }

    /// Sets the uncertainties.
    #[must_use]
    pub fn with_errors(mut self, errors: ArrayD<f64>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Wraps the group for cheap sharing between views.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The signal, or [`Error::NoSignal`].
    ///
    /// # Errors
    /// Returns `NoSignal` when the group has no signal field.
    pub fn signal(&self) -> Result<&NxField> {
        self.signal.as_ref().ok_or(Error::NoSignal)
    }

    /// Shape of the signal (empty when there is none).
    pub fn shape(&self) -> &[usize] {
        match &self.signal {
            Some(signal) => signal.shape(),
            None => &[],
        }
    }

    /// Shape with the length-1 dimensions removed.
    pub fn squeezed_shape(&self) -> Vec<usize> {
        self.shape().iter().copied().filter(|&n| n != 1).collect()
    }

    /// Indices of the dimensions longer than one.
    pub fn squeezed_dims(&self) -> Vec<usize> {
        self.shape()
            .iter()
            .enumerate()
            .filter(|(_, &n)| n != 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Checks the group against the plotting contract.
    ///
    /// # Errors
    /// `NoSignal` without a signal, `InvalidShape` for empty or scalar signals
    /// and misaligned errors, `InvalidAxis` for axes of the wrong count or length.
    pub fn validate(&self) -> Result<()> {
        let signal = self.signal()?;
        let shape = signal.shape();
        if shape.is_empty() || shape.iter().any(|&n| n == 0) {
            return Err(Error::InvalidShape(format!(
                "signal {} has shape {shape:?}",
                signal.name
            )));
        }
        if !self.axes.is_empty() && self.axes.len() != shape.len() {
            return Err(Error::InvalidAxis(format!(
                "{} axes supplied for a {}-D signal",
                self.axes.len(),
                shape.len()
            )));
        }
        for (dim, axis) in self.axes.iter().enumerate() {
            if axis.values.ndim() != 1 {
                return Err(Error::InvalidAxis(format!(
                    "axis {} is not one-dimensional",
                    axis.name
                )));
            }
            let len = axis.values.len();
            if len != shape[dim] && len != shape[dim] + 1 {
                return Err(Error::InvalidAxis(format!(
                    "axis {} length {len} must be {} or {}",
                    axis.name,
                    shape[dim],
                    shape[dim] + 1
                )));
            }
        }
        if let Some(errors) = &self.errors {
            if errors.shape() != shape {
                return Err(Error::InvalidShape(format!(
                    "errors shape {:?} does not match signal shape {shape:?}",
                    errors.shape()
                )));
            }
        }
        Ok(())
    }

    /// Axis values for a dimension, or `0..n` indices when no axes were supplied.
    #[allow(clippy::cast_precision_loss)]
    pub fn axis_values(&self, dim: usize) -> Vec<f64> {
        match self.axes.get(dim) {
            Some(axis) => axis.to_vec(),
            None => (0..self.shape().get(dim).copied().unwrap_or(0))
                .map(|i| i as f64)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn image(shape: &[usize]) -> NxData {
        NxData::new(NxField::new("counts", ArrayD::zeros(IxDyn(shape))))
    }

    #[test]
    fn test_labels() {
        let field = NxField::from_vec("q", vec![1.0]);
        assert_eq!(field.label(), "q");
        assert_eq!(field.clone().with_units("1/Å").label(), "q (1/Å)");
        assert_eq!(
            field.with_units("1/Å").with_long_name("Momentum transfer").label(),
            "Momentum transfer"
        );
    }

    #[test]
    fn test_validate_no_signal() {
        assert_eq!(NxData::default().validate(), Err(Error::NoSignal));
    }

    #[test]
    fn test_validate_axis_lengths() {
        let data = image(&[3, 4]).with_axes(vec![
            NxField::from_vec("y", vec![0.0, 1.0, 2.0, 3.0]),
            NxField::from_vec("x", vec![0.0, 1.0, 2.0, 3.0]),
        ]);
        assert!(data.validate().is_ok());

        let bad = image(&[3, 4]).with_axes(vec![
            NxField::from_vec("y", vec![0.0, 1.0]),
            NxField::from_vec("x", vec![0.0, 1.0, 2.0, 3.0]),
        ]);
        assert!(matches!(bad.validate(), Err(Error::InvalidAxis(_))));
    }

    #[test]
    fn test_validate_errors_shape() {
        let data = image(&[3, 4]).with_errors(ArrayD::zeros(IxDyn(&[4, 3])));
        assert!(matches!(data.validate(), Err(Error::InvalidShape(_))));
    }

    #[test]
    fn test_squeeze() {
        let data = image(&[1, 10, 1, 20]);
        assert_eq!(data.squeezed_shape(), vec![10, 20]);
        assert_eq!(data.squeezed_dims(), vec![1, 3]);
        assert_eq!(data.axis_values(1).len(), 10);
    }
}

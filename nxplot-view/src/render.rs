//! The boundary to a plotting backend.
//!
//! A [`Scene`] is a fully resolved description of one frame: every limit,
//! normalisation and scale is decided here, from the [`ViewState`], so a
//! [`Renderer`] only translates commands into backend calls and can be
//! swapped without changing what is shown.

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use ndarray::{Array2, Array3, Ix2, Ix3};

use nxplot_core::limits::finite_min_max;
use nxplot_core::Projection;

use crate::colormap::Colormap;
use crate::options::{Aspect, Interpolation, LineFormat};
use crate::state::ViewState;
use crate::zoom::Scale;

/// Intensity normalisation with resolved limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Norm {
    /// Linear or log.
    pub scale: Scale,
    /// Value mapped to 0.
    pub vmin: f64,
    /// Value mapped to 1.
    pub vmax: f64,
}

impl Norm {
    /// Maps `value` to `[0, 1]`; values outside the limits fall outside.
    ///
    /// Returns NaN for non-finite values and, on a log scale, non-positive ones.
    pub fn normalize(&self, value: f64) -> f64 {
        match self.scale {
            Scale::Linear => (value - self.vmin) / (self.vmax - self.vmin),
            Scale::Log if value > 0.0 => {
                (value.log10() - self.vmin.log10()) / (self.vmax.log10() - self.vmin.log10())
            }
            Scale::Log => f64::NAN,
        }
    }
}

/// Data extent of a regular image, `(first, last)` boundary per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Horizontal boundaries.
    pub x: (f64, f64),
    /// Vertical boundaries.
    pub y: (f64, f64),
}

/// One draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Points and/or lines with optional error bars.
    Curve {
        /// Legend label.
        label: String,
        /// Horizontal positions.
        x: Vec<f64>,
        /// Vertical positions.
        y: Vec<f64>,
        /// Symmetric error bar half-widths.
        errors: Option<Vec<f64>>,
        /// Marker and line style.
        style: LineFormat,
    },
    /// Regular grid drawn as an image; rows are y.
    Image {
        /// Values, `(ny, nx)`.
        values: Array2<f64>,
        /// Boundary extent.
        extent: Extent,
        /// Colour normalisation.
        norm: Norm,
        /// Colormap.
        colormap: Colormap,
        /// Pixel interpolation.
        interpolation: Interpolation,
    },
    /// Irregular (or skewed) grid drawn as quadrilaterals.
    Mesh {
        /// Values, `(ny, nx)`.
        values: Array2<f64>,
        /// `nx + 1` boundaries.
        x_edges: Vec<f64>,
        /// `ny + 1` boundaries.
        y_edges: Vec<f64>,
        /// Colour normalisation.
        norm: Norm,
        /// Colormap.
        colormap: Colormap,
    },
    /// True-colour image with channels scaled to `[0, 1]`.
    Rgb {
        /// Values, `(ny, nx, 3 | 4)`.
        values: Array3<f64>,
        /// Boundary extent.
        extent: Extent,
    },
    /// Colour scale for the preceding image.
    Colorbar {
        /// Colour normalisation.
        norm: Norm,
        /// Colormap.
        colormap: Colormap,
        /// Label (the signal label).
        label: String,
    },
}

/// A resolved frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Plot title.
    pub title: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// Horizontal limits.
    pub x_limits: (f64, f64),
    /// Vertical limits.
    pub y_limits: (f64, f64),
    /// Horizontal scale.
    pub x_scale: Scale,
    /// Vertical scale.
    pub y_scale: Scale,
    /// Horizontal values decrease to the right.
    pub x_reversed: bool,
    /// Vertical values decrease upwards.
    pub y_reversed: bool,
    /// Aspect ratio.
    pub aspect: Aspect,
    /// Skew angle in degrees.
    pub skew: Option<f64>,
    /// Draw calls in painting order.
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    /// Resolves a frame from a view state and its image projection.
    ///
    /// `projection` is what [`ViewState::refresh`] returned; it is ignored for
    /// line plots.
    pub fn build(state: &ViewState, projection: Option<&Projection>) -> Self {
        let x = state.x_axis();
        let y = state.y_axis();
        let mut scene = Scene {
            title: state.title().to_string(),
            x_label: x.label(),
            y_label: y.label(),
            x_limits: x.get_limits(),
            y_limits: y.get_limits(),
            x_scale: Scale::from_log(x.log()),
            y_scale: Scale::from_log(y.log()),
            x_reversed: x.reversed(),
            y_reversed: y.reversed(),
            aspect: state.aspect(),
            skew: state.skew(),
            commands: Vec::new(),
        };

        if state.is_1d() {
            scene.commands = state
                .curves()
                .iter()
                .map(|curve| DrawCommand::Curve {
                    label: curve.label.clone(),
                    x: curve.x.clone(),
                    y: curve.y.clone(),
                    errors: curve.errors.clone(),
                    style: curve.fmt,
                })
                .collect();
            return scene;
        }

        let Some(projection) = projection else {
            return scene;
        };
        let (Some(py), Some(px)) = (projection.axes.first(), projection.axes.get(1)) else {
            return scene;
        };
        let extent = Extent {
            x: edges(px.boundaries()),
            y: edges(py.boundaries()),
        };

        if state.is_rgb() {
            match projection.values.clone().into_dimensionality::<Ix3>() {
                Ok(values) => scene.commands.push(DrawCommand::Rgb {
                    values: scale_rgb(values),
                    extent,
                }),
                Err(err) => warn!("cannot draw RGB image: {err}"),
            }
            return scene;
        }

        let signal = state.signal_axis();
        let norm = Norm {
            scale: Scale::from_log(signal.log()),
            vmin: signal.lo(),
            vmax: signal.hi(),
        };
        let values = match projection.values.clone().into_dimensionality::<Ix2>() {
            Ok(values) => values,
            Err(err) => {
                warn!("cannot draw image: {err}");
                return scene;
            }
        };
        let regular = px.equally_spaced()
            && py.equally_spaced()
            && state.skew().is_none()
            && !x.log()
            && !y.log();
        scene.commands.push(if regular {
            DrawCommand::Image {
                values,
                extent,
                norm,
                colormap: state.colormap(),
                interpolation: state.interpolation(),
            }
        } else {
            DrawCommand::Mesh {
                values,
                x_edges: px.boundaries().to_vec(),
                y_edges: py.boundaries().to_vec(),
                norm,
                colormap: state.colormap(),
            }
        });
        scene.commands.push(DrawCommand::Colorbar {
            norm,
            colormap: state.colormap(),
            label: signal.label(),
        });
        scene
    }

    /// The first image-like command, if any.
    pub fn image(&self) -> Option<&DrawCommand> {
        self.commands.iter().find(|c| {
            matches!(
                c,
                DrawCommand::Image { .. } | DrawCommand::Mesh { .. } | DrawCommand::Rgb { .. }
            )
        })
    }

    /// Number of curves.
    pub fn curve_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Curve { .. }))
            .count()
    }
}

fn edges(boundaries: &[f64]) -> (f64, f64) {
    match (boundaries.first(), boundaries.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => (0.0, 1.0),
    }
}

/// Integer-valued RGB data (max above 1) is taken as 0..255.
fn scale_rgb(values: Array3<f64>) -> Array3<f64> {
    let max = values
        .as_slice_memory_order()
        .and_then(finite_min_max)
        .map_or(1.0, |(_, max)| max);
    if max > 1.0 {
        values.mapv(|v| (v / 255.0).clamp(0.0, 1.0))
    } else {
        values.mapv(|v| v.clamp(0.0, 1.0))
    }
}

/// A plotting backend.
pub trait Renderer {
    /// Draws a frame, replacing the previous one.
    fn render(&mut self, scene: &Scene);

    /// Removes everything drawn; called when the view closes.
    fn clear(&mut self) {}
}

/// Renderer that keeps every frame, for headless use and tests.
///
/// Clones share their record, so a caller can keep a handle while the view
/// owns the renderer.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    scenes: Rc<RefCell<Vec<Scene>>>,
    cleared: Rc<RefCell<usize>>,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames drawn.
    pub fn len(&self) -> usize {
        self.scenes.borrow().len()
    }

    /// Whether nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.scenes.borrow().is_empty()
    }

    /// Last frame drawn.
    pub fn last(&self) -> Option<Scene> {
        self.scenes.borrow().last().cloned()
    }

    /// Number of `clear` calls.
    pub fn cleared(&self) -> usize {
        *self.cleared.borrow()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, scene: &Scene) {
        self.scenes.borrow_mut().push(scene.clone());
    }

    fn clear(&mut self) {
        *self.cleared.borrow_mut() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};
    use nxplot_core::{NxData, NxField};

    use crate::config::PlotConfig;
    use crate::options::PlotOptions;

    fn state(shape: &[usize], options: &PlotOptions) -> ViewState {
        let n: usize = shape.iter().product();
        #[allow(clippy::cast_precision_loss)]
        let values = Array::from_shape_vec(IxDyn(shape), (0..n).map(|i| i as f64).collect())
            .unwrap();
        let data = Arc::new(NxData::new(NxField::new("counts", values)));
        ViewState::plot(data, options, &PlotConfig::default(), None).unwrap()
    }

    #[test]
    fn test_norm() {
        let linear = Norm {
            scale: Scale::Linear,
            vmin: 0.0,
            vmax: 10.0,
        };
        assert_relative_eq!(linear.normalize(2.5), 0.25);
        let log = Norm {
            scale: Scale::Log,
            vmin: 1.0,
            vmax: 100.0,
        };
        assert_relative_eq!(log.normalize(10.0), 0.5);
        assert!(log.normalize(0.0).is_nan());
    }

    #[test]
    fn test_line_scene() {
        let mut state = state(&[6], &PlotOptions::default());
        let projection = state.refresh().unwrap();
        let scene = Scene::build(&state, projection.as_ref());
        assert_eq!(scene.curve_count(), 1);
        assert_eq!(scene.x_label, "Axis0");
        assert_eq!(scene.y_label, "counts");
        assert!(scene.image().is_none());
    }

    #[test]
    fn test_image_scene() {
        let mut state = state(&[3, 4, 5], &PlotOptions::default());
        let projection = state.refresh().unwrap();
        let scene = Scene::build(&state, projection.as_ref());
        match scene.image() {
            Some(DrawCommand::Image { values, extent, norm, .. }) => {
                assert_eq!(values.dim(), (4, 5));
                assert_eq!(extent.x, (-0.5, 4.5));
                assert_eq!(extent.y, (-0.5, 3.5));
                assert_relative_eq!(norm.vmax, 19.0);
            }
            other => panic!("expected an image, got {other:?}"),
        }
        assert!(matches!(
            scene.commands.last(),
            Some(DrawCommand::Colorbar { .. })
        ));
    }

    #[test]
    fn test_skew_draws_mesh() {
        let mut state = state(&[4, 5], &PlotOptions::default());
        state.set_skew(Some(60.0)).unwrap();
        let projection = state.refresh().unwrap();
        let scene = Scene::build(&state, projection.as_ref());
        assert!(matches!(scene.image(), Some(DrawCommand::Mesh { .. })));
        assert_eq!(scene.skew, Some(60.0));
    }

    #[test]
    fn test_rgb_scene_is_scaled() {
        let options = PlotOptions {
            image: true,
            ..PlotOptions::default()
        };
        let mut state = state(&[2, 3, 3], &options);
        let projection = state.refresh().unwrap();
        let scene = Scene::build(&state, projection.as_ref());
        match scene.image() {
            Some(DrawCommand::Rgb { values, .. }) => {
                assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
            }
            other => panic!("expected an RGB image, got {other:?}"),
        }
        assert_eq!(scene.aspect, Aspect::Equal);
    }

    #[test]
    fn test_recording_renderer_shares_record() {
        let recorder = RecordingRenderer::new();
        let mut handle: Box<dyn Renderer> = Box::new(recorder.clone());
        let state = state(&[6], &PlotOptions::default());
        handle.render(&Scene::build(&state, None));
        handle.clear();
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.cleared(), 1);
    }
}

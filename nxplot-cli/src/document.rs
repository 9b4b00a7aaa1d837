//! JSON form of `NxData` and of rendered scenes.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use nxplot_core::{NxData, NxField};
use nxplot_view::render::{DrawCommand, Norm};
use nxplot_view::Scene;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{CliError, Result};

/// An array with its attributes; non-finite values are stored as `null`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// A self-contained `NXdata` group.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub signal: FieldDocument,
    #[serde(default)]
    pub axes: Vec<FieldDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Option<f64>>>,
}

fn encode(values: &ArrayD<f64>) -> Vec<Option<f64>> {
    values.iter().map(|v| v.is_finite().then_some(*v)).collect()
}

fn decode(name: &str, shape: &[usize], values: &[Option<f64>]) -> Result<ArrayD<f64>> {
    let values = values.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|e| CliError::Argument(format!("{name}: {e}")))
}

impl FieldDocument {
    fn from_field(field: &NxField) -> Self {
        Self {
            name: field.name.clone(),
            shape: field.shape().to_vec(),
            values: encode(&field.values),
            long_name: field.long_name.clone(),
            units: field.units.clone(),
        }
    }

    fn into_field(self) -> Result<NxField> {
        let values = decode(&self.name, &self.shape, &self.values)?;
        Ok(NxField {
            name: self.name,
            values,
            long_name: self.long_name,
            units: self.units,
        })
    }
}

impl DataDocument {
    pub fn from_data(data: &NxData) -> Result<Self> {
        let signal = data.signal()?;
        Ok(Self {
            name: data.name.clone(),
            title: data.title.clone(),
            signal: FieldDocument::from_field(signal),
            axes: data.axes.iter().map(FieldDocument::from_field).collect(),
            errors: data.errors.as_ref().map(encode),
        })
    }

    pub fn into_data(self) -> Result<NxData> {
        let shape = self.signal.shape.clone();
        let errors = self
            .errors
            .map(|errors| decode("errors", &shape, &errors))
            .transpose()?;
        let axes = self
            .axes
            .into_iter()
            .map(FieldDocument::into_field)
            .collect::<Result<Vec<_>>>()?;
        let mut data = NxData::new(self.signal.into_field()?)
            .with_name(self.name)
            .with_axes(axes);
        data.errors = errors;
        data.title = self.title;
        data.validate()?;
        Ok(data)
    }
}

/// Reads a document written by `nxplot project`.
pub fn read(path: &Path) -> Result<NxData> {
    let file = std::fs::File::open(path)?;
    let document: DataDocument = serde_json::from_reader(std::io::BufReader::new(file))?;
    document.into_data()
}

fn norm(norm: &Norm) -> Value {
    json!({
        "scale": format!("{:?}", norm.scale).to_lowercase(),
        "vmin": norm.vmin,
        "vmax": norm.vmax,
    })
}

/// Summary of a scene: everything but the pixel values.
pub fn scene_summary(scene: &Scene) -> Value {
    let commands: Vec<Value> = scene
        .commands
        .iter()
        .map(|command| match command {
            DrawCommand::Curve {
                label,
                x,
                errors,
                style,
                ..
            } => json!({
                "kind": "curve",
                "label": label,
                "points": x.len(),
                "errors": errors.is_some(),
                "style": format!("{style:?}"),
            }),
            DrawCommand::Image {
                values,
                extent,
                norm: n,
                colormap,
                interpolation,
            } => json!({
                "kind": "image",
                "shape": values.shape(),
                "extent": [extent.x.0, extent.x.1, extent.y.0, extent.y.1],
                "norm": norm(n),
                "colormap": colormap.name(),
                "interpolation": interpolation.name(),
            }),
            DrawCommand::Mesh {
                values,
                norm: n,
                colormap,
                ..
            } => json!({
                "kind": "mesh",
                "shape": values.shape(),
                "norm": norm(n),
                "colormap": colormap.name(),
            }),
            DrawCommand::Rgb { values, extent } => json!({
                "kind": "rgb",
                "shape": values.shape(),
                "extent": [extent.x.0, extent.x.1, extent.y.0, extent.y.1],
            }),
            DrawCommand::Colorbar {
                norm: n,
                colormap,
                label,
            } => json!({
                "kind": "colorbar",
                "label": label,
                "norm": norm(n),
                "colormap": colormap.name(),
            }),
        })
        .collect();
    json!({
        "title": scene.title,
        "x_label": scene.x_label,
        "y_label": scene.y_label,
        "x_limits": [scene.x_limits.0, scene.x_limits.1],
        "y_limits": [scene.y_limits.0, scene.y_limits.1],
        "x_scale": format!("{:?}", scene.x_scale).to_lowercase(),
        "y_scale": format!("{:?}", scene.y_scale).to_lowercase(),
        "aspect": format!("{:?}", scene.aspect),
        "skew": scene.skew,
        "commands": commands,
    })
}

//! Draws a [`Scene`] with `egui_plot`.
//!
//! Log axes are drawn in log10 coordinates with tick labels converted back;
//! a skew angle shears x by `y / tan θ` as the view's data transform does.
//! Reversed axes are drawn negated so egui_plot still sees increasing bounds.
//! Navigation is left to the view, so the plot's own drag and zoom are off.

use std::ops::RangeInclusive;

use egui::{Color32, Stroke, TextureHandle};
use egui_plot::{
    GridMark, Legend, Line, MarkerShape, Plot, PlotBounds, PlotImage, PlotPoint, PlotPoints,
    PlotUi, Points, Polygon,
};
use ndarray::Array2;
use nxplot_view::options::{LineStyle, Marker};
use nxplot_view::render::{DrawCommand, Extent, Norm};
use nxplot_view::zoom::Scale;
use nxplot_view::{format_value, Aspect, Colormap, LineFormat, Scene};

use super::texture::value_color;
use super::TextureCache;
use crate::util::f64_to_f32;

const PALETTE: [Color32; 6] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
];

const COLORBAR_WIDTH: f32 = 84.0;

/// What the plot area reported this frame.
pub struct PlotInteraction {
    /// Response of the plot widget.
    pub response: egui::Response,
    /// Screen rectangle of the data area.
    pub frame: egui::Rect,
    /// Data coordinates under the pointer.
    pub pointer: Option<(f64, f64)>,
}

/// Data to plot coordinates.
#[derive(Clone, Copy)]
struct Mapping {
    x: Scale,
    y: Scale,
    shear: f64,
    x_sign: f64,
    y_sign: f64,
}

fn sign(reversed: bool) -> f64 {
    if reversed {
        -1.0
    } else {
        1.0
    }
}

impl Mapping {
    fn new(scene: &Scene) -> Self {
        let linear = scene.x_scale == Scale::Linear && scene.y_scale == Scale::Linear;
        let shear = match scene.skew {
            Some(angle) if linear => 1.0 / angle.to_radians().tan(),
            _ => 0.0,
        };
        Self {
            x: scene.x_scale,
            y: scene.y_scale,
            shear,
            x_sign: sign(scene.x_reversed),
            y_sign: sign(scene.y_reversed),
        }
    }

    fn point(self, x: f64, y: f64) -> Option<[f64; 2]> {
        let my = self.y.map_value(y)?;
        let mx = self.x.map_value(x)?;
        Some([self.x_sign * (mx + self.shear * my), self.y_sign * my])
    }

    fn invert(self, point: PlotPoint) -> Option<(f64, f64)> {
        let my = self.y_sign * point.y;
        let y = self.y.invert_value(my)?;
        let x = self.x.invert_value(self.x_sign * point.x - self.shear * my)?;
        Some((x, y))
    }

    fn bounds(self, scene: &Scene) -> Option<PlotBounds> {
        let (x0, x1) = scene.x_limits;
        let (y0, y1) = scene.y_limits;
        let (x0, x1) = (self.x_sign * self.x.map_value(x0)?, self.x_sign * self.x.map_value(x1)?);
        let (y0, y1) = (self.y_sign * self.y.map_value(y0)?, self.y_sign * self.y.map_value(y1)?);
        Some(PlotBounds::from_min_max(
            [x0.min(x1), y0.min(y1)],
            [x0.max(x1), y0.max(y1)],
        ))
    }
}

fn tick_formatter(scale: Scale, reversed: bool) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let value = sign(reversed) * mark.value;
        match scale {
            Scale::Linear => format_value(value),
            Scale::Log => format_value(10f64.powf(value)),
        }
    }
}

fn marker_shape(marker: Marker) -> MarkerShape {
    match marker {
        Marker::Point | Marker::Circle => MarkerShape::Circle,
        Marker::Square => MarkerShape::Square,
        Marker::TriangleUp => MarkerShape::Up,
        Marker::TriangleDown => MarkerShape::Down,
        Marker::Diamond => MarkerShape::Diamond,
        Marker::Plus => MarkerShape::Plus,
        Marker::Cross => MarkerShape::Cross,
        Marker::Star => MarkerShape::Asterisk,
    }
}

fn line_style(style: LineStyle) -> egui_plot::LineStyle {
    match style {
        LineStyle::Solid => egui_plot::LineStyle::Solid,
        LineStyle::Dashed => egui_plot::LineStyle::Dashed { length: 10.0 },
        LineStyle::DashDot => egui_plot::LineStyle::Dashed { length: 5.0 },
        LineStyle::Dotted => egui_plot::LineStyle::Dotted { spacing: 5.0 },
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_curve(
    plot_ui: &mut PlotUi,
    mapping: Mapping,
    label: &str,
    x: &[f64],
    y: &[f64],
    errors: Option<&Vec<f64>>,
    style: LineFormat,
    color: Color32,
) {
    let points: Vec<[f64; 2]> = x
        .iter()
        .zip(y)
        .filter_map(|(&x, &y)| mapping.point(x, y))
        .collect();
    if let Some(errors) = errors {
        for ((&x, &y), &e) in x.iter().zip(y).zip(errors) {
            if let (Some(lo), Some(hi)) = (mapping.point(x, y - e), mapping.point(x, y + e)) {
                plot_ui.line(Line::new(PlotPoints::from(vec![lo, hi])).color(color).width(1.0));
            }
        }
    }
    if let Some(line) = style.line {
        plot_ui.line(
            Line::new(PlotPoints::from(points.clone()))
                .name(label)
                .color(color)
                .style(line_style(line)),
        );
    }
    if let Some(marker) = style.marker {
        let radius = if marker == Marker::Point { 1.5 } else { 3.0 };
        plot_ui.points(
            Points::new(PlotPoints::from(points))
                .name(label)
                .color(color)
                .shape(marker_shape(marker))
                .radius(radius),
        );
    }
}

fn draw_image(plot_ui: &mut PlotUi, mapping: Mapping, texture: &TextureHandle, extent: &Extent) {
    let (Some([x0, y0]), Some([x1, y1])) = (
        mapping.point(extent.x.0, extent.y.0),
        mapping.point(extent.x.1, extent.y.1),
    ) else {
        return;
    };
    let center = PlotPoint::new(0.5 * (x0 + x1), 0.5 * (y0 + y1));
    let size = [f64_to_f32((x1 - x0).abs()), f64_to_f32((y1 - y0).abs())];
    plot_ui.image(PlotImage::new(texture, center, size));
}

fn draw_mesh(
    plot_ui: &mut PlotUi,
    mapping: Mapping,
    values: &Array2<f64>,
    x_edges: &[f64],
    y_edges: &[f64],
    norm: &Norm,
    colormap: Colormap,
) {
    for ((j, i), &value) in values.indexed_iter() {
        let color = value_color(value, norm, colormap);
        if color.a() == 0 {
            continue;
        }
        let (Some(&xa), Some(&xb), Some(&ya), Some(&yb)) =
            (x_edges.get(i), x_edges.get(i + 1), y_edges.get(j), y_edges.get(j + 1))
        else {
            continue;
        };
        let corners: Option<Vec<[f64; 2]>> = [(xa, ya), (xb, ya), (xb, yb), (xa, yb)]
            .into_iter()
            .map(|(x, y)| mapping.point(x, y))
            .collect();
        if let Some(corners) = corners {
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(corners))
                    .fill_color(color)
                    .stroke(Stroke::NONE),
            );
        }
    }
}

fn draw_colorbar(ui: &mut egui::Ui, texture: &TextureHandle, norm: &Norm, label: &str) {
    ui.vertical(|ui| {
        ui.set_width(COLORBAR_WIDTH);
        ui.small(format_value(norm.vmax));
        let height = (ui.available_height() - 40.0).max(40.0);
        ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(18.0, height)));
        ui.small(format_value(norm.vmin));
        ui.label(egui::RichText::new(label).small().weak());
    });
}

/// Draws `scene`, with its colorbar to the right when it has one.
pub fn draw_scene(
    ui: &mut egui::Ui,
    id: &str,
    scene: &Scene,
    textures: &TextureCache,
) -> PlotInteraction {
    let colorbar = scene
        .commands
        .iter()
        .enumerate()
        .find_map(|(index, command)| match command {
            DrawCommand::Colorbar { norm, label, .. } => {
                textures.get(index).map(|texture| (texture, *norm, label))
            }
            _ => None,
        });

    ui.horizontal_top(|ui| {
        let width = if colorbar.is_some() {
            ui.available_width() - COLORBAR_WIDTH - 8.0
        } else {
            ui.available_width()
        };
        let interaction = ui
            .allocate_ui(egui::vec2(width, ui.available_height()), |ui| {
                draw_plot(ui, id, scene, textures)
            })
            .inner;
        if let Some((texture, norm, label)) = colorbar {
            draw_colorbar(ui, texture, &norm, label);
        }
        interaction
    })
    .inner
}

fn draw_plot(ui: &mut egui::Ui, id: &str, scene: &Scene, textures: &TextureCache) -> PlotInteraction {
    let mapping = Mapping::new(scene);
    let mut plot = Plot::new(id)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .x_axis_label(scene.x_label.clone())
        .y_axis_label(scene.y_label.clone())
        .x_axis_formatter(tick_formatter(scene.x_scale, scene.x_reversed))
        .y_axis_formatter(tick_formatter(scene.y_scale, scene.y_reversed));
    if scene.curve_count() > 1 {
        plot = plot.legend(Legend::default());
    }
    plot = match scene.aspect {
        Aspect::Auto => plot,
        Aspect::Equal => plot.data_aspect(1.0),
        Aspect::Ratio(ratio) => plot.data_aspect(f64_to_f32(ratio)),
    };

    let response = plot.show(ui, |plot_ui| {
        if let Some(bounds) = mapping.bounds(scene) {
            plot_ui.set_plot_bounds(bounds);
        }
        let mut curve_index = 0;
        for (index, command) in scene.commands.iter().enumerate() {
            match command {
                DrawCommand::Curve {
                    label,
                    x,
                    y,
                    errors,
                    style,
                } => {
                    let color = style.color.map_or(PALETTE[curve_index % PALETTE.len()], |c| {
                        let [r, g, b] = c.rgb();
                        Color32::from_rgb(r, g, b)
                    });
                    curve_index += 1;
                    draw_curve(plot_ui, mapping, label, x, y, errors.as_ref(), *style, color);
                }
                DrawCommand::Image { extent, .. } | DrawCommand::Rgb { extent, .. } => {
                    if let Some(texture) = textures.get(index) {
                        draw_image(plot_ui, mapping, texture, extent);
                    }
                }
                DrawCommand::Mesh {
                    values,
                    x_edges,
                    y_edges,
                    norm,
                    colormap,
                } => draw_mesh(plot_ui, mapping, values, x_edges, y_edges, norm, *colormap),
                DrawCommand::Colorbar { .. } => {}
            }
        }
        plot_ui.pointer_coordinate().and_then(|p| mapping.invert(p))
    });

    PlotInteraction {
        frame: *response.transform.frame(),
        pointer: response.inner,
        response: response.response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_round_trip() {
        let mapping = Mapping {
            x: Scale::Linear,
            y: Scale::Log,
            shear: 0.0,
            x_sign: 1.0,
            y_sign: 1.0,
        };
        let [mx, my] = mapping.point(3.0, 100.0).unwrap();
        assert!((my - 2.0).abs() < 1e-12);
        let (x, y) = mapping.invert(PlotPoint::new(mx, my)).unwrap();
        assert!((x - 3.0).abs() < 1e-12);
        assert!((y - 100.0).abs() < 1e-9);
        assert!(mapping.point(1.0, -1.0).is_none());
    }

    #[test]
    fn test_shear() {
        let mapping = Mapping {
            x: Scale::Linear,
            y: Scale::Linear,
            shear: 1.0 / 60f64.to_radians().tan(),
            x_sign: 1.0,
            y_sign: 1.0,
        };
        let [mx, _] = mapping.point(0.0, 1.0).unwrap();
        assert!((mx - 1.0 / 3f64.sqrt()).abs() < 1e-12);
        let (x, y) = mapping.invert(PlotPoint::new(mx, 1.0)).unwrap();
        assert!(x.abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_x_is_negated() {
        let mapping = Mapping {
            x: Scale::Linear,
            y: Scale::Linear,
            shear: 0.0,
            x_sign: sign(true),
            y_sign: sign(false),
        };
        let [left, _] = mapping.point(9.0, 0.0).unwrap();
        let [right, _] = mapping.point(5.0, 0.0).unwrap();
        assert!(left < right);
        let (x, y) = mapping.invert(PlotPoint::new(left, 2.0)).unwrap();
        assert!((x - 9.0).abs() < 1e-12 && (y - 2.0).abs() < 1e-12);
        let label = tick_formatter(Scale::Linear, true);
        let mark = GridMark {
            value: -7.0,
            step_size: 1.0,
        };
        assert_eq!(label(mark, &(-10.0..=0.0)), "7");
    }
}

//! Colour images for image, RGB and colorbar draw commands.

use egui::{Color32, ColorImage, TextureHandle, TextureOptions};
use ndarray::{Array2, Array3};
use nxplot_view::render::{DrawCommand, Extent, Norm};
use nxplot_view::{Colormap, Interpolation};

use super::renderer::Frame;
use crate::util::{f64_to_f32, unit_to_u8};

/// Colour of one value under `norm`; values without a colour (NaN, or
/// non-positive on a log scale) are transparent.
#[must_use]
pub fn value_color(value: f64, norm: &Norm, colormap: Colormap) -> Color32 {
    let [r, g, b, a] = colormap.apply(f64_to_f32(norm.normalize(value)));
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Axes drawn with decreasing values, from [`Scene`](nxplot_view::Scene).
#[derive(Debug, Clone, Copy, Default)]
pub struct Reversed {
    /// Horizontal axis.
    pub x: bool,
    /// Vertical axis.
    pub y: bool,
}

/// Screen-order pixel rows: the top of the screen first, the left first in
/// each row.
fn pixel_index(
    extent: &Extent,
    reversed: Reversed,
    (ny, nx): (usize, usize),
    row: usize,
    col: usize,
) -> (usize, usize) {
    let j = if (extent.y.0 <= extent.y.1) != reversed.y { ny - 1 - row } else { row };
    let i = if (extent.x.0 <= extent.x.1) != reversed.x { col } else { nx - 1 - col };
    (j, i)
}

/// Colour image of a regular grid, `(ny, nx)` values.
#[must_use]
pub fn image_pixels(
    values: &Array2<f64>,
    extent: &Extent,
    reversed: Reversed,
    norm: &Norm,
    colormap: Colormap,
) -> ColorImage {
    let (ny, nx) = values.dim();
    let mut pixels = Vec::with_capacity(ny * nx);
    for row in 0..ny {
        for col in 0..nx {
            let (j, i) = pixel_index(extent, reversed, (ny, nx), row, col);
            pixels.push(value_color(values[[j, i]], norm, colormap));
        }
    }
    ColorImage {
        size: [nx, ny],
        pixels,
    }
}

/// Colour image of `(ny, nx, 3 | 4)` channels already scaled to `[0, 1]`.
#[must_use]
pub fn rgb_pixels(values: &Array3<f64>, extent: &Extent, reversed: Reversed) -> ColorImage {
    let (ny, nx, channels) = values.dim();
    let mut pixels = Vec::with_capacity(ny * nx);
    for row in 0..ny {
        for col in 0..nx {
            let (j, i) = pixel_index(extent, reversed, (ny, nx), row, col);
            let channel = |c: usize| unit_to_u8(values[[j, i, c]]);
            let alpha = if channels > 3 { channel(3) } else { 255 };
            pixels.push(Color32::from_rgba_unmultiplied(
                channel(0),
                channel(1),
                channel(2),
                alpha,
            ));
        }
    }
    ColorImage {
        size: [nx, ny],
        pixels,
    }
}

/// Vertical colour scale, top is the high end.
#[must_use]
pub fn colorbar_pixels(colormap: Colormap, height: usize) -> ColorImage {
    let height = height.max(2);
    let last = f64_to_f32(crate::util::usize_to_f64(height - 1));
    let pixels = (0..height)
        .map(|row| {
            let t = 1.0 - f64_to_f32(crate::util::usize_to_f64(row)) / last;
            let [r, g, b, a] = colormap.apply(t);
            Color32::from_rgba_unmultiplied(r, g, b, a)
        })
        .collect();
    ColorImage {
        size: [1, height],
        pixels,
    }
}

fn texture_options(interpolation: Interpolation) -> TextureOptions {
    match interpolation {
        Interpolation::Nearest => TextureOptions::NEAREST,
        Interpolation::Bilinear | Interpolation::Bicubic => TextureOptions::LINEAR,
    }
}

/// Textures of one frame, rebuilt when the frame changes.
#[derive(Default)]
pub struct TextureCache {
    generation: Option<u64>,
    textures: Vec<Option<TextureHandle>>,
}

impl TextureCache {
    /// Uploads the textures of `frame` unless they are current.
    pub fn update(&mut self, ctx: &egui::Context, name: &str, frame: &Frame) {
        if self.generation == Some(frame.generation) {
            return;
        }
        self.generation = Some(frame.generation);
        let Some(scene) = &frame.scene else {
            self.textures.clear();
            return;
        };
        let reversed = Reversed {
            x: scene.x_reversed,
            y: scene.y_reversed,
        };
        self.textures = scene
            .commands
            .iter()
            .enumerate()
            .map(|(index, command)| {
                let id = format!("{name}-{index}");
                match command {
                    DrawCommand::Image {
                        values,
                        extent,
                        norm,
                        colormap,
                        interpolation,
                    } => Some(ctx.load_texture(
                        id,
                        image_pixels(values, extent, reversed, norm, *colormap),
                        texture_options(*interpolation),
                    )),
                    DrawCommand::Rgb { values, extent } => Some(ctx.load_texture(
                        id,
                        rgb_pixels(values, extent, reversed),
                        TextureOptions::NEAREST,
                    )),
                    DrawCommand::Colorbar { colormap, .. } => Some(ctx.load_texture(
                        id,
                        colorbar_pixels(*colormap, 256),
                        TextureOptions::LINEAR,
                    )),
                    DrawCommand::Curve { .. } | DrawCommand::Mesh { .. } => None,
                })
            })
            .collect();
    }

    /// Texture of the command at `index`.
    pub fn get(&self, index: usize) -> Option<&TextureHandle> {
        self.textures.get(index).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxplot_view::zoom::Scale;

    fn norm() -> Norm {
        Norm {
            scale: Scale::Linear,
            vmin: 0.0,
            vmax: 3.0,
        }
    }

    #[test]
    fn test_image_rows_start_at_top() {
        let values = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let extent = Extent {
            x: (0.0, 2.0),
            y: (0.0, 2.0),
        };
        let image = image_pixels(&values, &extent, Reversed::default(), &norm(), Colormap::Gray);
        assert_eq!(image.size, [2, 2]);
        assert_eq!(image.pixels[0], value_color(2.0, &norm(), Colormap::Gray));
        assert_eq!(image.pixels[3], value_color(1.0, &norm(), Colormap::Gray));
    }

    #[test]
    fn test_reversed_x() {
        let values = Array2::from_shape_vec((1, 3), vec![0.0, 1.0, 2.0]).unwrap();
        let extent = Extent {
            x: (3.0, 0.0),
            y: (0.0, 1.0),
        };
        let image = image_pixels(&values, &extent, Reversed::default(), &norm(), Colormap::Gray);
        assert_eq!(image.pixels[0], value_color(2.0, &norm(), Colormap::Gray));

        // drawn right to left, the first column goes first again
        let reversed = Reversed { x: true, y: false };
        let image = image_pixels(&values, &extent, reversed, &norm(), Colormap::Gray);
        assert_eq!(image.pixels[0], value_color(0.0, &norm(), Colormap::Gray));
    }

    #[test]
    fn test_nan_is_transparent() {
        assert_eq!(value_color(f64::NAN, &norm(), Colormap::Viridis).a(), 0);
    }

    #[test]
    fn test_rgb_alpha() {
        let values = Array3::from_shape_vec((1, 1, 3), vec![1.0, 0.0, 0.5]).unwrap();
        let extent = Extent {
            x: (0.0, 1.0),
            y: (0.0, 1.0),
        };
        let image = rgb_pixels(&values, &extent, Reversed::default());
        assert_eq!(image.pixels[0], Color32::from_rgb(255, 0, 128));
    }

    #[test]
    fn test_colorbar_runs_top_down() {
        let bar = colorbar_pixels(Colormap::Gray, 16);
        assert_eq!(bar.size, [1, 16]);
        let top = bar.pixels[0];
        let bottom = bar.pixels[15];
        assert!(top.r() > bottom.r());
    }
}

//! Light and dark styling, following the system preference.

use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

/// Colours of one theme.
#[derive(Clone, Copy)]
pub struct Palette {
    pub bg: Color32,
    pub panel: Color32,
    pub header: Color32,
    pub input: Color32,
    pub border: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub hover: Color32,
}

pub const DARK: Palette = Palette {
    bg: Color32::from_rgb(0x1a, 0x1a, 0x1a),
    panel: Color32::from_rgb(0x1f, 0x1f, 0x1f),
    header: Color32::from_rgb(0x25, 0x25, 0x25),
    input: Color32::from_rgb(0x2a, 0x2a, 0x2a),
    border: Color32::from_rgb(0x44, 0x44, 0x44),
    text: Color32::from_rgb(0xe0, 0xe0, 0xe0),
    text_muted: Color32::from_rgb(0x88, 0x88, 0x88),
    hover: Color32::from_rgb(0x3a, 0x3a, 0x3a),
};

pub const LIGHT: Palette = Palette {
    bg: Color32::from_rgb(0xf5, 0xf5, 0xf5),
    panel: Color32::from_rgb(0xff, 0xff, 0xff),
    header: Color32::from_rgb(0xfa, 0xfa, 0xfa),
    input: Color32::from_rgb(0xf0, 0xf0, 0xf0),
    border: Color32::from_rgb(0xc0, 0xc0, 0xc0),
    text: Color32::from_rgb(0x1a, 0x1a, 0x1a),
    text_muted: Color32::from_rgb(0x66, 0x66, 0x66),
    hover: Color32::from_rgb(0xdd, 0xdd, 0xdd),
};

/// Shared accent colours.
pub mod accent {
    use eframe::egui::Color32;

    pub const BLUE: Color32 = Color32::from_rgb(0x4a, 0x9e, 0xff);
    pub const GREEN: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
    pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
}

impl Palette {
    /// Palette of the current theme.
    pub fn from_ctx(ctx: &egui::Context) -> Self {
        if ctx.style().visuals.dark_mode {
            DARK
        } else {
            LIGHT
        }
    }
}

fn build_visuals(dark: bool) -> Visuals {
    let (mut visuals, palette) = if dark {
        (Visuals::dark(), DARK)
    } else {
        (Visuals::light(), LIGHT)
    };
    visuals.window_fill = palette.panel;
    visuals.panel_fill = palette.panel;
    visuals.faint_bg_color = palette.bg;
    visuals.extreme_bg_color = palette.input;

    let rounding = Rounding::same(4.0);
    let widgets = &mut visuals.widgets;
    for (style, fill, text) in [
        (&mut widgets.noninteractive, palette.input, palette.text_muted),
        (&mut widgets.inactive, palette.input, palette.text),
        (&mut widgets.open, palette.input, palette.text),
        (&mut widgets.hovered, palette.hover, palette.text),
    ] {
        style.bg_fill = fill;
        style.weak_bg_fill = fill;
        style.fg_stroke = Stroke::new(1.0, text);
        style.bg_stroke = Stroke::new(1.0, palette.border);
        style.rounding = rounding;
    }
    widgets.hovered.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.active.bg_fill = accent::BLUE;
    widgets.active.weak_bg_fill = accent::BLUE;
    widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    widgets.active.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.active.rounding = rounding;

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(if dark { 0.3 } else { 0.2 });
    visuals.selection.stroke = Stroke::new(1.0, accent::BLUE);
    visuals
}

/// Applies colours for the current theme plus fonts and spacing.
pub fn configure_style(ctx: &egui::Context) {
    let dark = ctx.style().visuals.dark_mode;
    ctx.set_visuals(build_visuals(dark));

    let mut style = (*ctx.style()).clone();
    style.text_styles = [
        (TextStyle::Small, FontId::new(10.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.indent = 14.0;
    ctx.set_style(style);
}

/// Button for the main action of a section.
pub fn primary_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::GREEN)
        .rounding(Rounding::same(4.0))
}

/// Section header label.
pub fn section_header(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(11.0).strong()
}

/// Small form label.
pub fn form_label(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0).weak()
}

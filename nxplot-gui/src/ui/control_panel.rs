//! Control panel (left sidebar) and top bar rendering.

use eframe::egui::{self, FontFamily, FontId};
use nxplot_view::controls::SLIDER_STEPS;
use nxplot_view::{
    Aspect, Colormap, ControlEvent, ControlId, ControlMessage, DisplayAxis,
    Interpolation, ViewState,
};
use rfd::FileDialog;

use super::theme::{accent, form_label, primary_button, section_header, Palette};
use crate::app::NxPlotApp;
use crate::state::{AxisRow, ViewControls, ZRow};

/// Source id of the option widgets, which have no state of their own.
const OPTIONS_ID: ControlId = ControlId(50);

const NEXUS_EXTENSIONS: [&str; 6] = ["nxs", "nx5", "nxspe", "h5", "hdf", "hdf5"];

fn message(event: ControlEvent) -> ControlMessage {
    ControlMessage {
        source: OPTIONS_ID,
        event,
    }
}

impl NxPlotApp {
    /// Render the top bar with the open button and the status line.
    pub(crate) fn render_top_panel(&mut self, ctx: &egui::Context) {
        let palette = Palette::from_ctx(ctx);
        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::none()
                    .fill(palette.header)
                    .inner_margin(egui::Margin::symmetric(12.0, 6.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("NXPLOT")
                            .size(14.0)
                            .strong()
                            .color(accent::BLUE),
                    );
                    ui.separator();
                    let enabled = !self.processing.is_loading;
                    if ui.add_enabled(enabled, egui::Button::new("Open…")).clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("NeXus", &NEXUS_EXTENSIONS)
                            .pick_file()
                        {
                            self.open_file(path);
                        }
                    }
                    if self.processing.is_loading {
                        ui.spinner();
                    }
                    let color = if self.processing.status_text.starts_with("Error") {
                        accent::RED
                    } else {
                        palette.text_muted
                    };
                    ui.label(
                        egui::RichText::new(&self.processing.status_text)
                            .font(FontId::new(12.0, FontFamily::Monospace))
                            .color(color),
                    );
                });
            });
    }

    /// Render the left panel: file groups, then the controls of the active
    /// window.
    pub(crate) fn render_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_file_section(ui);
                    ui.separator();
                    let Some(label) = self.registry.active_label().map(str::to_string) else {
                        ui.label(form_label("No plot"));
                        return;
                    };
                    let requests = self.render_view_section(ui, &label);
                    self.apply(&label, requests.messages);
                    if let Some(dim) = requests.active_z {
                        self.with_view(&label, |view| view.set_active_z(dim));
                    }
                    if requests.open_panel {
                        self.open_projection_panel(&label);
                    }
                });
            });
    }

    fn render_file_section(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Data"));
        let Some(path) = &self.file.path else {
            ui.label(form_label("Open a NeXus file to list its NXdata groups"));
            return;
        };
        ui.label(form_label(&path.file_name().unwrap_or_default().to_string_lossy()))
            .on_hover_text(path.display().to_string());

        egui::ScrollArea::vertical()
            .id_salt("groups")
            .max_height(160.0)
            .show(ui, |ui| {
                let mut load = false;
                for (index, info) in self.file.groups.iter().enumerate() {
                    let selected = self.file.selected == Some(index);
                    let response = ui
                        .add_enabled(
                            info.signal.is_some(),
                            egui::SelectableLabel::new(selected, &info.path),
                        )
                        .on_hover_text(info.to_string());
                    if response.clicked() {
                        self.file.selected = Some(index);
                    }
                    if response.double_clicked() {
                        self.file.selected = Some(index);
                        load = true;
                    }
                }
                if load {
                    self.load_selected();
                }
            });

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.file.over, "Plot over");
            let ready = self.file.selected.is_some() && !self.processing.is_loading;
            if ui.add_enabled(ready, primary_button("Plot")).clicked() {
                self.load_selected();
            }
        });
    }

    fn render_view_section(&self, ui: &mut egui::Ui, label: &str) -> PanelRequests {
        let mut requests = PanelRequests::default();
        let (Some(view), Some(window)) = (self.registry.get(label), self.windows.get(label)) else {
            return requests;
        };
        ui.label(section_header(label));
        let Some(state) = view.state() else {
            ui.label(form_label("Empty"));
            return requests;
        };
        ui.label(egui::RichText::new(state.title()).strong());

        let mut controls = window.controls.borrow_mut();
        render_axis_rows(ui, state, &mut controls, &mut requests);
        if !state.is_1d() {
            ui.separator();
            render_display_axes(ui, state, &mut requests.messages);
            if !state.is_rgb() {
                render_image_options(ui, state, &mut controls, &mut requests.messages);
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            if !state.z_dims().is_empty() {
                let mut summed = state.summed();
                if ui.checkbox(&mut summed, "Sum z range").changed() {
                    requests.messages.push(message(ControlEvent::Summed(summed)));
                }
            }
            if !state.is_1d() && ui.button("Projection…").clicked() {
                requests.open_panel = true;
            }
        });
        requests
    }
}

/// What the view section asked for this frame.
#[derive(Default)]
struct PanelRequests {
    messages: Vec<ControlMessage>,
    active_z: Option<usize>,
    open_panel: bool,
}

fn render_axis_rows(
    ui: &mut egui::Ui,
    state: &ViewState,
    controls: &mut ViewControls,
    requests: &mut PanelRequests,
) {
    let messages = &mut requests.messages;
    let signal_name = if state.is_1d() { "y" } else { "signal" };
    egui::Grid::new("axis_rows")
        .num_columns(4)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            if let Some(row) = controls.signal.as_mut() {
                axis_row(ui, signal_name, row, messages, false);
            }
            if let Some(row) = controls.x.as_mut() {
                axis_row(ui, "x", row, messages, false);
            }
            if let Some(row) = controls.y.as_mut() {
                axis_row(ui, "y", row, messages, false);
            }
            for row in &mut controls.z {
                let name = state
                    .axis(row.axis.control.axis())
                    .map(|axis| format!("z: {}", axis.name()))
                    .unwrap_or_else(|_| "z".to_string());
                axis_row(ui, &name, &mut row.axis, messages, true);
            }
        });

    for row in &mut controls.z {
        if z_stepper(ui, state, row, messages) {
            requests.active_z = Some(row.spin.dim());
        }
    }
}

fn axis_row(
    ui: &mut egui::Ui,
    name: &str,
    row: &mut AxisRow,
    messages: &mut Vec<ControlMessage>,
    z: bool,
) {
    ui.label(form_label(name));
    let lo = ui.add_enabled(
        row.control.lo_enabled(),
        egui::TextEdit::singleline(&mut row.lo).desired_width(72.0),
    );
    if lo.lost_focus() && row.lo != row.control.lo_text() {
        messages.extend(row.commit_lo());
    }
    let hi = ui.add(egui::TextEdit::singleline(&mut row.hi).desired_width(72.0));
    if hi.lost_focus() && row.hi != row.control.hi_text() {
        messages.extend(row.commit_hi());
    }
    ui.horizontal(|ui| {
        if z {
            let mut locked = row.control.locked();
            if ui.checkbox(&mut locked, "lock").changed() {
                messages.extend(row.control.toggle_lock(locked));
            }
        } else {
            let mut log = row.control.log();
            if ui.checkbox(&mut log, "log").changed() {
                messages.extend(row.control.toggle_log(log));
            }
        }
    });
    ui.end_row();

    ui.label("");
    let mut position = row.control.slider();
    let slider = egui::Slider::new(&mut position, 0..=SLIDER_STEPS).show_value(false);
    if ui.add(slider).changed() {
        messages.extend(row.slide(position));
    }
    ui.end_row();
}

/// Slice stepper of one z dimension; returns whether it was picked as the
/// slideshow axis.
fn z_stepper(
    ui: &mut egui::Ui,
    state: &ViewState,
    row: &mut ZRow,
    messages: &mut Vec<ControlMessage>,
) -> bool {
    let dim = row.spin.dim();
    let active = state.active_z() == Some(dim);
    ui.horizontal(|ui| {
        let picked = ui
            .selectable_label(active, form_label(&format!("z{dim} slice")))
            .on_hover_text("Axis stepped by the play buttons")
            .clicked()
            && !active;
        if ui.small_button("◀").clicked() {
            messages.extend(row.spin.step_by(-1));
        }
        ui.label(format!("{} / {}", row.spin.index(), row.spin.len().saturating_sub(1)));
        if ui.small_button("▶").clicked() {
            messages.extend(row.spin.step_by(1));
        }
        if row.spin.paused() {
            ui.label(form_label("end"));
        }
        picked
    })
    .inner
}

fn dim_names(state: &ViewState) -> Vec<(usize, String)> {
    state
        .axes()
        .iter()
        .map(|(&dim, axis)| (dim, format!("{dim}: {}", axis.name())))
        .collect()
}

fn render_display_axes(ui: &mut egui::Ui, state: &ViewState, messages: &mut Vec<ControlMessage>) {
    let dims = dim_names(state);
    ui.horizontal(|ui| {
        for (which, current, id) in [
            (DisplayAxis::X, state.x(), "x_dim"),
            (DisplayAxis::Y, state.y(), "y_dim"),
        ] {
            let selected = current.dim();
            let text = dims
                .iter()
                .find(|(dim, _)| Some(*dim) == selected)
                .map_or("-", |(_, name)| name.as_str());
            ui.label(form_label(if which == DisplayAxis::X { "x" } else { "y" }));
            egui::ComboBox::from_id_salt(id)
                .selected_text(text)
                .show_ui(ui, |ui| {
                    for (dim, name) in &dims {
                        if ui.selectable_label(Some(*dim) == selected, name).clicked()
                            && Some(*dim) != selected
                        {
                            messages.push(message(ControlEvent::ChangeAxis { which, dim: *dim }));
                        }
                    }
                });
        }
    });
}

fn render_image_options(
    ui: &mut egui::Ui,
    state: &ViewState,
    controls: &mut ViewControls,
    messages: &mut Vec<ControlMessage>,
) {
    egui::Grid::new("image_options")
        .num_columns(2)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            ui.label(form_label("colormap"));
            let current = state.colormap();
            egui::ComboBox::from_id_salt("colormap")
                .selected_text(current.name())
                .show_ui(ui, |ui| {
                    for colormap in Colormap::ALL {
                        if ui.selectable_label(colormap == current, colormap.name()).clicked()
                            && colormap != current
                        {
                            messages.push(message(ControlEvent::Colormap(colormap)));
                        }
                    }
                });
            ui.end_row();

            ui.label(form_label("interpolation"));
            let current = state.interpolation();
            egui::ComboBox::from_id_salt("interpolation")
                .selected_text(current.name())
                .show_ui(ui, |ui| {
                    for interpolation in Interpolation::ALL {
                        if ui
                            .selectable_label(interpolation == current, interpolation.name())
                            .clicked()
                            && interpolation != current
                        {
                            messages.push(message(ControlEvent::Interpolation(interpolation)));
                        }
                    }
                });
            ui.end_row();

            ui.label(form_label("aspect"));
            let mut equal = state.aspect() == Aspect::Equal;
            if ui.checkbox(&mut equal, "equal").changed() {
                let aspect = if equal { Aspect::Equal } else { Aspect::Auto };
                messages.push(message(ControlEvent::Aspect(aspect)));
            }
            ui.end_row();

            ui.label(form_label("skew"));
            let skew = ui.add(
                egui::TextEdit::singleline(&mut controls.skew)
                    .hint_text("90")
                    .desired_width(72.0),
            );
            if skew.lost_focus() {
                let text = controls.skew.trim();
                let angle = if text.is_empty() { Some(None) } else { text.parse().ok().map(Some) };
                match angle {
                    Some(angle) if angle != state.skew() => {
                        messages.push(message(ControlEvent::Skew(angle)));
                    }
                    _ => {
                        controls.skew = state.skew().map(|a| format!("{a}")).unwrap_or_default();
                    }
                }
            }
            ui.end_row();

            ui.label(form_label("autoscale"));
            let mut autoscale = state.autoscale();
            if ui.checkbox(&mut autoscale, "intensity").changed() {
                messages.push(message(ControlEvent::Autoscale(autoscale)));
            }
            ui.end_row();
        });
}

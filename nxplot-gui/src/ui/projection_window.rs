//! Floating window for the projection panel of one plot window.

use eframe::egui;
use nxplot_view::{PlotView, ProjectionPanel};

use super::theme::{form_label, primary_button};
use crate::app::NxPlotApp;

/// Edits made in the projection window this frame.
enum PanelEdit {
    X(usize),
    Y(Option<usize>),
    Limits(usize, f64, f64),
    Summed(bool),
    Plot { over: bool },
    Close,
}

impl NxPlotApp {
    /// Opens the projection panel of `label` and shows it.
    pub(crate) fn open_projection_panel(&mut self, label: &str) {
        if self.with_view(label, |view| view.open_panel().map(|_| ())).is_some() {
            self.panel_owner = Some(label.to_string());
            self.sync_projection_form(label);
        }
    }

    /// Copies the panel limits of `label` into its text fields.
    pub(crate) fn sync_projection_form(&mut self, label: &str) {
        let (Some(view), Some(window)) = (self.registry.get(label), self.windows.get_mut(label))
        else {
            return;
        };
        if let (Some(panel), Some(state)) = (view.panel(), view.state()) {
            window.projection.sync(panel, state.axes().keys().copied());
        }
    }

    /// Render the projection window, if a panel is open.
    pub(crate) fn render_projection_window(&mut self, ctx: &egui::Context) {
        let Some(owner) = self.panel_owner.clone() else {
            return;
        };
        let mut edits = Vec::new();
        let mut open = true;
        egui::Window::new(format!("Projection: {owner}"))
            .open(&mut open)
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| self.render_projection_form(ui, &owner, &mut edits));
        if !open {
            edits.push(PanelEdit::Close);
        }
        for edit in edits {
            self.handle_panel_edit(&owner, edit);
        }
    }

    fn render_projection_form(
        &mut self,
        ui: &mut egui::Ui,
        owner: &str,
        edits: &mut Vec<PanelEdit>,
    ) {
        let (Some(view), Some(window)) = (self.registry.get(owner), self.windows.get_mut(owner))
        else {
            edits.push(PanelEdit::Close);
            return;
        };
        let (Some(panel), Some(state)) = (view.panel(), view.state()) else {
            edits.push(PanelEdit::Close);
            return;
        };
        let names: Vec<(usize, String)> = state
            .axes()
            .iter()
            .map(|(&dim, axis)| (dim, axis.name().to_string()))
            .collect();
        let name_of = |dim: Option<usize>| {
            names
                .iter()
                .find(|(d, _)| Some(*d) == dim)
                .map_or_else(|| "None".to_string(), |(_, name)| name.clone())
        };

        egui::Grid::new("projection_axes")
            .num_columns(2)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                ui.label(form_label("x"));
                egui::ComboBox::from_id_salt("projection_x")
                    .selected_text(name_of(Some(panel.x())))
                    .show_ui(ui, |ui| {
                        for (dim, name) in &names {
                            if ui.selectable_label(panel.x() == *dim, name).clicked() {
                                edits.push(PanelEdit::X(*dim));
                            }
                        }
                    });
                ui.end_row();

                ui.label(form_label("y"));
                egui::ComboBox::from_id_salt("projection_y")
                    .selected_text(name_of(panel.y()))
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(panel.y().is_none(), "None").clicked() {
                            edits.push(PanelEdit::Y(None));
                        }
                        for (dim, name) in &names {
                            if ui.selectable_label(panel.y() == Some(*dim), name).clicked() {
                                edits.push(PanelEdit::Y(Some(*dim)));
                            }
                        }
                    });
                ui.end_row();
            });

        ui.separator();
        egui::Grid::new("projection_limits")
            .num_columns(3)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                for (dim, lo, hi) in &mut window.projection.limits {
                    ui.label(form_label(&name_of(Some(*dim))));
                    let lo_response = ui.add(egui::TextEdit::singleline(lo).desired_width(80.0));
                    let hi_response = ui.add(egui::TextEdit::singleline(hi).desired_width(80.0));
                    if lo_response.lost_focus() || hi_response.lost_focus() {
                        match (lo.trim().parse::<f64>(), hi.trim().parse::<f64>()) {
                            (Ok(lo), Ok(hi)) if lo.is_finite() && hi.is_finite() => {
                                edits.push(PanelEdit::Limits(*dim, lo, hi));
                            }
                            _ => {
                                if let Some((old_lo, old_hi)) = panel.limits(*dim) {
                                    *lo = old_lo.to_string();
                                    *hi = old_hi.to_string();
                                }
                            }
                        }
                    }
                    ui.end_row();
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let mut summed = panel.summed();
            if ui.checkbox(&mut summed, "Sum").changed() {
                edits.push(PanelEdit::Summed(summed));
            }
            if ui.add(primary_button("Plot")).clicked() {
                edits.push(PanelEdit::Plot { over: false });
            }
            let one_d = panel.y().is_none();
            if ui.add_enabled(one_d, egui::Button::new("Overplot")).clicked() {
                edits.push(PanelEdit::Plot { over: true });
            }
        });
    }

    fn edit_panel(&mut self, owner: &str, change: impl FnOnce(&mut ProjectionPanel)) {
        if let Some(panel) = self.registry.get_mut(owner).and_then(PlotView::panel_mut) {
            change(panel);
        }
    }

    fn handle_panel_edit(&mut self, owner: &str, edit: PanelEdit) {
        match edit {
            PanelEdit::X(dim) => self.edit_panel(owner, |panel| panel.set_x(dim)),
            PanelEdit::Y(dim) => self.edit_panel(owner, |panel| panel.set_y(dim)),
            PanelEdit::Limits(dim, lo, hi) => {
                self.edit_panel(owner, |panel| panel.set_limits(dim, lo, hi));
                self.sync_projection_form(owner);
            }
            PanelEdit::Summed(summed) => self.edit_panel(owner, |panel| panel.set_summed(summed)),
            PanelEdit::Plot { over } => self.plot_projection(owner, over),
            PanelEdit::Close => {
                if let Some(view) = self.registry.get_mut(owner) {
                    view.close_panel();
                }
                self.panel_owner = None;
            }
        }
    }
}

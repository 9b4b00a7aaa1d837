//! Main view (central panel): window tabs, navigation bar and the plot.

use eframe::egui::{self, PointerButton, Stroke};
use nxplot_view::{format_value, Direction, MouseButton, ScreenPoint, ScreenRect, ZoomBox};

use super::theme::{accent, form_label};
use crate::app::NxPlotApp;
use crate::state::DragState;
use crate::viewer::draw_scene;

/// Requests from the central panel, handled once drawing is done.
enum ViewAction {
    Activate(String),
    Close(String),
    Home,
    Back,
    Forward,
    Play(Direction),
    Stop,
    Zoom(ZoomBox, ScreenRect),
}

fn screen_point(pos: egui::Pos2) -> ScreenPoint {
    ScreenPoint::new(f64::from(pos.x), f64::from(pos.y))
}

fn screen_rect(rect: egui::Rect) -> ScreenRect {
    ScreenRect::new(screen_point(rect.min), screen_point(rect.max))
}

impl NxPlotApp {
    /// Render the central panel with the active window.
    pub(crate) fn render_central_panel(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_tabs(ui, &mut actions);
            let Some(label) = self.registry.active_label().map(str::to_string) else {
                ui.centered_and_justified(|ui| ui.label("No Data"));
                return;
            };
            self.render_navigation(ui, &label, &mut actions);
            self.render_plot(ui, &label, &mut actions);
        });
        for action in actions {
            self.handle_view_action(action);
        }
    }

    fn render_tabs(&self, ui: &mut egui::Ui, actions: &mut Vec<ViewAction>) {
        let active = self.registry.active_label();
        ui.horizontal(|ui| {
            for label in self.registry.labels() {
                if ui.selectable_label(active == Some(label), label).clicked() {
                    actions.push(ViewAction::Activate(label.to_string()));
                }
                if ui.small_button("×").on_hover_text("Close").clicked() {
                    actions.push(ViewAction::Close(label.to_string()));
                }
                ui.add_space(6.0);
            }
        });
        ui.separator();
    }

    fn render_navigation(&self, ui: &mut egui::Ui, label: &str, actions: &mut Vec<ViewAction>) {
        let Some(view) = self.registry.get(label) else {
            return;
        };
        let history = view.history();
        let has_z = view.state().and_then(|state| state.active_z()).is_some();
        ui.horizontal(|ui| {
            if ui.button("⌂").on_hover_text("Home").clicked() {
                actions.push(ViewAction::Home);
            }
            if ui.button("←").on_hover_text("Back").clicked() {
                actions.push(ViewAction::Back);
            }
            if ui.button("→").on_hover_text("Forward").clicked() {
                actions.push(ViewAction::Forward);
            }
            ui.label(form_label(&format!("{} zoom(s)", history.len().saturating_sub(1))));
            if has_z {
                ui.separator();
                let slideshow = view.slideshow();
                if ui.button("⏪").on_hover_text("Play backward").clicked() {
                    actions.push(ViewAction::Play(Direction::Backward));
                }
                if ui.add_enabled(slideshow.is_playing(), egui::Button::new("⏹")).clicked() {
                    actions.push(ViewAction::Stop);
                }
                if ui.button("⏩").on_hover_text("Play forward").clicked() {
                    actions.push(ViewAction::Play(Direction::Forward));
                }
                if let Some(interval) = slideshow.interval() {
                    ui.label(form_label(&format!("{} ms", interval.as_millis())));
                }
            }
            if let Some((x, y)) = self.cursor {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.monospace(format!("x={}  y={}", format_value(x), format_value(y)));
                });
            }
        });
    }

    fn render_plot(&mut self, ui: &mut egui::Ui, label: &str, actions: &mut Vec<ViewAction>) {
        let Some(window) = self.windows.get_mut(label) else {
            return;
        };
        let frame = window.frame.borrow();
        window.textures.update(ui.ctx(), label, &frame);
        let Some(scene) = &frame.scene else {
            ui.centered_and_justified(|ui| ui.label("Empty"));
            return;
        };
        let interaction = draw_scene(ui, label, scene, &window.textures);
        self.cursor = interaction.pointer;

        let response = &interaction.response;
        let pointer = response.interact_pointer_pos().or(response.hover_pos());
        if response.drag_started() {
            let button = if response.dragged_by(PointerButton::Secondary) {
                MouseButton::Right
            } else {
                MouseButton::Left
            };
            if let Some(pos) = pointer {
                window.drag = Some(DragState {
                    start: pos,
                    current: pos,
                    button,
                });
            }
        }
        if let (Some(drag), Some(pos)) = (window.drag.as_mut(), pointer) {
            drag.current = pos;
        }
        if let Some(drag) = window.drag {
            let color = match drag.button {
                MouseButton::Left => accent::BLUE,
                MouseButton::Right => accent::GREEN,
            };
            ui.painter().rect_stroke(
                egui::Rect::from_two_pos(drag.start, drag.current),
                0.0,
                Stroke::new(1.0, color),
            );
        }
        if response.drag_stopped() {
            if let Some(drag) = window.drag.take() {
                let zoom = ZoomBox::new(
                    screen_point(drag.start),
                    screen_point(drag.current),
                    drag.button,
                );
                actions.push(ViewAction::Zoom(zoom, screen_rect(interaction.frame)));
            }
        }
    }

    fn handle_view_action(&mut self, action: ViewAction) {
        let Some(label) = self.registry.active_label().map(str::to_string) else {
            return;
        };
        match action {
            ViewAction::Activate(target) => {
                self.registry.set_active(&target);
            }
            ViewAction::Close(target) => self.close_window(&target),
            ViewAction::Home => {
                self.with_view(&label, nxplot_view::PlotView::home);
            }
            ViewAction::Back => {
                self.with_view(&label, nxplot_view::PlotView::back);
            }
            ViewAction::Forward => {
                self.with_view(&label, nxplot_view::PlotView::forward);
            }
            ViewAction::Play(direction) => {
                self.with_view(&label, |view| view.press_play(direction));
            }
            ViewAction::Stop => {
                self.with_view(&label, |view| {
                    view.stop_play();
                    Ok(())
                });
            }
            ViewAction::Zoom(zoom, screen) => {
                let zoomed = self.with_view(&label, |view| {
                    let transform = view.transform(screen)?;
                    view.zoom_box(zoom, &transform)
                });
                if zoomed == Some(true) && zoom.button == MouseButton::Right {
                    self.sync_projection_form(&label);
                }
            }
        }
    }
}

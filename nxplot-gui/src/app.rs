//! Main application state and logic.
//!
//! Contains the `NxPlotApp` struct which owns the plot windows, the open
//! file and the message handling.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use eframe::egui;
use log::{debug, info};
use nxplot_core::NxData;
use nxplot_view::{ControlId, ControlMessage, PlotConfig, PlotOptions, PlotView, PlotViewRegistry};

use crate::message::AppMessage;
use crate::pipeline::{list_groups_worker, load_group_worker};
use crate::state::{FileState, ProcessingState, WindowState};

/// Main application state.
pub struct NxPlotApp {
    /// Plot windows by label.
    pub(crate) registry: PlotViewRegistry,
    /// UI state beside each window, same labels as the registry.
    pub(crate) windows: HashMap<String, WindowState>,
    /// Settings handed to new windows.
    pub(crate) config: PlotConfig,
    /// Open file and its groups.
    pub(crate) file: FileState,
    /// Window whose projection panel is shown.
    pub(crate) panel_owner: Option<String>,
    /// Window that receives projections.
    pub(crate) projection_target: Option<String>,
    /// Data coordinates under the pointer.
    pub(crate) cursor: Option<(f64, f64)>,

    /// Message receiver for async operations.
    pub(crate) rx: Receiver<AppMessage>,
    /// Message sender for async operations.
    pub(crate) tx: Sender<AppMessage>,
    /// Background read state.
    pub(crate) processing: ProcessingState,
}

impl NxPlotApp {
    /// Creates an application with no windows.
    pub fn new(config: PlotConfig) -> Self {
        let (tx, rx) = channel();
        Self {
            registry: PlotViewRegistry::new(),
            windows: HashMap::new(),
            config,
            file: FileState::default(),
            panel_owner: None,
            projection_target: None,
            cursor: None,
            rx,
            tx,
            processing: ProcessingState::default(),
        }
    }

    /// Lists the groups of `path` in the background.
    pub fn open_file(&mut self, path: PathBuf) {
        self.processing.start(format!("Reading {}...", path.display()));
        self.file = FileState {
            over: self.file.over,
            ..FileState::default()
        };
        let tx = self.tx.clone();
        thread::spawn(move || list_groups_worker(&path, &tx));
    }

    /// Reads the selected group in the background.
    pub fn load_selected(&mut self) {
        let (Some(path), Some(info)) = (
            self.file.path.clone(),
            self.file.selected.and_then(|i| self.file.groups.get(i)),
        ) else {
            return;
        };
        let group = info.path.clone();
        self.processing.start(format!("Loading {group}..."));
        let tx = self.tx.clone();
        thread::spawn(move || load_group_worker(&path, &group, &tx));
    }

    /// Opens an empty window and makes it active.
    pub fn new_window(&mut self) -> String {
        let label = self.registry.next_label();
        let (state, renderer) = WindowState::new();
        let mut view = PlotView::new(label.clone(), self.config.clone(), renderer);
        state.attach(&mut view);
        self.registry.insert(view);
        self.windows.insert(label.clone(), state);
        label
    }

    /// Closes a window; closing twice does nothing.
    pub fn close_window(&mut self, label: &str) {
        if self.registry.close(label) {
            info!("Closed window {label}");
        }
        self.windows.remove(label);
        if self.panel_owner.as_deref() == Some(label) {
            self.panel_owner = None;
        }
        if self.projection_target.as_deref() == Some(label) {
            self.projection_target = None;
        }
    }

    /// Plots `data` into window `label`, or the active window, or a new one.
    pub fn plot_into(&mut self, label: Option<&str>, data: Arc<NxData>, over: bool) -> Option<String> {
        let label = match label.or(self.registry.active_label()) {
            Some(label) => label.to_string(),
            None => self.new_window(),
        };
        let options = if over {
            PlotOptions::overlay()
        } else {
            PlotOptions::default()
        };
        let view = self.registry.get_mut(&label)?;
        let result = view.plot(data, &options);
        self.report(result)?;
        self.registry.set_active(&label);
        Some(label)
    }

    /// Applies control messages to window `label`.
    pub fn apply(&mut self, label: &str, messages: Vec<ControlMessage>) {
        for message in messages {
            debug!("{label}: {:?}", message.event);
            let Some(view) = self.registry.get_mut(label) else {
                return;
            };
            let source = message.source;
            let result = view.apply(message);
            if self.report(result) == Some(false) {
                self.resync_refused(label, source);
            }
        }
    }

    /// Puts the control whose step the view refused back on the view's slice.
    fn resync_refused(&mut self, label: &str, source: ControlId) {
        let (Some(state), Some(window)) = (
            self.registry.get(label).and_then(PlotView::state),
            self.windows.get(label),
        ) else {
            return;
        };
        window.controls.borrow_mut().refuse(source, state);
    }

    /// Runs an action on window `label` and reports its error, if any.
    pub fn with_view<T>(
        &mut self,
        label: &str,
        action: impl FnOnce(&mut PlotView) -> nxplot_view::Result<T>,
    ) -> Option<T> {
        let view = self.registry.get_mut(label)?;
        let result = action(view);
        self.report(result)
    }

    /// Shows an error in the status line.
    pub fn report<T>(&mut self, result: nxplot_view::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.processing.status_text = format!("Error: {e}");
                None
            }
        }
    }

    /// Projects through the panel of `owner` into the projection window.
    pub fn plot_projection(&mut self, owner: &str, over: bool) {
        let Some(data) = self.with_view(owner, |view| view.project()) else {
            return;
        };
        let target = self
            .projection_target
            .clone()
            .filter(|label| self.registry.get(label).is_some());
        let target = match target {
            Some(label) => label,
            None => self.new_window(),
        };
        if let Some(label) = self.plot_into(Some(&target), data.shared(), over) {
            self.projection_target = Some(label);
        }
    }

    /// Advances the slideshow of the active window.
    fn tick_slideshow(&mut self, ctx: &egui::Context) {
        let Some(label) = self.registry.active_label().map(str::to_string) else {
            return;
        };
        let Some(interval) = self
            .registry
            .get(&label)
            .and_then(|view| view.slideshow().interval())
        else {
            if let Some(window) = self.windows.get_mut(&label) {
                window.last_tick = None;
            }
            return;
        };
        let now = Instant::now();
        let elapsed = self
            .windows
            .get_mut(&label)
            .and_then(|window| window.last_tick.replace(now))
            .map(|last| now - last);
        if let Some(elapsed) = elapsed {
            self.with_view(&label, |view| view.tick(elapsed));
        }
        ctx.request_repaint_after(interval);
    }

    /// Handle pending messages from async workers.
    pub fn handle_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::GroupsListed(path, groups) => {
                    self.processing.finish(format!(
                        "{}: {} NXdata group(s)",
                        path.display(),
                        groups.len()
                    ));
                    self.file.selected = groups.iter().position(|g| g.signal.is_some());
                    self.file.groups = groups;
                    self.file.path = Some(path);
                }
                AppMessage::GroupLoaded {
                    path,
                    group,
                    data,
                    elapsed,
                } => {
                    self.processing.finish(format!(
                        "Loaded {group} from {} in {:.0} ms",
                        path.file_name().unwrap_or_default().to_string_lossy(),
                        elapsed.as_secs_f64() * 1000.0
                    ));
                    let over = self.file.over;
                    self.plot_into(None, data, over);
                }
                AppMessage::LoadError(e) => {
                    self.processing.finish(format!("Error: {e}"));
                }
            }
        }
    }
}

impl eframe::App for NxPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_messages();
        self.render_top_panel(ctx);
        self.render_side_panel(ctx);
        self.render_central_panel(ctx);
        self.render_projection_window(ctx);
        self.tick_slideshow(ctx);

        if self.processing.is_loading {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxplot_core::NxField;

    fn line() -> Arc<NxData> {
        NxData::new(NxField::from_vec("y", vec![1.0, 4.0, 9.0]))
            .with_axes(vec![NxField::from_vec("x", vec![1.0, 2.0, 3.0])])
            .shared()
    }

    #[test]
    fn test_plot_opens_window() {
        let mut app = NxPlotApp::new(PlotConfig::default());
        let label = app.plot_into(None, line(), false).unwrap();
        assert_eq!(label, "Figure 1");
        assert!(app.windows[&label].frame.borrow().scene.is_some());
        assert!(app.windows[&label].controls.borrow().signal.is_some());

        app.plot_into(None, line(), true).unwrap();
        assert_eq!(app.registry.len(), 1);
        assert_eq!(
            app.windows[&label].frame.borrow().scene.as_ref().unwrap().curve_count(),
            2
        );
    }

    #[test]
    fn test_close_window_twice() {
        let mut app = NxPlotApp::new(PlotConfig::default());
        let label = app.new_window();
        app.close_window(&label);
        app.close_window(&label);
        assert!(app.registry.is_empty());
        assert!(app.windows.is_empty());
    }

    #[test]
    fn test_projection_goes_to_one_window() {
        let mut app = NxPlotApp::new(PlotConfig::default());
        let values = NxField::from_vec("v", (0..12).map(f64::from).collect())
            .values
            .into_shape_with_order(vec![3, 4])
            .unwrap();
        let source = app
            .plot_into(None, NxData::new(NxField::new("counts", values)).shared(), false)
            .unwrap();
        app.with_view(&source, |view| view.open_panel().map(|panel| panel.set_y(None)))
            .unwrap();
        app.plot_projection(&source, false);
        app.plot_projection(&source, true);
        assert_eq!(app.registry.len(), 2);
        let target = app.projection_target.clone().unwrap();
        assert_eq!(
            app.windows[&target].frame.borrow().scene.as_ref().unwrap().curve_count(),
            2
        );
    }

    #[test]
    fn test_refused_step_pauses_spin() {
        let mut app = NxPlotApp::new(PlotConfig::default());
        let values = NxField::from_vec("v", (0..200).map(f64::from).collect())
            .values
            .into_shape_with_order(vec![10, 4, 5])
            .unwrap();
        let label = app
            .plot_into(None, NxData::new(NxField::new("counts", values)).shared(), false)
            .unwrap();
        let z = nxplot_view::AxisRef::Dim(0);
        app.with_view(&label, |view| {
            view.set_locked(z, false)?;
            view.set_limits(z, 0.0, 3.0)?;
            view.set_locked(z, true)
        })
        .unwrap();

        let message = {
            let mut controls = app.windows[&label].controls.borrow_mut();
            assert_eq!(controls.z[0].spin.index(), 3);
            controls.z[0].spin.step_by(-1).unwrap()
        };
        app.apply(&label, vec![message]);
        let controls = app.windows[&label].controls.borrow();
        assert_eq!(controls.z[0].spin.index(), 3);
        assert!(controls.z[0].spin.paused());
    }

    #[test]
    fn test_bad_message_sets_status() {
        let mut app = NxPlotApp::new(PlotConfig::default());
        let label = app.new_window();
        app.apply(
            &label,
            vec![ControlMessage {
                source: nxplot_view::ControlId(1),
                event: nxplot_view::ControlEvent::Summed(false),
            }],
        );
        assert!(app.processing.status_text.starts_with("Error"));
    }
}

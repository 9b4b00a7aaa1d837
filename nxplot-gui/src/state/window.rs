//! Per-window and per-file UI state.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use eframe::egui;
use nxplot_io::NxDataInfo;
use nxplot_view::{format_value, MouseButton, PlotView, ProjectionPanel};

use super::controls::ViewControls;
use crate::viewer::{EguiRenderer, Frame, TextureCache};

/// A zoom box being dragged.
#[derive(Clone, Copy)]
pub struct DragState {
    /// Screen position of the press.
    pub start: egui::Pos2,
    /// Latest pointer position.
    pub current: egui::Pos2,
    /// Button held.
    pub button: MouseButton,
}

/// Text buffers of the projection panel.
#[derive(Default)]
pub struct ProjectionForm {
    /// `(dim, lo, hi)` text per plotted dimension.
    pub limits: Vec<(usize, String, String)>,
}

impl ProjectionForm {
    /// Copies the panel limits of `dims` into the text buffers.
    pub fn sync(&mut self, panel: &ProjectionPanel, dims: impl IntoIterator<Item = usize>) {
        self.limits = dims
            .into_iter()
            .map(|dim| match panel.limits(dim) {
                Some((lo, hi)) => (dim, format_value(lo), format_value(hi)),
                None => (dim, String::new(), String::new()),
            })
            .collect();
    }
}

/// Everything the UI keeps beside a `PlotView`.
pub struct WindowState {
    /// Latest frame handed to the renderer.
    pub frame: Rc<RefCell<Frame>>,
    /// Control panel, kept current by a view subscription.
    pub controls: Rc<RefCell<ViewControls>>,
    /// Textures of the current frame.
    pub textures: TextureCache,
    /// Zoom box in progress.
    pub drag: Option<DragState>,
    /// Projection panel buffers.
    pub projection: ProjectionForm,
    /// Last slideshow tick.
    pub last_tick: Option<Instant>,
}

impl WindowState {
    /// Creates the UI state of a new window and the renderer to hand to
    /// [`PlotView::new`]; call [`WindowState::attach`] once the view exists.
    pub fn new() -> (Self, EguiRenderer) {
        let frame = Rc::new(RefCell::new(Frame::default()));
        let renderer = EguiRenderer::new(Rc::clone(&frame));
        let state = Self {
            frame,
            controls: Rc::new(RefCell::new(ViewControls::default())),
            textures: TextureCache::default(),
            drag: None,
            projection: ProjectionForm::default(),
            last_tick: None,
        };
        (state, renderer)
    }

    /// Subscribes the controls to `view`.
    pub fn attach(&self, view: &mut PlotView) {
        if let Some(state) = view.state() {
            self.controls.borrow_mut().rebuild(state);
        }
        let controls = Rc::clone(&self.controls);
        view.subscribe(None, move |event, state| {
            controls.borrow_mut().on_change(event, state);
        });
    }
}

/// The open file and its groups.
#[derive(Default)]
pub struct FileState {
    /// Open file.
    pub path: Option<PathBuf>,
    /// NXdata groups of the file.
    pub groups: Vec<NxDataInfo>,
    /// Selected group index.
    pub selected: Option<usize>,
    /// Plot over the current 1-D plot instead of replacing it.
    pub over: bool,
}

//! One plot window: state, renderer, observers and the projection panel.
//!
//! [`PlotView`] is the single entry point for everything that changes what a
//! window shows. Each mutation runs on a copy of the current [`ViewState`];
//! only when the copy has been validated and re-projected is it committed,
//! rendered and announced to observers.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use nxplot_core::{Error, NxData, Projection, Result};

use crate::colormap::Colormap;
use crate::config::PlotConfig;
use crate::controls::{ControlEvent, ControlId, ControlMessage};
use crate::observer::{ChangeEvent, Observers, SubscriptionId, ViewChange};
use crate::options::{Aspect, Interpolation, PlotOptions};
use crate::panel::ProjectionPanel;
use crate::render::{Renderer, Scene};
use crate::slideshow::{Direction, Slideshow};
use crate::state::{AxisRef, DisplayAxis, ViewState};
use crate::zoom::{DataTransform, MouseButton, Scale, ScreenRect, ViewLimits, ZoomBox, ZoomHistory};

/// Lifecycle of a plot view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing plotted yet.
    Uninitialized,
    /// Showing data.
    Initialized,
    /// Closed; every operation except `close` fails.
    Closed,
}

/// A plot window.
pub struct PlotView {
    label: String,
    config: PlotConfig,
    state: Option<ViewState>,
    renderer: Box<dyn Renderer>,
    observers: Observers,
    panel: Option<ProjectionPanel>,
    slideshow: Slideshow,
    elapsed: Duration,
    history: ZoomHistory,
    scene: Option<Scene>,
    closed: bool,
}

impl std::fmt::Debug for PlotView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotView")
            .field("label", &self.label)
            .field("phase", &self.phase())
            .field("slideshow", &self.slideshow)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl PlotView {
    /// Creates an empty view drawing through `renderer`.
    pub fn new(label: impl Into<String>, config: PlotConfig, renderer: impl Renderer + 'static) -> Self {
        let label = label.into();
        info!("Opened plot view {label}");
        Self {
            label,
            config,
            state: None,
            renderer: Box::new(renderer),
            observers: Observers::default(),
            panel: None,
            slideshow: Slideshow::Stopped,
            elapsed: Duration::ZERO,
            history: ZoomHistory::default(),
            scene: None,
            closed: false,
        }
    }

    /// Window label, e.g. `"Figure 1"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match (self.closed, &self.state) {
            (true, _) => Phase::Closed,
            (false, Some(_)) => Phase::Initialized,
            (false, None) => Phase::Uninitialized,
        }
    }

    /// Settings the view was created with.
    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// What is plotted, if anything.
    pub fn state(&self) -> Option<&ViewState> {
        self.state.as_ref()
    }

    /// Last rendered frame.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Slideshow state.
    pub fn slideshow(&self) -> Slideshow {
        self.slideshow
    }

    /// Committed zoom windows.
    pub fn history(&self) -> &ZoomHistory {
        &self.history
    }

    /// The open projection panel.
    pub fn panel(&self) -> Option<&ProjectionPanel> {
        self.panel.as_ref()
    }

    /// The open projection panel, for editing.
    pub fn panel_mut(&mut self) -> Option<&mut ProjectionPanel> {
        self.panel.as_mut()
    }

    fn current(&self) -> Result<&ViewState> {
        if self.closed {
            return Err(Error::Closed(self.label.clone()));
        }
        self.state.as_ref().ok_or(Error::NotInitialized)
    }

    /// Plots `data`, replacing what is shown unless `options.over` adds a curve.
    ///
    /// # Errors
    /// `Closed` after [`PlotView::close`]; validation errors of the data and
    /// options, which leave the view untouched.
    pub fn plot(&mut self, data: Arc<NxData>, options: &PlotOptions) -> Result<()> {
        if self.closed {
            return Err(Error::Closed(self.label.clone()));
        }
        let mut candidate = ViewState::plot(data, options, &self.config, self.state.as_ref())?;
        let projection = candidate.refresh()?;
        // A fresh plot holds at most one curve; more means an overlay kept the axes.
        let overlaid = options.over && candidate.curves().len() > 1;
        if !overlaid {
            self.slideshow = Slideshow::Stopped;
            if self.panel.is_some() {
                self.panel = ProjectionPanel::new(&candidate).ok();
            }
        }
        self.history = ZoomHistory::new(candidate.reset_limits());
        info!("Plotted {} in {}", candidate.data().name, self.label);
        self.commit(candidate, projection.as_ref(), ViewChange::Plotted, None);
        Ok(())
    }

    /// Replaces the data with a new version of the same shape, keeping limits.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`, or `InvalidShape` when the shape changed.
    pub fn replot_data(&mut self, data: Arc<NxData>) -> Result<()> {
        self.mutate(ViewChange::Plotted, None, |state| state.replace_data(data))
    }

    /// Re-derives the projection and renders again.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`; projection errors.
    pub fn redraw(&mut self) -> Result<()> {
        self.mutate(ViewChange::Plotted, None, |_| Ok(()))
    }

    /// Sets both limits of an axis.
    ///
    /// # Errors
    /// See [`ViewState::set_limits`].
    pub fn set_limits(&mut self, axis: AxisRef, lo: f64, hi: f64) -> Result<()> {
        self.dispatch(ControlEvent::Limits { axis, lo, hi }, None)
    }

    /// Moves the lower limit of an axis.
    ///
    /// # Errors
    /// See [`ViewState::set_lo`].
    pub fn set_lo(&mut self, axis: AxisRef, lo: f64) -> Result<()> {
        self.dispatch(ControlEvent::Lo { axis, lo }, None)
    }

    /// Moves the upper limit of an axis through the lock-aware path.
    ///
    /// # Errors
    /// See [`ViewState::set_hi`].
    pub fn set_hi(&mut self, axis: AxisRef, hi: f64) -> Result<()> {
        self.dispatch(ControlEvent::Hi { axis, hi }, None)
    }

    /// Locks or unlocks an axis window.
    ///
    /// # Errors
    /// `InvalidAxis` for an unknown axis.
    pub fn set_locked(&mut self, axis: AxisRef, locked: bool) -> Result<()> {
        self.dispatch(ControlEvent::Lock { axis, locked }, None)
    }

    /// Switches log scale on an axis.
    ///
    /// # Errors
    /// See [`ViewState::set_log`].
    pub fn set_log(&mut self, axis: AxisRef, log: bool) -> Result<()> {
        self.dispatch(ControlEvent::Log { axis, log }, None)
    }

    /// Turns intensity autoscaling on or off.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn set_autoscale(&mut self, autoscale: bool) -> Result<()> {
        self.dispatch(ControlEvent::Autoscale(autoscale), None)
    }

    /// Sums over z windows instead of showing their first slice.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn set_summed(&mut self, summed: bool) -> Result<()> {
        self.dispatch(ControlEvent::Summed(summed), None)
    }

    /// Changes the colormap.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn set_colormap(&mut self, colormap: Colormap) -> Result<()> {
        self.dispatch(ControlEvent::Colormap(colormap), None)
    }

    /// Changes the image interpolation.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) -> Result<()> {
        self.dispatch(ControlEvent::Interpolation(interpolation), None)
    }

    /// Pins an aspect ratio.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn set_aspect(&mut self, aspect: Aspect) -> Result<()> {
        self.dispatch(ControlEvent::Aspect(aspect), None)
    }

    /// Sets the angle between the x and y axes.
    ///
    /// # Errors
    /// See [`ViewState::set_skew`].
    pub fn set_skew(&mut self, angle: Option<f64>) -> Result<()> {
        self.dispatch(ControlEvent::Skew(angle), None)
    }

    /// Maps a signal dimension to a display axis and restarts the zoom history.
    ///
    /// # Errors
    /// See [`ViewState::change_axis`].
    pub fn change_axis(&mut self, which: DisplayAxis, dim: usize) -> Result<()> {
        self.dispatch(ControlEvent::ChangeAxis { which, dim }, None)
    }

    /// Chooses the z dimension the slideshow steps.
    ///
    /// # Errors
    /// `InvalidAxis` when `dim` is not a z dimension.
    pub fn set_active_z(&mut self, dim: usize) -> Result<()> {
        self.mutate(ViewChange::Slice(dim), None, |state| state.set_active_z(dim))
    }

    /// Steps the active z axis. Returns `false` when the step would leave
    /// the axis; nothing changes then.
    ///
    /// # Errors
    /// `InvalidAxis` when the plot has no z axis.
    pub fn step_z(&mut self, steps: isize) -> Result<bool> {
        let dim = self
            .current()?
            .active_z()
            .ok_or_else(|| Error::InvalidAxis("plot has no z axis".to_string()))?;
        self.step(dim, steps, None)
    }

    fn step(&mut self, dim: usize, steps: isize, origin: Option<ControlId>) -> Result<bool> {
        let mut candidate = self.current()?.clone();
        if !candidate.step_axis(dim, steps)? {
            debug!("z axis {dim} at its end, not stepping");
            return Ok(false);
        }
        let projection = candidate.refresh()?;
        self.commit(candidate, projection.as_ref(), ViewChange::Slice(dim), origin);
        Ok(true)
    }

    /// Data transform for a data area of `screen` pixels.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`; `InvalidLimits` when the current limits
    /// cannot be mapped (empty screen, non-positive log limits).
    pub fn transform(&self, screen: ScreenRect) -> Result<DataTransform> {
        let state = self.current()?;
        let (x, y) = (state.x_axis(), state.y_axis());
        DataTransform::new(
            screen,
            x.get_limits(),
            y.get_limits(),
            Scale::from_log(x.log()),
            Scale::from_log(y.log()),
            state.skew(),
        )
        .map(|transform| transform.with_reversed(x.reversed(), y.reversed()))
        .ok_or_else(|| Error::InvalidLimits("current limits cannot be drawn".to_string()))
    }

    /// Handles a finished rectangle-select gesture.
    ///
    /// A left-button box zooms and is pushed onto the history; a right-button
    /// box is only staged (and copied into an open projection panel).
    /// Returns `false` for boxes too small to count.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`; limit errors.
    pub fn zoom_box(&mut self, zoom: ZoomBox, transform: &DataTransform) -> Result<bool> {
        let state = self.current()?;
        let Some(rect) = zoom.to_rect(transform, state.x(), state.y()) else {
            return Ok(false);
        };
        match zoom.button {
            MouseButton::Left => {
                self.mutate(ViewChange::Zoom, None, |state| state.commit_zoom(rect))?;
                if let Some(state) = &self.state {
                    self.history.push(state.view_limits());
                }
            }
            MouseButton::Right => {
                self.mutate(ViewChange::Zoom, None, |state| {
                    state.stage_zoom(rect);
                    Ok(())
                })?;
                if let Some(panel) = &mut self.panel {
                    panel.apply_zoom(&rect);
                }
            }
        }
        Ok(true)
    }

    /// Restores the limits recorded when the data was plotted.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn home(&mut self) -> Result<bool> {
        self.current()?;
        let limits = self.history.home();
        self.navigate(limits)
    }

    /// Goes back one committed zoom.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn back(&mut self) -> Result<bool> {
        self.current()?;
        let limits = self.history.back();
        self.navigate(limits)
    }

    /// Goes forward one committed zoom.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`.
    pub fn forward(&mut self) -> Result<bool> {
        self.current()?;
        let limits = self.history.forward();
        self.navigate(limits)
    }

    fn navigate(&mut self, limits: Option<ViewLimits>) -> Result<bool> {
        match limits {
            Some(limits) => {
                self.mutate(ViewChange::Zoom, None, |state| state.apply_view_limits(limits))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Presses a play button.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`; `InvalidAxis` when there is no z axis.
    pub fn press_play(&mut self, direction: Direction) -> Result<Slideshow> {
        if self.current()?.active_z().is_none() {
            return Err(Error::InvalidAxis("plot has no z axis".to_string()));
        }
        self.slideshow = self.slideshow.press(direction, &self.config);
        self.elapsed = Duration::ZERO;
        debug!("{}: slideshow {:?}", self.label, self.slideshow);
        Ok(self.slideshow)
    }

    /// Stops the slideshow.
    pub fn stop_play(&mut self) {
        self.slideshow = self.slideshow.stop();
        self.elapsed = Duration::ZERO;
    }

    /// Advances the slideshow clock by `elapsed`, stepping once per interval.
    ///
    /// Returns whether the slideshow is still playing; it pauses itself at
    /// the end of the z axis.
    ///
    /// # Errors
    /// Errors of [`PlotView::step_z`]; the slideshow stops on error.
    pub fn tick(&mut self, elapsed: Duration) -> Result<bool> {
        let Slideshow::Playing {
            direction,
            interval,
        } = self.slideshow
        else {
            return Ok(false);
        };
        self.elapsed += elapsed;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            match self.step_z(direction.steps()) {
                Ok(true) => {}
                Ok(false) => {
                    info!("{}: slideshow paused at the end of the z axis", self.label);
                    self.stop_play();
                    return Ok(false);
                }
                Err(err) => {
                    self.stop_play();
                    return Err(err);
                }
            }
        }
        Ok(true)
    }

    /// Opens the projection panel, seeded from the current view.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`; `InvalidAxis` when x is the signal axis.
    pub fn open_panel(&mut self) -> Result<&mut ProjectionPanel> {
        let panel = match self.panel.take() {
            Some(panel) => panel,
            None => ProjectionPanel::new(self.current()?)?,
        };
        Ok(self.panel.insert(panel))
    }

    /// Closes the projection panel. Closing an absent panel does nothing.
    pub fn close_panel(&mut self) {
        if self.panel.take().is_some() {
            debug!("{}: projection panel closed", self.label);
        }
    }

    /// Projects the data with the panel's settings, or with a panel seeded
    /// from the current view when none is open.
    ///
    /// # Errors
    /// `NotInitialized`/`Closed`; projection errors.
    pub fn project(&self) -> Result<NxData> {
        let state = self.current()?;
        match &self.panel {
            Some(panel) => panel.project(state),
            None => ProjectionPanel::new(state)?.project(state),
        }
    }

    /// Applies a message from a control.
    ///
    /// The resulting change is not reported back to the control that sent it.
    /// Returns `false` when a step was refused at the end of a locked window;
    /// nothing changed then and the sender should resync through
    /// [`SpinControl::refuse`](crate::SpinControl::refuse).
    ///
    /// # Errors
    /// Errors of the requested operation; the view is unchanged then.
    pub fn apply(&mut self, message: ControlMessage) -> Result<bool> {
        match message.event {
            ControlEvent::Step { dim, steps } => self.step(dim, steps, Some(message.source)),
            event => self.dispatch(event, Some(message.source)).map(|()| true),
        }
    }

    fn dispatch(&mut self, event: ControlEvent, origin: Option<ControlId>) -> Result<()> {
        match event {
            ControlEvent::Limits { axis, lo, hi } => {
                self.mutate(ViewChange::Limits(axis), origin, |s| s.set_limits(axis, lo, hi))
            }
            ControlEvent::Lo { axis, lo } => {
                self.mutate(ViewChange::Limits(axis), origin, |s| s.set_lo(axis, lo))
            }
            ControlEvent::Hi { axis, hi } => {
                self.mutate(ViewChange::Limits(axis), origin, |s| s.set_hi(axis, hi))
            }
            ControlEvent::Lock { axis, locked } => {
                self.mutate(ViewChange::Locked(axis), origin, |s| s.set_locked(axis, locked))
            }
            ControlEvent::Log { axis, log } => {
                self.mutate(ViewChange::Scale(axis), origin, |s| s.set_log(axis, log))
            }
            ControlEvent::Step { dim, steps } => self.step(dim, steps, origin).map(|_| ()),
            ControlEvent::ChangeAxis { which, dim } => {
                self.mutate(ViewChange::Axes, origin, |s| s.change_axis(which, dim))?;
                if let Some(state) = &self.state {
                    self.history = ZoomHistory::new(state.reset_limits());
                }
                Ok(())
            }
            ControlEvent::Autoscale(autoscale) => self.mutate(ViewChange::Style, origin, |s| {
                s.set_autoscale(autoscale);
                Ok(())
            }),
            ControlEvent::Summed(summed) => self.mutate(ViewChange::Style, origin, |s| {
                s.set_summed(summed);
                Ok(())
            }),
            ControlEvent::Colormap(colormap) => self.mutate(ViewChange::Style, origin, |s| {
                s.set_colormap(colormap);
                Ok(())
            }),
            ControlEvent::Interpolation(interpolation) => {
                self.mutate(ViewChange::Style, origin, |s| {
                    s.set_interpolation(interpolation);
                    Ok(())
                })
            }
            ControlEvent::Aspect(aspect) => self.mutate(ViewChange::Style, origin, |s| {
                s.set_aspect(aspect);
                Ok(())
            }),
            ControlEvent::Skew(angle) => {
                self.mutate(ViewChange::Style, origin, |s| s.set_skew(angle))
            }
        }
    }

    /// Registers a change callback. Pass the control's id as `owner` so the
    /// control is not told about its own edits.
    pub fn subscribe<F>(&mut self, owner: Option<ControlId>, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent, Option<&ViewState>) + 'static,
    {
        self.observers.subscribe(owner, callback)
    }

    /// Removes a change callback.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Closes the view: drops the panel, stops the slideshow, clears the
    /// renderer and tells observers. Closing twice does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.close_panel();
        self.stop_play();
        self.renderer.clear();
        self.scene = None;
        self.state = None;
        let event = ChangeEvent {
            change: ViewChange::Closed,
            origin: None,
        };
        self.observers.notify(&event, None);
        self.observers.clear();
        info!("Closed plot view {}", self.label);
    }

    fn mutate<F>(&mut self, change: ViewChange, origin: Option<ControlId>, edit: F) -> Result<()>
    where
        F: FnOnce(&mut ViewState) -> Result<()>,
    {
        let mut candidate = self.current()?.clone();
        edit(&mut candidate)?;
        let projection = candidate.refresh()?;
        self.commit(candidate, projection.as_ref(), change, origin);
        Ok(())
    }

    fn commit(
        &mut self,
        state: ViewState,
        projection: Option<&Projection>,
        change: ViewChange,
        origin: Option<ControlId>,
    ) {
        let scene = Scene::build(&state, projection);
        self.renderer.render(&scene);
        debug!("{}: {:?} rendered", self.label, change);
        self.observers
            .notify(&ChangeEvent { change, origin }, Some(&state));
        self.scene = Some(scene);
        self.state = Some(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use ndarray::{Array, IxDyn};
    use nxplot_core::NxField;

    use crate::controls::SpinControl;
    use crate::render::RecordingRenderer;
    use crate::zoom::ScreenPoint;

    fn ramp(shape: &[usize]) -> Arc<NxData> {
        let n: usize = shape.iter().product();
        #[allow(clippy::cast_precision_loss)]
        let values =
            Array::from_shape_vec(IxDyn(shape), (0..n).map(|i| i as f64).collect()).unwrap();
        NxData::new(NxField::new("counts", values)).shared()
    }

    fn view() -> (PlotView, RecordingRenderer) {
        let renderer = RecordingRenderer::new();
        let view = PlotView::new("Figure 1", PlotConfig::default(), renderer.clone());
        (view, renderer)
    }

    fn screen() -> ScreenRect {
        ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 100.0))
    }

    #[test]
    fn test_lifecycle() {
        let (mut view, renderer) = view();
        assert_eq!(view.phase(), Phase::Uninitialized);
        assert_eq!(
            view.set_limits(AxisRef::Signal, 0.0, 1.0),
            Err(Error::NotInitialized)
        );
        view.plot(ramp(&[4, 5]), &PlotOptions::default()).unwrap();
        assert_eq!(view.phase(), Phase::Initialized);
        assert_eq!(renderer.len(), 1);

        view.close();
        view.close();
        assert_eq!(view.phase(), Phase::Closed);
        assert_eq!(renderer.cleared(), 1);
        assert!(matches!(view.redraw(), Err(Error::Closed(_))));
    }

    #[test]
    fn test_failed_edit_leaves_view_unchanged() {
        let (mut view, renderer) = view();
        view.plot(ramp(&[4, 5]), &PlotOptions::default()).unwrap();
        let before = view.state().cloned();
        assert!(view.set_skew(Some(200.0)).is_err());
        assert!(view.set_limits(AxisRef::Dim(0), f64::NAN, 1.0).is_err());
        assert_eq!(view.state().cloned(), before);
        assert_eq!(renderer.len(), 1);
    }

    #[test]
    fn test_left_zoom_and_history() {
        let (mut view, _) = view();
        view.plot(ramp(&[10, 10]), &PlotOptions::default()).unwrap();
        let home = view.state().unwrap().view_limits();
        let transform = view.transform(screen()).unwrap();
        let zoom = ZoomBox::new(
            ScreenPoint::new(20.0, 80.0),
            ScreenPoint::new(60.0, 40.0),
            MouseButton::Left,
        );
        assert!(view.zoom_box(zoom, &transform).unwrap());
        let zoomed = view.state().unwrap().view_limits();
        assert!(zoomed.x.0 > home.x.0 && zoomed.x.1 < home.x.1);
        assert_eq!(view.history().len(), 2);

        assert!(view.home().unwrap());
        let restored = view.state().unwrap().view_limits();
        assert_relative_eq!(restored.x.0, home.x.0);
        assert_relative_eq!(restored.y.1, home.y.1);
        assert!(view.forward().unwrap());
        assert_relative_eq!(view.state().unwrap().view_limits().x.0, zoomed.x.0);
    }

    #[test]
    fn test_right_zoom_only_stages() {
        let (mut view, _) = view();
        view.plot(ramp(&[10, 10]), &PlotOptions::default()).unwrap();
        let home = view.state().unwrap().view_limits();
        let transform = view.transform(screen()).unwrap();
        let tiny = ZoomBox::new(
            ScreenPoint::new(20.0, 20.0),
            ScreenPoint::new(21.0, 60.0),
            MouseButton::Right,
        );
        assert!(!view.zoom_box(tiny, &transform).unwrap());

        view.open_panel().unwrap();
        let zoom = ZoomBox::new(
            ScreenPoint::new(20.0, 20.0),
            ScreenPoint::new(60.0, 60.0),
            MouseButton::Right,
        );
        assert!(view.zoom_box(zoom, &transform).unwrap());
        assert_eq!(view.state().unwrap().view_limits(), home);
        let rect = view.state().unwrap().zoom().copied().unwrap();
        assert_eq!(view.panel().unwrap().limits(1), Some((rect.x.lo, rect.x.hi)));
    }

    #[test]
    fn test_slideshow_pauses_at_end() {
        let (mut view, renderer) = view();
        view.plot(ramp(&[3, 4, 5]), &PlotOptions::default()).unwrap();
        view.press_play(Direction::Forward).unwrap();
        let interval = view.slideshow().interval().unwrap();
        assert!(view.tick(interval).unwrap());
        assert!(view.tick(interval).unwrap());
        assert!(!view.tick(interval).unwrap());
        assert_eq!(view.slideshow(), Slideshow::Stopped);
        assert_eq!(renderer.len(), 3);
    }

    #[test]
    fn test_control_origin_not_echoed() {
        let (mut view, _) = view();
        view.plot(ramp(&[4, 5]), &PlotOptions::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for owner in [ControlId(1), ControlId(2)] {
            let seen = Rc::clone(&seen);
            view.subscribe(Some(owner), move |event, _| {
                seen.borrow_mut().push((owner, event.change));
            });
        }
        view.apply(ControlMessage {
            source: ControlId(1),
            event: ControlEvent::Colormap(Colormap::Hot),
        })
        .unwrap();
        assert_eq!(*seen.borrow(), vec![(ControlId(2), ViewChange::Style)]);
        assert_eq!(view.state().unwrap().colormap(), Colormap::Hot);
    }

    #[test]
    fn test_overlay_on_image_resets_slices_and_panel() {
        let (mut view, _) = view();
        view.plot(ramp(&[3, 4, 5]), &PlotOptions::default()).unwrap();
        view.open_panel().unwrap();
        view.press_play(Direction::Forward).unwrap();
        assert_eq!(view.panel().unwrap().x(), 2);

        view.plot(ramp(&[6]), &PlotOptions::overlay()).unwrap();
        assert!(view.state().unwrap().is_1d());
        assert_eq!(view.slideshow(), Slideshow::Stopped);
        let panel = view.panel().unwrap();
        assert_eq!(panel.x(), 0);
        assert_eq!(panel.y(), None);
    }

    #[test]
    fn test_overlay_keeps_panel() {
        let (mut view, _) = view();
        view.plot(ramp(&[6]), &PlotOptions::default()).unwrap();
        view.open_panel().unwrap().set_limits(0, 1.0, 4.0);
        view.plot(ramp(&[6]), &PlotOptions::overlay()).unwrap();
        assert_eq!(view.state().unwrap().curves().len(), 2);
        assert_eq!(view.panel().unwrap().limits(0), Some((1.0, 4.0)));
    }

    #[test]
    fn test_refused_step_resyncs_spin() {
        let (mut view, _) = view();
        view.plot(ramp(&[10, 4, 5]), &PlotOptions::default()).unwrap();
        let z = AxisRef::Dim(0);
        view.set_locked(z, false).unwrap();
        view.set_limits(z, 0.0, 3.0).unwrap();
        view.set_locked(z, true).unwrap();

        let mut spin = SpinControl::new(ControlId(7), 0);
        spin.sync(view.state().unwrap().axis(z).unwrap());
        assert_eq!(spin.index(), 3);
        let message = spin.step_by(-1).unwrap();
        assert!(!view.apply(message).unwrap());
        let axis = view.state().unwrap().axis(z).unwrap();
        assert_eq!(axis.get_limits(), (0.0, 3.0));

        spin.refuse(axis);
        assert_eq!(spin.index(), 3);
        assert!(spin.paused());
    }

    #[test]
    fn test_descending_axis_is_drawn_reversed() {
        let (mut view, renderer) = view();
        let data = NxData::new(ramp(&[4, 5]).signal().unwrap().clone())
            .with_axes(vec![
                NxField::from_vec("y", vec![0.0, 1.0, 2.0, 3.0]),
                NxField::from_vec("x", vec![9.0, 8.0, 7.0, 6.0, 5.0]),
            ])
            .shared();
        view.plot(data, &PlotOptions::default()).unwrap();
        let scene = renderer.last().unwrap();
        assert!(scene.x_reversed);
        assert!(!scene.y_reversed);

        let transform = view.transform(screen()).unwrap();
        let (x, _) = transform.screen_to_data(ScreenPoint::new(0.0, 50.0)).unwrap();
        assert_relative_eq!(x, scene.x_limits.1, epsilon = 1e-9);
    }

    #[test]
    fn test_close_panel_is_idempotent() {
        let (mut view, _) = view();
        view.close_panel();
        view.plot(ramp(&[4, 5]), &PlotOptions::default()).unwrap();
        view.open_panel().unwrap().set_y(None);
        let projected = view.project().unwrap();
        assert_eq!(projected.shape(), &[5]);
        view.close_panel();
        view.close_panel();
        assert!(view.panel().is_none());
    }
}

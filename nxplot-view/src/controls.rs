//! Control-panel contracts.
//!
//! Controls are plain state machines that a UI toolkit wraps. A user action
//! returns a [`ControlMessage`] for the plot view to dispatch; programmatic
//! updates from the view go through `sync`, which runs under a
//! [`SignalBlocker`] so they never produce messages of their own.

use std::cell::Cell;
use std::rc::Rc;

use nxplot_core::PlotAxis;

use crate::colormap::Colormap;
use crate::options::{Aspect, Interpolation};
use crate::state::{AxisRef, DisplayAxis};

/// Number of slider positions across an axis range.
pub const SLIDER_STEPS: u32 = 1000;

/// Identifies the control a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u32);

/// What a control asks the view to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Set both limits.
    Limits {
        /// Target axis.
        axis: AxisRef,
        /// Lower limit.
        lo: f64,
        /// Upper limit.
        hi: f64,
    },
    /// Move the lower limit.
    Lo {
        /// Target axis.
        axis: AxisRef,
        /// Lower limit.
        lo: f64,
    },
    /// Move the upper limit (lock-aware).
    Hi {
        /// Target axis.
        axis: AxisRef,
        /// Upper limit.
        hi: f64,
    },
    /// Lock or unlock the window width.
    Lock {
        /// Target axis.
        axis: AxisRef,
        /// New lock state.
        locked: bool,
    },
    /// Switch log scale.
    Log {
        /// Target axis.
        axis: AxisRef,
        /// New log state.
        log: bool,
    },
    /// Step a z dimension by whole slices.
    Step {
        /// Signal dimension.
        dim: usize,
        /// Signed number of slices.
        steps: isize,
    },
    /// Map a dimension to a display axis.
    ChangeAxis {
        /// Display axis.
        which: DisplayAxis,
        /// Signal dimension.
        dim: usize,
    },
    /// Turn intensity autoscaling on or off.
    Autoscale(bool),
    /// Sum over z ranges.
    Summed(bool),
    /// Pick a colormap.
    Colormap(Colormap),
    /// Pick an interpolation.
    Interpolation(Interpolation),
    /// Pin an aspect ratio.
    Aspect(Aspect),
    /// Set the skew angle.
    Skew(Option<f64>),
}

/// A [`ControlEvent`] tagged with its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMessage {
    /// Control that produced the event.
    pub source: ControlId,
    /// Requested change.
    pub event: ControlEvent,
}

/// Change-signal switch shared by a control and its blockers.
#[derive(Debug, Clone, Default)]
pub struct Signals(Rc<Cell<bool>>);

impl Signals {
    /// Suppresses messages until the returned guard is dropped.
    pub fn block(&self) -> SignalBlocker {
        let previous = self.0.replace(true);
        SignalBlocker {
            blocked: Rc::clone(&self.0),
            previous,
        }
    }

    /// Whether messages are suppressed.
    pub fn is_blocked(&self) -> bool {
        self.0.get()
    }
}

/// Guard restoring the previous blocking state on drop, so guards nest.
#[derive(Debug)]
pub struct SignalBlocker {
    blocked: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for SignalBlocker {
    fn drop(&mut self) {
        self.blocked.set(self.previous);
    }
}

/// Editable `lo`/`hi` fields and an `hi` slider for one axis.
#[derive(Debug, Clone)]
pub struct AxisControl {
    id: ControlId,
    axis: AxisRef,
    lo_text: String,
    hi_text: String,
    slider: u32,
    min: f64,
    max: f64,
    lo: f64,
    hi: f64,
    diff: f64,
    locked: bool,
    log: bool,
    clamped: bool,
    signals: Signals,
}

/// Text shown for an axis value in limit boxes and readouts.
#[must_use]
pub fn format_value(value: f64) -> String {
    format!("{value:.6}")
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

impl AxisControl {
    /// Creates a control for `axis`. Call [`AxisControl::sync`] before use.
    pub fn new(id: ControlId, axis: AxisRef) -> Self {
        Self {
            id,
            axis,
            lo_text: String::new(),
            hi_text: String::new(),
            slider: 0,
            min: 0.0,
            max: 1.0,
            lo: 0.0,
            hi: 1.0,
            diff: 1.0,
            locked: false,
            log: false,
            clamped: !matches!(axis, AxisRef::Signal),
            signals: Signals::default(),
        }
    }

    /// Control id.
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Axis the control edits.
    pub fn axis(&self) -> AxisRef {
        self.axis
    }

    /// Text of the `lo` field.
    pub fn lo_text(&self) -> &str {
        &self.lo_text
    }

    /// Text of the `hi` field.
    pub fn hi_text(&self) -> &str {
        &self.hi_text
    }

    /// Slider position in `0..=SLIDER_STEPS`.
    pub fn slider(&self) -> u32 {
        self.slider
    }

    /// Whether the `lo` field accepts edits (it is disabled while locked).
    pub fn lo_enabled(&self) -> bool {
        !self.locked
    }

    /// Whether the lock box is checked.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Whether the log box is checked.
    pub fn log(&self) -> bool {
        self.log
    }

    /// Change-signal switch of this control.
    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    /// Shows the state of `axis` without producing messages.
    pub fn sync(&mut self, axis: &PlotAxis) {
        let _guard = self.signals.block();
        self.min = axis.min();
        self.max = axis.max();
        self.lo = axis.lo();
        self.hi = axis.hi();
        self.diff = axis.diff();
        self.locked = axis.locked();
        self.log = axis.log();
        self.lo_text = format_value(self.lo);
        self.hi_text = format_value(self.hi);
        let position = self.position(self.hi);
        let suppressed = self.set_slider(position);
        debug_assert!(suppressed.is_none());
    }

    /// User finished editing the `lo` field.
    pub fn edit_lo(&mut self, text: &str) -> Option<ControlMessage> {
        let value = match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && !self.locked => v,
            _ => {
                self.lo_text = format_value(self.lo);
                return None;
            }
        };
        let lo = if self.clamped {
            value.clamp(self.min, self.hi)
        } else {
            value.min(self.hi)
        };
        self.lo = lo;
        self.lo_text = format_value(lo);
        self.emit(ControlEvent::Lo {
            axis: self.axis,
            lo,
        })
    }

    /// User finished editing the `hi` field.
    pub fn edit_hi(&mut self, text: &str) -> Option<ControlMessage> {
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => {
                let hi = self.write_hi(v);
                self.emit(ControlEvent::Hi {
                    axis: self.axis,
                    hi,
                })
            }
            _ => {
                self.hi_text = format_value(self.hi);
                None
            }
        }
    }

    /// User moved the slider.
    pub fn move_slider(&mut self, position: u32) -> Option<ControlMessage> {
        let position = position.min(SLIDER_STEPS);
        let hi = {
            let _guard = self.signals.block();
            self.write_hi(self.value(position))
        };
        self.set_slider(self.position(hi))
    }

    /// User toggled the lock box.
    pub fn toggle_lock(&mut self, locked: bool) -> Option<ControlMessage> {
        self.locked = locked;
        if locked {
            self.diff = self.hi - self.lo;
        }
        self.emit(ControlEvent::Lock {
            axis: self.axis,
            locked,
        })
    }

    /// User toggled the log box.
    pub fn toggle_log(&mut self, log: bool) -> Option<ControlMessage> {
        self.log = log;
        self.emit(ControlEvent::Log {
            axis: self.axis,
            log,
        })
    }

    /// Stores a new `hi`, following it with `lo` when locked, and updates
    /// the paired slider under a blocker. Returns the stored value.
    fn write_hi(&mut self, value: f64) -> f64 {
        let hi = match (self.clamped, self.locked) {
            (true, true) => value.clamp((self.min + self.diff).min(self.max), self.max),
            (true, false) => value.clamp(self.min, self.max),
            (false, _) => value,
        };
        self.hi = hi;
        if self.locked {
            self.lo = hi - self.diff;
        } else if self.lo > hi {
            self.lo = hi;
        }
        self.hi_text = format_value(hi);
        self.lo_text = format_value(self.lo);
        let _guard = self.signals.block();
        let suppressed = self.set_slider(self.position(hi));
        debug_assert!(suppressed.is_none());
        hi
    }

    fn set_slider(&mut self, position: u32) -> Option<ControlMessage> {
        self.slider = position;
        self.emit(ControlEvent::Hi {
            axis: self.axis,
            hi: self.hi,
        })
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn position(&self, value: f64) -> u32 {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return 0;
        }
        let fraction = ((value - self.min) / span).clamp(0.0, 1.0);
        (fraction * f64::from(SLIDER_STEPS)).round() as u32
    }

    fn value(&self, position: u32) -> f64 {
        self.min + (self.max - self.min) * f64::from(position) / f64::from(SLIDER_STEPS)
    }

    fn emit(&self, event: ControlEvent) -> Option<ControlMessage> {
        if self.signals.is_blocked() {
            None
        } else {
            Some(ControlMessage {
                source: self.id,
                event,
            })
        }
    }
}

/// Integer spin box stepping a z dimension by whole slices.
#[derive(Debug, Clone)]
pub struct SpinControl {
    id: ControlId,
    dim: usize,
    index: usize,
    len: usize,
    paused: bool,
    signals: Signals,
}

impl SpinControl {
    /// Creates a spin box for signal dimension `dim`.
    pub fn new(id: ControlId, dim: usize) -> Self {
        Self {
            id,
            dim,
            index: 0,
            len: 0,
            paused: false,
            signals: Signals::default(),
        }
    }

    /// Control id.
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// Signal dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Current slice index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the axis has no slices.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set when a step was refused at either end of the axis.
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Shows the slice under `hi` of `axis` without producing messages.
    pub fn sync(&mut self, axis: &PlotAxis) {
        let _guard = self.signals.block();
        self.len = axis.len();
        self.index = axis.index_from_value(axis.hi());
        self.paused = false;
    }

    /// Returns to the view's slice after the view refused a step.
    pub fn refuse(&mut self, axis: &PlotAxis) {
        self.sync(axis);
        self.paused = true;
    }

    /// Moves by `steps` indices.
    ///
    /// A step past either end is refused: the index stays, `paused` is set
    /// and no message is produced.
    pub fn step_by(&mut self, steps: isize) -> Option<ControlMessage> {
        let target = self.index.checked_add_signed(steps).filter(|&i| i < self.len);
        let Some(target) = target else {
            self.paused = true;
            return None;
        };
        self.paused = false;
        self.index = target;
        if self.signals.is_blocked() {
            return None;
        }
        Some(ControlMessage {
            source: self.id,
            event: ControlEvent::Step {
                dim: self.dim,
                steps,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(-0.125), "-0.125");
        assert_eq!(format_value(1.0 / 3.0), "0.333333");
    }

    fn axis() -> PlotAxis {
        let mut axis = PlotAxis::index(0, 10);
        axis.set_limits(2.0, 5.0);
        axis
    }

    #[test]
    fn test_sync_is_silent() {
        let mut control = AxisControl::new(ControlId(1), AxisRef::Dim(0));
        control.sync(&axis());
        assert_eq!(control.lo_text(), "2");
        assert_eq!(control.hi_text(), "5");
        assert_eq!(control.slider(), 550);
        assert!(!control.signals().is_blocked());
    }

    #[test]
    fn test_blockers_nest() {
        let signals = Signals::default();
        {
            let _outer = signals.block();
            {
                let _inner = signals.block();
            }
            assert!(signals.is_blocked());
        }
        assert!(!signals.is_blocked());
    }

    #[test]
    fn test_locked_hi_moves_lo() {
        let mut control = AxisControl::new(ControlId(1), AxisRef::Dim(0));
        control.sync(&axis());
        assert!(control.toggle_lock(true).is_some());
        assert!(!control.lo_enabled());
        assert_eq!(control.edit_lo("1"), None);
        assert_eq!(control.lo_text(), "2");

        let message = control.edit_hi("8").unwrap();
        assert_eq!(
            message.event,
            ControlEvent::Hi {
                axis: AxisRef::Dim(0),
                hi: 8.0
            }
        );
        assert_eq!(control.lo_text(), "5");
        assert_eq!(control.slider(), 850);
    }

    #[test]
    fn test_slider_emits_one_message() {
        let mut control = AxisControl::new(ControlId(7), AxisRef::Dim(0));
        control.sync(&axis());
        let message = control.move_slider(1000).unwrap();
        assert_eq!(message.source, ControlId(7));
        assert_eq!(control.hi_text(), "9.5");
    }

    #[test]
    fn test_invalid_text_restores_field() {
        let mut control = AxisControl::new(ControlId(1), AxisRef::Signal);
        control.sync(&axis());
        assert_eq!(control.edit_hi("abc"), None);
        assert_eq!(control.hi_text(), "5");
        // the signal axis is not clamped to its data range
        assert!(control.edit_hi("50").is_some());
        assert_eq!(control.hi_text(), "50");
    }

    #[test]
    fn test_spin_refuses_past_ends() {
        let mut spin = SpinControl::new(ControlId(2), 0);
        let mut z = PlotAxis::index(0, 3);
        z.set_limits(0.0, 0.0);
        spin.sync(&z);
        assert_eq!(spin.step_by(-1), None);
        assert!(spin.paused());
        assert!(spin.step_by(2).is_some());
        assert_eq!(spin.index(), 2);
        assert!(!spin.paused());
        assert_eq!(spin.step_by(1), None);
        assert!(spin.paused());
        assert_eq!(spin.index(), 2);
    }
}

//! Control-panel state of one plot window.
//!
//! The controls follow the view through a subscription: every change the
//! view reports is copied into the widgets, except into the control that
//! caused it.

use nxplot_view::controls::SLIDER_STEPS;
use nxplot_view::{
    AxisControl, AxisRef, ChangeEvent, ControlId, ControlMessage, SpinControl, ViewChange,
    ViewState,
};

/// Text buffers of one `AxisControl`.
pub struct AxisRow {
    /// Underlying control.
    pub control: AxisControl,
    /// Text being edited in the `lo` field.
    pub lo: String,
    /// Text being edited in the `hi` field.
    pub hi: String,
}

impl AxisRow {
    fn new(id: ControlId, axis: AxisRef, state: &ViewState) -> Option<Self> {
        let mut row = Self {
            control: AxisControl::new(id, axis),
            lo: String::new(),
            hi: String::new(),
        };
        row.sync(state)?;
        Some(row)
    }

    fn sync(&mut self, state: &ViewState) -> Option<()> {
        let axis = state.axis(self.control.axis()).ok()?;
        self.control.sync(axis);
        self.lo = self.control.lo_text().to_string();
        self.hi = self.control.hi_text().to_string();
        Some(())
    }

    /// Commits the `lo` buffer; restores it when the text is rejected.
    pub fn commit_lo(&mut self) -> Option<ControlMessage> {
        let message = self.control.edit_lo(&self.lo);
        self.lo = self.control.lo_text().to_string();
        message
    }

    /// Commits the `hi` buffer; restores it when the text is rejected.
    pub fn commit_hi(&mut self) -> Option<ControlMessage> {
        let message = self.control.edit_hi(&self.hi);
        self.hi = self.control.hi_text().to_string();
        message
    }

    /// Moves the slider and refreshes the `hi` buffer.
    pub fn slide(&mut self, position: u32) -> Option<ControlMessage> {
        let message = self.control.move_slider(position.min(SLIDER_STEPS));
        self.hi = self.control.hi_text().to_string();
        self.lo = self.control.lo_text().to_string();
        message
    }
}

/// A z dimension: window fields plus the slice spin box.
pub struct ZRow {
    /// Window of the dimension.
    pub axis: AxisRow,
    /// Slice stepping.
    pub spin: SpinControl,
}

/// Every control of one window.
#[derive(Default)]
pub struct ViewControls {
    /// Intensity (or y values of a line plot).
    pub signal: Option<AxisRow>,
    /// Horizontal display axis.
    pub x: Option<AxisRow>,
    /// Vertical display axis.
    pub y: Option<AxisRow>,
    /// One row per z dimension.
    pub z: Vec<ZRow>,
    /// Text of the skew field.
    pub skew: String,
}

const SIGNAL_ID: ControlId = ControlId(1);
const X_ID: ControlId = ControlId(2);
const Y_ID: ControlId = ControlId(3);

fn z_ids(dim: usize) -> (ControlId, ControlId) {
    let dim = u32::try_from(dim).unwrap_or(u32::MAX / 2 - 100);
    (ControlId(100 + 2 * dim), ControlId(101 + 2 * dim))
}

impl ViewControls {
    /// Builds the controls for the current axis assignment.
    pub fn rebuild(&mut self, state: &ViewState) {
        self.signal = AxisRow::new(SIGNAL_ID, AxisRef::Signal, state);
        self.x = AxisRow::new(X_ID, state.x(), state);
        self.y = if state.is_1d() {
            None
        } else {
            AxisRow::new(Y_ID, state.y(), state)
        };
        self.z = state
            .z_dims()
            .iter()
            .filter_map(|&dim| {
                let (axis_id, spin_id) = z_ids(dim);
                let axis = AxisRow::new(axis_id, AxisRef::Dim(dim), state)?;
                let mut spin = SpinControl::new(spin_id, dim);
                spin.sync(state.axis(AxisRef::Dim(dim)).ok()?);
                Some(ZRow { axis, spin })
            })
            .collect();
        self.skew = state.skew().map(|angle| format!("{angle}")).unwrap_or_default();
    }

    /// Copies a reported change into every control except its origin.
    pub fn on_change(&mut self, event: &ChangeEvent, state: Option<&ViewState>) {
        let Some(state) = state else {
            *self = Self::default();
            return;
        };
        match event.change {
            ViewChange::Plotted | ViewChange::Axes => self.rebuild(state),
            _ => self.refresh(state, event.origin),
        }
    }

    /// Resyncs the spin box `source` after the view refused its step.
    pub fn refuse(&mut self, source: ControlId, state: &ViewState) {
        for row in &mut self.z {
            if row.spin.id() == source {
                if let Ok(axis) = state.axis(AxisRef::Dim(row.spin.dim())) {
                    row.spin.refuse(axis);
                }
            }
        }
    }

    fn refresh(&mut self, state: &ViewState, origin: Option<ControlId>) {
        let rows = self
            .signal
            .iter_mut()
            .chain(self.x.iter_mut())
            .chain(self.y.iter_mut())
            .chain(self.z.iter_mut().map(|row| &mut row.axis));
        for row in rows {
            if Some(row.control.id()) != origin {
                row.sync(state);
            }
        }
        for row in &mut self.z {
            if Some(row.spin.id()) != origin {
                if let Ok(axis) = state.axis(AxisRef::Dim(row.spin.dim())) {
                    row.spin.sync(axis);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nxplot_core::{NxData, NxField};
    use nxplot_view::{PlotConfig, PlotOptions, PlotView, RecordingRenderer};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[allow(clippy::cast_precision_loss)]
    fn cube() -> PlotView {
        let values = nxplot_core::NxField::from_vec("v", (0..60).map(|i| i as f64).collect());
        let values = values.values.into_shape_with_order(vec![3, 4, 5]).unwrap();
        let mut view = PlotView::new("Figure 1", PlotConfig::default(), RecordingRenderer::new());
        view.plot(
            NxData::new(NxField::new("counts", values)).shared(),
            &PlotOptions::default(),
        )
        .unwrap();
        view
    }

    #[test]
    fn test_controls_follow_view() {
        let mut view = cube();
        let controls = Rc::new(RefCell::new(ViewControls::default()));
        controls.borrow_mut().rebuild(view.state().unwrap());
        {
            let controls = Rc::clone(&controls);
            view.subscribe(None, move |event, state| {
                controls.borrow_mut().on_change(event, state);
            });
        }
        assert_eq!(controls.borrow().z.len(), 1);
        assert!(controls.borrow().y.is_some());

        let message = {
            let mut controls = controls.borrow_mut();
            let x = controls.x.as_mut().unwrap();
            x.hi = "3".to_string();
            x.commit_hi().unwrap()
        };
        view.apply(message).unwrap();
        assert_eq!(controls.borrow().x.as_ref().unwrap().hi, "3");

        let message = controls.borrow_mut().z[0].spin.step_by(1).unwrap();
        view.apply(message).unwrap();
        assert_eq!(controls.borrow().z[0].spin.index(), 1);

        view.close();
        assert!(controls.borrow().signal.is_none());
    }

    #[test]
    fn test_rejected_text_is_restored() {
        let view = cube();
        let mut controls = ViewControls::default();
        controls.rebuild(view.state().unwrap());
        let x = controls.x.as_mut().unwrap();
        let before = x.hi.clone();
        x.hi = "abc".to_string();
        assert!(x.commit_hi().is_none());
        assert_eq!(x.hi, before);
    }
}

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use approx::assert_relative_eq;
use ndarray::{Array, IxDyn};
use nxplot_core::{NxData, NxField};
use nxplot_view::{
    AxisControl, AxisRef, ControlId, DisplayAxis, PlotConfig, PlotOptions, PlotView,
    PlotViewRegistry, RecordingRenderer, SpinControl, ViewChange,
};

#[allow(clippy::cast_precision_loss)]
fn ramp(shape: &[usize]) -> Arc<NxData> {
    let n: usize = shape.iter().product();
    let values = Array::from_shape_vec(IxDyn(shape), (0..n).map(|i| i as f64).collect()).unwrap();
    NxData::new(NxField::new("counts", values)).shared()
}

fn line(x: std::ops::RangeInclusive<i32>) -> Arc<NxData> {
    let x: Vec<f64> = x.map(f64::from).collect();
    let y: Vec<f64> = x.iter().map(|v| v.sin()).collect();
    NxData::new(NxField::from_vec("y", y))
        .with_axes(vec![NxField::from_vec("x", x)])
        .shared()
}

fn new_view() -> (PlotView, RecordingRenderer) {
    let renderer = RecordingRenderer::new();
    (
        PlotView::new("Figure 1", PlotConfig::default(), renderer.clone()),
        renderer,
    )
}

#[test]
fn test_overlay_never_contracts_limits() {
    let (mut view, renderer) = new_view();
    view.plot(line(0..=10), &PlotOptions::default()).unwrap();
    let before = view.state().unwrap().view_limits();

    view.plot(line(5..=20), &PlotOptions::overlay()).unwrap();
    let state = view.state().unwrap();
    let after = state.view_limits();
    assert_eq!(state.curves().len(), 2);
    assert!(after.x.0 <= before.x.0);
    assert!(after.x.1 >= 20.0);
    assert!(after.y.0 <= before.y.0);
    assert!(after.y.1 >= before.y.1);
    assert_eq!(renderer.last().unwrap().curve_count(), 2);
}

#[test]
fn test_log_limits_stay_positive() {
    let (mut view, _) = new_view();
    let values = Array::from_shape_vec(
        IxDyn(&[3, 4]),
        vec![-5.0, 0.0, 0.5, 2.0, 3.0, -1.0, 0.0, 8.0, 1.0, 4.0, 6.0, 7.0],
    )
    .unwrap();
    view.plot(
        NxData::new(NxField::new("counts", values)).shared(),
        &PlotOptions::default(),
    )
    .unwrap();
    view.set_log(AxisRef::Signal, true).unwrap();
    let signal = view.state().unwrap().signal_axis();
    assert_relative_eq!(signal.lo(), 0.5);
    assert!(signal.hi() > signal.lo());

    view.set_lo(AxisRef::Signal, -3.0).unwrap();
    assert!(view.state().unwrap().signal_axis().lo() > 0.0);
}

#[test]
fn test_locked_window_follows_hi() {
    let (mut view, _) = new_view();
    view.plot(ramp(&[10, 4, 5]), &PlotOptions::default()).unwrap();
    let z = AxisRef::Dim(0);
    view.set_locked(z, false).unwrap();
    view.set_hi(z, 5.0).unwrap();
    view.set_lo(z, 2.0).unwrap();
    view.set_locked(z, true).unwrap();
    view.set_hi(z, 8.0).unwrap();

    let axis = view.state().unwrap().axis(z).unwrap();
    assert_relative_eq!(axis.lo(), 5.0);
    assert_relative_eq!(axis.hi(), 8.0);
    assert_relative_eq!(axis.hi() - axis.lo(), axis.diff());
}

#[test]
fn test_change_axis_swaps_and_demotes() {
    let (mut view, _) = new_view();
    view.plot(ramp(&[3, 4, 5]), &PlotOptions::default()).unwrap();
    view.set_limits(AxisRef::Dim(2), 1.0, 3.0).unwrap();
    let x_limits = view.state().unwrap().x_axis().get_limits();
    let y_limits = view.state().unwrap().y_axis().get_limits();

    view.change_axis(DisplayAxis::X, 1).unwrap();
    let state = view.state().unwrap();
    assert_eq!(state.x(), AxisRef::Dim(1));
    assert_eq!(state.y(), AxisRef::Dim(2));
    assert_eq!(state.x_axis().get_limits(), y_limits);
    assert_eq!(state.y_axis().get_limits(), x_limits);

    view.change_axis(DisplayAxis::Y, 0).unwrap();
    let state = view.state().unwrap();
    assert_eq!(state.y(), AxisRef::Dim(0));
    assert!(!state.y_axis().locked());
    assert_eq!(state.z_dims(), &[2]);
    let demoted = state.axis(AxisRef::Dim(2)).unwrap();
    assert!(demoted.locked());
    assert_relative_eq!(demoted.hi(), demoted.value_from_index(0));

    assert!(view.change_axis(DisplayAxis::X, 7).is_err());
}

#[test]
fn test_controls_round_trip() {
    let (mut view, _) = new_view();
    view.plot(ramp(&[4, 5]), &PlotOptions::default()).unwrap();

    let editor = Rc::new(RefCell::new(AxisControl::new(ControlId(1), AxisRef::Signal)));
    let mirror = Rc::new(RefCell::new(AxisControl::new(ControlId(2), AxisRef::Signal)));
    let editor_calls = Rc::new(RefCell::new(0));
    {
        let signal = view.state().unwrap().signal_axis();
        editor.borrow_mut().sync(signal);
        mirror.borrow_mut().sync(signal);
    }
    {
        let calls = Rc::clone(&editor_calls);
        view.subscribe(Some(ControlId(1)), move |_, _| *calls.borrow_mut() += 1);
        let mirror = Rc::clone(&mirror);
        view.subscribe(Some(ControlId(2)), move |event, state| {
            if let (ViewChange::Limits(axis), Some(state)) = (event.change, state) {
                mirror.borrow_mut().sync(state.axis(axis).unwrap());
            }
        });
    }

    let message = editor.borrow_mut().edit_hi("15").unwrap();
    view.apply(message).unwrap();
    assert_relative_eq!(view.state().unwrap().signal_axis().hi(), 15.0);
    assert_eq!(mirror.borrow().hi_text(), "15");
    assert_eq!(*editor_calls.borrow(), 0);
}

#[test]
fn test_spin_control_steps_slices() {
    let (mut view, _) = new_view();
    view.plot(ramp(&[3, 4, 5]), &PlotOptions::default()).unwrap();
    let mut spin = SpinControl::new(ControlId(7), 0);
    spin.sync(view.state().unwrap().axis(AxisRef::Dim(0)).unwrap());

    let message = spin.step_by(2).unwrap();
    assert!(view.apply(message).unwrap());
    let axis = view.state().unwrap().axis(AxisRef::Dim(0)).unwrap();
    assert_eq!(axis.index_from_value(axis.hi()), 2);

    assert!(spin.step_by(1).is_none());
    assert!(spin.paused());
}

#[test]
fn test_projection_into_second_window() {
    let mut registry = PlotViewRegistry::new();
    let label = registry.next_label();
    let first = registry.insert(PlotView::new(
        label,
        PlotConfig::default(),
        RecordingRenderer::new(),
    ));
    first.plot(ramp(&[3, 4, 5]), &PlotOptions::default()).unwrap();
    first.open_panel().unwrap().set_y(None);
    let projected = first.project().unwrap().shared();

    let label = registry.next_label();
    assert_eq!(label, "Figure 2");
    let second = registry.insert(PlotView::new(
        label,
        PlotConfig::default(),
        RecordingRenderer::new(),
    ));
    second.plot(projected, &PlotOptions::default()).unwrap();
    assert!(second.state().unwrap().is_1d());
    assert_eq!(registry.active_label(), Some("Figure 2"));
    assert_eq!(registry.len(), 2);
}

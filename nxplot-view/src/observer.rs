//! Change notifications from a plot view to the controls showing it.

use crate::controls::ControlId;
use crate::state::{AxisRef, ViewState};

/// What changed in a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    /// New data was plotted or the data was re-read.
    Plotted,
    /// Limits of an axis changed.
    Limits(AxisRef),
    /// Lock state of an axis changed.
    Locked(AxisRef),
    /// Log/linear scale of an axis changed.
    Scale(AxisRef),
    /// Dimensions were remapped to display axes.
    Axes,
    /// A z slice moved.
    Slice(usize),
    /// A zoom box was committed or staged.
    Zoom,
    /// Colormap, interpolation, aspect, skew, autoscale or summing changed.
    Style,
    /// The view closed.
    Closed,
}

/// A change and the control that caused it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeEvent {
    /// What changed.
    pub change: ViewChange,
    /// Control whose message caused the change.
    pub origin: Option<ControlId>,
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Callback = Box<dyn FnMut(&ChangeEvent, Option<&ViewState>)>;

struct Subscriber {
    id: SubscriptionId,
    owner: Option<ControlId>,
    callback: Callback,
}

/// Subscribers of one view.
///
/// A subscriber registered with an owner control is not told about changes
/// that control caused: it already shows the value it just wrote.
#[derive(Default)]
pub struct Observers {
    next: usize,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Observers {
    /// Registers a callback. The view state is `None` for [`ViewChange::Closed`].
    pub fn subscribe<F>(&mut self, owner: Option<ControlId>, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent, Option<&ViewState>) + 'static,
    {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.subscribers.push(Subscriber {
            id,
            owner,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a callback. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Calls every subscriber except the originating control's.
    pub fn notify(&mut self, event: &ChangeEvent, state: Option<&ViewState>) {
        for subscriber in &mut self.subscribers {
            if subscriber.owner.is_some() && subscriber.owner == event.origin {
                continue;
            }
            (subscriber.callback)(event, state);
        }
    }

    /// Drops every subscriber.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_origin_is_skipped() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        for owner in [Some(ControlId(1)), Some(ControlId(2)), None] {
            let seen = Rc::clone(&seen);
            observers.subscribe(owner, move |_, _| seen.borrow_mut().push(owner));
        }
        let event = ChangeEvent {
            change: ViewChange::Limits(AxisRef::Signal),
            origin: Some(ControlId(1)),
        };
        observers.notify(&event, None);
        assert_eq!(*seen.borrow(), vec![Some(ControlId(2)), None]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut observers = Observers::default();
        let id = observers.subscribe(None, |_, _| {});
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        assert!(observers.is_empty());
    }
}

//! Native listener table and synchronous dispatch.
//!
//! The [`Toolkit`] plays the role of the host UI toolkit's event engine: listeners are
//! attached per widget and per event name, and [`trigger`](Toolkit::trigger) invokes them
//! in attachment order.
//!
//! # Reentrancy
//!
//! Listeners run while no internal borrow is held. `trigger` clones the listener list of
//! the widget before invoking anything, so a listener may attach, detach, spawn or destroy
//! widgets (or trigger further events) without corrupting the dispatch in progress.
//! Listeners attached during a dispatch are first invoked by the next trigger.
//!
//! # Failures
//!
//! A listener that panics unwinds out of `trigger`. Listeners after it in the same dispatch
//! do not run. The toolkit does not catch panics.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::trace;

use crate::widget::{Allocator, SpawnError, Widget};

/// A native listener. Receives the event descriptor and the positional payload.
pub type Listener<P> = Rc<dyn Fn(&Event<'_>, &[P])>;

/// Wraps a closure into a [`Listener`].
///
/// Closures passed through here get their argument types from the `Fn` bound, so the
/// usual `|event, args|` form works without annotations.
pub fn listener<P, F>(f: F) -> Listener<P>
where
    F: Fn(&Event<'_>, &[P]) + 'static,
{
    Rc::new(f)
}

/// Descriptor of an event being delivered to a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<'a> {
    name: &'a str,
    target: Widget,
}

impl<'a> Event<'a> {
    /// The event name.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The widget the event is delivered to.
    #[inline]
    pub fn target(&self) -> Widget {
        self.target
    }
}

/// Listener lists keyed by event name.
type EventListeners<P> = HashMap<String, Vec<Listener<P>>>;

/// In-memory widget toolkit carrying payloads of type `P`.
///
/// A toolkit is a single-threaded object. Collections hold it through an `Rc`, see
/// [`Toolkit::shared`].
pub struct Toolkit<P> {
    /// Issues and recycles widgets.
    allocator: Allocator,

    /// Native listeners per live widget.
    listeners: RefCell<HashMap<Widget, EventListeners<P>>>,
}

impl<P> Toolkit<P> {
    /// Creates an empty toolkit.
    pub fn new() -> Self {
        Self {
            allocator: Allocator::new(),
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Creates an empty toolkit behind an `Rc`, ready to back collections.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Creates a new widget.
    ///
    /// # Panics
    ///
    /// Panics if all [`MAX_WIDGETS`](super::MAX_WIDGETS) slots are live.
    pub fn spawn(&self) -> Widget {
        match self.allocator.alloc() {
            Ok(widget) => widget,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates `count` widgets, or none if fewer than `count` slots are left.
    pub fn spawn_many(&self, count: usize) -> Result<Vec<Widget>, SpawnError> {
        self.allocator.alloc_many(count)
    }

    /// Destroys a widget and drops every listener attached to it.
    ///
    /// Returns `false` if the widget was not alive. Collections still holding the widget
    /// keep it as a member, but triggering it becomes a no-op.
    pub fn destroy(&self, widget: Widget) -> bool {
        if !self.allocator.free(widget) {
            return false;
        }
        // Dropped outside the borrow: a listener's captures may own handles into us.
        let dropped = self.listeners.borrow_mut().remove(&widget);
        drop(dropped);
        trace!("destroyed widget {widget}");
        true
    }

    /// Returns `true` if the widget has been spawned by this toolkit and not destroyed.
    #[inline]
    pub fn is_alive(&self, widget: Widget) -> bool {
        self.allocator.is_alive(widget)
    }

    /// Attaches `listener` to `widget` for `event`.
    ///
    /// Attaching the same listener twice is allowed and makes it fire twice per trigger.
    /// Attaching to a dead widget is ignored.
    pub fn on(&self, widget: Widget, event: &str, listener: Listener<P>) {
        if !self.is_alive(widget) {
            trace!("ignoring listener for '{event}' on dead widget {widget}");
            return;
        }
        self.listeners
            .borrow_mut()
            .entry(widget)
            .or_default()
            .entry(event.to_owned())
            .or_default()
            .push(listener);
    }

    /// Detaches every listener for `event` from `widget`. Returns how many were removed.
    pub fn off(&self, widget: Widget, event: &str) -> usize {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(events) = listeners.get_mut(&widget) else {
                return 0;
            };
            let removed = events.remove(event);
            if events.is_empty() {
                listeners.remove(&widget);
            }
            removed
        };
        removed.map_or(0, |list| list.len())
    }

    /// Number of listeners attached to `widget` for `event`.
    pub fn listener_count(&self, widget: Widget, event: &str) -> usize {
        self.listeners
            .borrow()
            .get(&widget)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }

    /// Synchronously invokes every listener attached to `widget` for `event`, in attachment
    /// order, passing `args` as positional payload.
    ///
    /// Returns the number of listeners invoked. Triggering a dead widget invokes nothing.
    pub fn trigger(&self, widget: Widget, event: &str, args: &[P]) -> usize {
        if !self.is_alive(widget) {
            trace!("skipping '{event}' on dead widget {widget}");
            return 0;
        }

        let snapshot: Vec<Listener<P>> = match self.listeners.borrow().get(&widget) {
            Some(events) => events.get(event).cloned().unwrap_or_default(),
            None => Vec::new(),
        };

        trace!(
            "triggering '{event}' on {widget} ({} listeners)",
            snapshot.len()
        );
        let descriptor = Event {
            name: event,
            target: widget,
        };
        for listener in &snapshot {
            listener(&descriptor, args);
        }
        snapshot.len()
    }
}

impl<P> Default for Toolkit<P> {
    fn default() -> Self {
        Self::new()
    }
}

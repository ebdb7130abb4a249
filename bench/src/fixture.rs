//! Shared setup for registry benchmarks.

use std::{cell::Cell, rc::Rc};

use rusty_bus::{
    Registry,
    widget::{Collection, Listener, Toolkit, Widget, listener},
};

/// Payload type used by every benchmark.
pub type Payload = u64;

/// A toolkit, a registry over it, and a pool of spawned widgets.
///
/// Listeners created with [`counting_listener`](Self::counting_listener) add every
/// invocation to [`hits`](Self::hits), so benchmarks can check dispatch actually happened.
pub struct Fixture {
    pub toolkit: Rc<Toolkit<Payload>>,
    pub registry: Registry<Collection<Payload>>,
    pub widgets: Vec<Widget>,
    pub hits: Rc<Cell<u64>>,
}

impl Fixture {
    /// Creates a fixture with `widget_count` live widgets.
    pub fn new(widget_count: usize) -> Self {
        let toolkit = Toolkit::shared();
        let widgets = (0..widget_count).map(|_| toolkit.spawn()).collect();
        Self {
            toolkit,
            registry: Registry::new(),
            widgets,
            hits: Rc::new(Cell::new(0)),
        }
    }

    /// A listener that counts invocations.
    pub fn counting_listener(&self) -> Listener<Payload> {
        let hits = Rc::clone(&self.hits);
        listener(move |_, args: &[Payload]| hits.set(hits.get() + 1 + args.len() as u64))
    }

    /// A collection over the given widgets.
    pub fn collection(&self, widgets: impl IntoIterator<Item = Widget>) -> Collection<Payload> {
        Collection::of(&self.toolkit, widgets)
    }

    /// Subscribes every widget to `event` as one collection.
    pub fn subscribe_all(&self, event: &str) {
        let target = self.collection(self.widgets.iter().copied());
        if !target.widgets().is_empty() {
            let _ = self
                .registry
                .subscribe(&target, event, self.counting_listener());
        }
    }

    /// Subscribes every widget to `event` one at a time, growing the aggregate by union.
    pub fn subscribe_each(&self, event: &str) {
        for widget in &self.widgets {
            let target = Collection::single(&self.toolkit, *widget);
            let _ = self
                .registry
                .subscribe(&target, event, self.counting_listener());
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_bus::Handle;

    use super::*;

    #[test]
    fn subscribe_each_builds_full_aggregate() {
        // Given
        let fixture = Fixture::new(16);

        // When
        fixture.subscribe_each("e");

        // Then
        assert_eq!(fixture.registry.subscribers("e").unwrap().len(), 16);
    }

    #[test]
    fn counting_listener_counts_dispatch() {
        // Given
        let fixture = Fixture::new(4);
        fixture.subscribe_all("e");

        // When
        fixture.registry.publish_with("e", &[1, 2]);

        // Then - 4 widgets x (1 call + 2 args)
        assert_eq!(fixture.hits.get(), 12);
    }
}

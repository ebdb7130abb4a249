//! Event-name keyed subscription registry.
//!
//! This module provides [`Registry`], which tracks, per event name, the aggregate of every
//! target subscribed to that name and routes published events to it.
//!
//! # Overview
//!
//! The registry owns a map from event name to one aggregate [`Handle`]:
//! - **Subscribe**: attaches the listener natively on the target, then folds the target into
//!   the aggregate with [`Handle::union`]. The first subscriber becomes the aggregate.
//! - **Publish**: dispatches the event on every member of the aggregate.
//! - **Unsubscribe**: reduces the aggregate with [`Handle::difference`]. An aggregate that
//!   becomes empty is removed from the map, so every stored aggregate has at least one
//!   member.
//!
//! Publishing or unsubscribing an event name with no aggregate is not an error; both
//! return `false`.
//!
//! # Reentrancy
//!
//! All operations take `&self`. A listener can hold an `Rc<Registry<_>>` and subscribe,
//! unsubscribe or publish while a dispatch is running. `publish` clones the aggregate and
//! releases the map before dispatching, so the running dispatch always walks the members
//! that were subscribed when it started. Changes made by listeners apply to the next
//! publish.
//!
//! Native detaches requested by an unsubscribe during a publish are queued and run when the
//! outermost publish returns, so members still ahead in the running dispatch keep their
//! listeners until it is over. A member subscribed again before that point has its queued
//! detach applied right away, before the new listener is attached.
//!
//! # Failures
//!
//! A listener that panics unwinds through the native layer and through `publish`. The
//! registry does not catch it and its map is left as it was before the publish.
//!
//! # Example
//!
//! ```rust,ignore
//! use rusty_bus::{Registry, widget::{Collection, Toolkit, listener}};
//!
//! let toolkit = Toolkit::<String>::shared();
//! let registry = Registry::new();
//!
//! let header = Collection::single(&toolkit, toolkit.spawn());
//! registry.subscribe(&header, "login", listener(|ev, args| {
//!     println!("{} got {} with {:?}", ev.target(), ev.name(), args);
//! }))?;
//!
//! assert!(registry.publish_with("login", &["alice".to_string()]));
//! assert!(registry.unsubscribe(&header, "login"));
//! assert!(!registry.publish("login"));
//! ```

mod config;
mod error;

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
};

use log::{debug, trace};

use crate::handle::Handle;

pub use config::Config;
pub use error::Error;

/// Subscription registry over handles of type `H`.
///
/// The registry is a single-threaded object (`!Sync`). Create one per application, or one
/// per test, and share it by reference or `Rc`.
///
/// # Invariants
///
/// - Every stored aggregate has at least one member.
/// - `publish` never changes the map.
pub struct Registry<H: Handle> {
    config: Config,

    /// Aggregate handle per event name.
    aggregates: RefCell<HashMap<String, H>>,

    /// Number of publishes currently dispatching.
    depth: Cell<usize>,

    /// Removed members waiting for the outermost publish to return before detaching.
    pending_detach: RefCell<Vec<(String, H)>>,
}

impl<H: Handle> Registry<H> {
    /// Creates an empty registry with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::DEFAULT)
    }

    /// Creates an empty registry.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            aggregates: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
            pending_detach: RefCell::new(Vec::new()),
        }
    }

    /// The configuration the registry was built with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribes every member of `target` to `event`.
    ///
    /// `listener` is attached natively on `target` unconditionally, even when `target` is
    /// already part of the aggregate. Aggregate membership never holds duplicates.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyEventName`] if `event` is empty.
    /// - [`Error::EmptyTarget`] if `target` has no members.
    ///
    /// Nothing is attached or recorded when an error is returned.
    pub fn subscribe(
        &self,
        target: &H,
        event: &str,
        listener: H::Listener,
    ) -> Result<(), Error> {
        if event.is_empty() {
            return Err(Error::EmptyEventName);
        }
        if target.is_empty() {
            return Err(Error::EmptyTarget {
                event: event.to_owned(),
            });
        }

        self.settle_pending_detach(target, event);
        target.attach(event, listener);

        let mut aggregates = self.aggregates.borrow_mut();
        match aggregates.get_mut(event) {
            Some(aggregate) => {
                let merged = aggregate.union(target);
                debug!(
                    "subscribed {} to '{event}', aggregate {} -> {}",
                    target.len(),
                    aggregate.len(),
                    merged.len()
                );
                *aggregate = merged;
            }
            None => {
                debug!("subscribed {} to new event '{event}'", target.len());
                aggregates.insert(event.to_owned(), target.clone());
            }
        }
        Ok(())
    }

    /// Publishes `event` without payload.
    ///
    /// Returns `false` if nothing is subscribed to `event`, `true` once the dispatch ran.
    pub fn publish(&self, event: &str) -> bool {
        self.fire(event, &[])
    }

    /// Publishes `event`, passing `payload` to every listener as positional arguments.
    ///
    /// Returns `false` if nothing is subscribed to `event`, `true` once the dispatch ran.
    pub fn publish_with(&self, event: &str, payload: &[H::Payload]) -> bool {
        self.fire(event, payload)
    }

    fn fire(&self, event: &str, args: &[H::Payload]) -> bool {
        let snapshot = self.aggregates.borrow().get(event).cloned();
        let Some(aggregate) = snapshot else {
            debug!("publish '{event}': no subscribers");
            return false;
        };

        trace!(
            "publish '{event}' to {} members, {} args",
            aggregate.len(),
            args.len()
        );
        let _dispatching = DispatchGuard::enter(self);
        aggregate.dispatch(event, args);
        true
    }

    /// Removes the members of `target` from the aggregate for `event`.
    ///
    /// Returns `false` if nothing is subscribed to `event`. Otherwise returns `true`, even
    /// if `target` shared no member with the aggregate. When the aggregate becomes empty
    /// the event name is dropped from the registry.
    ///
    /// With [`Config::detach_on_unsubscribe`] set, the native listeners for `event` are
    /// detached from exactly the members that were removed. Called from a listener, the
    /// detach waits until the outermost publish returns.
    pub fn unsubscribe(&self, target: &H, event: &str) -> bool {
        let removed = {
            let mut aggregates = self.aggregates.borrow_mut();
            let Some(aggregate) = aggregates.get_mut(event) else {
                debug!("unsubscribe '{event}': no subscribers");
                return false;
            };

            let reduced = aggregate.difference(target);
            let removed = self
                .config
                .detach_on_unsubscribe
                .then(|| aggregate.difference(&reduced));
            debug!(
                "unsubscribed from '{event}', aggregate {} -> {}",
                aggregate.len(),
                reduced.len()
            );

            if reduced.is_empty() {
                aggregates.remove(event);
                debug!("'{event}' has no subscribers left");
            } else {
                *aggregate = reduced;
            }
            removed
        };

        if let Some(removed) = removed.filter(|r| !r.is_empty()) {
            if self.depth.get() > 0 {
                trace!("deferring detach of {} from '{event}'", removed.len());
                self.pending_detach
                    .borrow_mut()
                    .push((event.to_owned(), removed));
            } else {
                removed.detach(event);
            }
        }
        true
    }

    /// Detaches queued members of `target` now, so the listener about to be attached for
    /// `event` survives the flush at the end of the running publish.
    fn settle_pending_detach(&self, target: &H, event: &str) {
        let overlaps: Vec<H> = {
            let mut pending = self.pending_detach.borrow_mut();
            if pending.is_empty() {
                return;
            }
            let mut overlaps = Vec::new();
            for (_, removed) in pending.iter_mut().filter(|(name, _)| name.as_str() == event) {
                let kept = removed.difference(target);
                let overlap = removed.difference(&kept);
                if !overlap.is_empty() {
                    overlaps.push(overlap);
                }
                *removed = kept;
            }
            pending.retain(|(_, removed)| !removed.is_empty());
            overlaps
        };
        for overlap in overlaps {
            overlap.detach(event);
        }
    }

    fn flush_pending_detach(&self) {
        let pending = std::mem::take(&mut *self.pending_detach.borrow_mut());
        for (event, removed) in pending {
            trace!("detaching {} deferred from '{event}'", removed.len());
            removed.detach(&event);
        }
    }

    /// A snapshot of the aggregate for `event`.
    pub fn subscribers(&self, event: &str) -> Option<H> {
        self.aggregates.borrow().get(event).cloned()
    }

    /// Returns `true` if `event` has at least one subscriber.
    pub fn is_subscribed(&self, event: &str) -> bool {
        self.aggregates.borrow().contains_key(event)
    }

    /// Number of event names with subscribers.
    pub fn len(&self) -> usize {
        self.aggregates.borrow().len()
    }

    /// Returns `true` if no event has subscribers.
    pub fn is_empty(&self) -> bool {
        self.aggregates.borrow().is_empty()
    }

    /// Event names with subscribers, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.aggregates.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Tracks publish nesting. Leaving the outermost publish, normally or by unwinding, runs
/// the detaches queued while it was dispatching.
struct DispatchGuard<'a, H: Handle> {
    registry: &'a Registry<H>,
}

impl<'a, H: Handle> DispatchGuard<'a, H> {
    fn enter(registry: &'a Registry<H>) -> Self {
        registry.depth.set(registry.depth.get() + 1);
        Self { registry }
    }
}

impl<H: Handle> Drop for DispatchGuard<'_, H> {
    fn drop(&mut self) {
        let depth = self.registry.depth.get() - 1;
        self.registry.depth.set(depth);
        if depth == 0 {
            self.registry.flush_pending_detach();
        }
    }
}

impl<H: Handle> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Handle + fmt::Debug> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("aggregates", &self.aggregates.borrow())
            .finish()
    }
}

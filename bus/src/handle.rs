//! The capability set a subscriber handle must provide.
//!
//! A [`Handle`] stands for a collection of zero or more concrete targets that live in some
//! native dispatch layer. The [`Registry`](crate::Registry) only ever combines handles with
//! [`union`](Handle::union) and [`difference`](Handle::difference), asks for their
//! [`len`](Handle::len), and forwards listener attachment and dispatch to them. It never
//! looks at individual targets.
//!
//! Handles are values. Combining two handles returns a new handle and leaves both inputs
//! untouched, so the registry can store the caller's handle as-is and later replace it
//! wholesale.
//!
//! # Implementations
//!
//! - [`Collection`](crate::widget::Collection): widgets of the in-memory
//!   [`Toolkit`](crate::widget::Toolkit).
//!
//! Test doubles only need to provide the methods below.

/// A set of subscriber targets backed by a native dispatch layer.
///
/// Set operations compare targets by identity, never by value: two targets that merely
/// look alike are still distinct members.
pub trait Handle: Clone {
    /// The native listener type accepted by [`attach`](Self::attach).
    type Listener;

    /// Element type of an event payload.
    type Payload;

    /// Attaches `listener` for `event` on every member.
    ///
    /// Attaching to a member that already has the same listener is the native layer's
    /// business; it may fire twice.
    fn attach(&self, event: &str, listener: Self::Listener);

    /// Detaches every listener for `event` from every member.
    fn detach(&self, event: &str);

    /// Synchronously fires `event` on every member, passing `args` as positional payload.
    /// An empty slice means no payload.
    fn dispatch(&self, event: &str, args: &[Self::Payload]);

    /// Members of `self` followed by the members of `other` not already present.
    fn union(&self, other: &Self) -> Self;

    /// Members of `self` that are not members of `other`, in their original order.
    fn difference(&self, other: &Self) -> Self;

    /// Number of members.
    fn len(&self) -> usize;

    /// Returns `true` if the handle has no members.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

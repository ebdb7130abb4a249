//! Process-local publish/subscribe over a native event dispatch layer.
//!
//! Components subscribe collections of targets to named events and publish events by name,
//! without holding references to each other. The [`Registry`] keeps, per event name, one
//! aggregate of every subscribed target and asks the native layer to dispatch to it.
//!
//! - [`handle`]: the [`Handle`] capability set the registry is generic over.
//! - [`registry`]: the [`Registry`] itself, its [`Config`] and [`Error`].
//! - [`widget`]: an in-memory toolkit implementing the native layer.

pub mod handle;
pub mod registry;
pub mod widget;

pub use handle::Handle;
pub use registry::{Config, Error, Registry};

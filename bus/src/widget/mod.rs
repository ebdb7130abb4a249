//! In-memory widget toolkit used as the native dispatch layer.
//!
//! The registry in [`crate::registry`] never talks to widgets directly; it only sees
//! [`Handle`](crate::Handle) values. This module provides a small, self-contained toolkit
//! that implements the native side of that contract so the registry can be driven by the
//! shell, the benchmarks and the tests.
//!
//! # Architecture
//!
//! - **[`Widget`]**: A concrete subscriber target. A widget combines an [`Id`] (its slot)
//!   and a [`Generation`]. Two widgets are the same target only if both match, which is
//!   what identity-based union and difference rely on.
//!
//! - **[`Allocator`]**: Hands out widgets and recycles freed slots. Freeing a widget bumps
//!   the generation of its slot, so a handle still holding the old widget no longer refers
//!   to a live target. Running out of slots is reported as a [`SpawnError`].
//!
//! - **[`Toolkit`]**: Owns the allocator and the native listener table. It attaches,
//!   detaches and triggers listeners per widget.
//!
//! - **[`Collection`]**: An ordered, deduplicated set of widgets from one toolkit. This is
//!   the [`Handle`](crate::Handle) implementation stored in the registry.

mod collection;
mod toolkit;

use std::{cell::RefCell, collections::VecDeque, fmt};

use fixedbitset::FixedBitSet;
use thiserror::Error;

pub use collection::Collection;
pub use toolkit::{Event, Listener, Toolkit, listener};

/// Number of slots an allocator can hand out. Slot ids are `u32`, with `u32::MAX` unused.
pub const MAX_WIDGETS: usize = u32::MAX as usize;

/// The generation of a widget slot. Starts at zero and advances every time the slot is
/// freed, wrapping after `u32::MAX` frees of the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    const FIRST: Self = Self(0);

    /// The generation a slot moves to when its widget is freed.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A widget slot identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// The raw slot number.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// A concrete subscriber target.
///
/// Widgets are cheap `Copy` handles. Equality is identity: the same slot in the same
/// generation. A widget whose slot has been freed is stale and is ignored by the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Widget {
    id: Id,
    generation: Generation,
}

impl Widget {
    #[inline]
    pub(crate) const fn new(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// The slot this widget occupies.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The generation of the slot this widget was issued for.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Index of the slot, for slot-indexed storage such as bitsets.
    #[inline]
    pub fn index(&self) -> usize {
        self.id.0 as usize
    }
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == Generation::FIRST {
            write!(f, "#{}", self.id.0)
        } else {
            write!(f, "#{}.{}", self.id.0, self.generation.0)
        }
    }
}

/// Not enough free slots for a spawn request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot spawn {requested} widgets, {available} slots left")]
pub struct SpawnError {
    pub requested: usize,
    pub available: usize,
}

/// Slot bookkeeping behind the allocator's `RefCell`.
#[derive(Debug, Default)]
struct Slots {
    /// Current generation per issued slot.
    generations: Vec<Generation>,

    /// Slots holding a live widget.
    live: FixedBitSet,

    /// Freed slots, oldest first.
    free: VecDeque<Id>,
}

impl Slots {
    fn available(&self) -> usize {
        self.free.len() + (MAX_WIDGETS - self.generations.len())
    }

    /// Reuses the oldest freed slot, or opens a fresh one.
    fn issue(&mut self) -> Option<Widget> {
        let id = match self.free.pop_front() {
            Some(id) => id,
            None => {
                let id = u32::try_from(self.generations.len())
                    .ok()
                    .filter(|id| (*id as usize) < MAX_WIDGETS)?;
                self.generations.push(Generation::FIRST);
                self.live.grow(self.generations.len());
                Id(id)
            }
        };
        let index = id.0 as usize;
        self.live.insert(index);
        Some(Widget::new(id, self.generations[index]))
    }

    fn is_live(&self, widget: Widget) -> bool {
        let index = widget.index();
        self.live.contains(index) && self.generations.get(index) == Some(&widget.generation)
    }
}

/// Issues widgets for one toolkit and recycles freed slots.
///
/// Freed slots are reused oldest first, before fresh slots are opened. A slot's generation
/// advances on free, so widgets issued before the free compare unequal to the reissued
/// widget and fail [`is_alive`](Self::is_alive).
///
/// The allocator is single-threaded like the toolkit that owns it.
#[derive(Debug, Default)]
pub struct Allocator {
    slots: RefCell<Slots>,
}

impl Allocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates one widget.
    ///
    /// # Errors
    ///
    /// [`SpawnError`] once all [`MAX_WIDGETS`] slots are live.
    pub fn alloc(&self) -> Result<Widget, SpawnError> {
        let mut slots = self.slots.borrow_mut();
        slots.issue().ok_or(SpawnError {
            requested: 1,
            available: 0,
        })
    }

    /// Allocates `count` widgets, or none at all if fewer than `count` slots are left.
    ///
    /// # Errors
    ///
    /// [`SpawnError`] if `count` exceeds the slots left.
    pub fn alloc_many(&self, count: usize) -> Result<Vec<Widget>, SpawnError> {
        let mut slots = self.slots.borrow_mut();
        let available = slots.available();
        if count > available {
            return Err(SpawnError {
                requested: count,
                available,
            });
        }
        Ok((0..count).map_while(|_| slots.issue()).collect())
    }

    /// Frees a widget. Freeing a stale widget is a no-op and returns `false`.
    pub fn free(&self, widget: Widget) -> bool {
        let mut slots = self.slots.borrow_mut();
        if !slots.is_live(widget) {
            return false;
        }
        let index = widget.index();
        slots.generations[index] = widget.generation.next();
        slots.live.set(index, false);
        slots.free.push_back(widget.id);
        true
    }

    /// Returns `true` if `widget` was issued by this allocator and has not been freed.
    pub fn is_alive(&self, widget: Widget) -> bool {
        self.slots.borrow().is_live(widget)
    }
}

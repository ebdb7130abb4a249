use std::{fmt, rc::Rc};

use fixedbitset::FixedBitSet;

use crate::{
    handle::Handle,
    widget::{Listener, Toolkit, Widget},
};

/// An ordered, deduplicated set of widgets belonging to one [`Toolkit`].
///
/// Members keep insertion order, which is also the order events are dispatched in. A
/// `FixedBitSet` over widget slots gives O(1) membership tests. The toolkit never has two
/// live widgets in the same slot, so for live widgets the slot bit is an exact identity
/// test.
///
/// Widgets destroyed after they joined a collection stay members until the collection is
/// next combined with [`union`](Handle::union) or [`difference`](Handle::difference),
/// which drop them. Dispatch skips them in the meantime.
pub struct Collection<P> {
    toolkit: Rc<Toolkit<P>>,
    members: Vec<Widget>,
    bitset: FixedBitSet,
}

impl<P> Collection<P> {
    /// Creates an empty collection.
    pub fn new(toolkit: &Rc<Toolkit<P>>) -> Self {
        Self {
            toolkit: Rc::clone(toolkit),
            members: Vec::new(),
            bitset: FixedBitSet::new(),
        }
    }

    /// Creates a collection from widgets, dropping duplicates and dead widgets.
    pub fn of(toolkit: &Rc<Toolkit<P>>, widgets: impl IntoIterator<Item = Widget>) -> Self {
        let mut collection = Self::new(toolkit);
        for widget in widgets {
            if toolkit.is_alive(widget) && !collection.bitset.contains(widget.index()) {
                collection.push(widget);
            }
        }
        collection
    }

    /// Creates a collection holding a single widget.
    pub fn single(toolkit: &Rc<Toolkit<P>>, widget: Widget) -> Self {
        Self::of(toolkit, [widget])
    }

    /// The toolkit the members belong to.
    #[inline]
    pub fn toolkit(&self) -> &Rc<Toolkit<P>> {
        &self.toolkit
    }

    /// Returns `true` if `widget` is a live member.
    pub fn contains(&self, widget: Widget) -> bool {
        self.bitset.contains(widget.index())
            && self.toolkit.is_alive(widget)
            && self.members.contains(&widget)
    }

    /// Iterates members in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = Widget> + '_ {
        self.members.iter().copied()
    }

    /// Members in dispatch order.
    #[inline]
    pub fn widgets(&self) -> &[Widget] {
        &self.members
    }

    fn push(&mut self, widget: Widget) {
        let index = widget.index();
        if index >= self.bitset.len() {
            self.bitset.grow(index + 1);
        }
        self.bitset.insert(index);
        self.members.push(widget);
    }

    /// Copy without destroyed widgets.
    fn live(&self) -> Self {
        if self.members.iter().all(|w| self.toolkit.is_alive(*w)) {
            return self.clone();
        }
        Self::of(&self.toolkit, self.members.iter().copied())
    }

    fn assert_same_toolkit(&self, other: &Self) {
        assert!(
            Rc::ptr_eq(&self.toolkit, &other.toolkit),
            "Cannot combine collections from different toolkits"
        );
    }
}

impl<P> Clone for Collection<P> {
    fn clone(&self) -> Self {
        Self {
            toolkit: Rc::clone(&self.toolkit),
            members: self.members.clone(),
            bitset: self.bitset.clone(),
        }
    }
}

impl<P> fmt::Debug for Collection<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}

impl<P> Handle for Collection<P> {
    type Listener = Listener<P>;
    type Payload = P;

    fn attach(&self, event: &str, listener: Listener<P>) {
        for &widget in &self.members {
            self.toolkit.on(widget, event, Rc::clone(&listener));
        }
    }

    fn detach(&self, event: &str) {
        for &widget in &self.members {
            self.toolkit.off(widget, event);
        }
    }

    fn dispatch(&self, event: &str, args: &[P]) {
        for &widget in &self.members {
            self.toolkit.trigger(widget, event, args);
        }
    }

    /// # Panics
    ///
    /// Panics if the collections belong to different toolkits.
    fn union(&self, other: &Self) -> Self {
        self.assert_same_toolkit(other);
        let mut merged = self.live();
        for &widget in &other.members {
            if self.toolkit.is_alive(widget) && !merged.bitset.contains(widget.index()) {
                merged.push(widget);
            }
        }
        merged
    }

    /// # Panics
    ///
    /// Panics if the collections belong to different toolkits.
    fn difference(&self, other: &Self) -> Self {
        self.assert_same_toolkit(other);
        let removed = other.live();
        Self::of(
            &self.toolkit,
            self.members
                .iter()
                .copied()
                .filter(|w| !removed.bitset.contains(w.index())),
        )
    }

    #[inline]
    fn len(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::widget::listener;

    fn toolkit() -> Rc<Toolkit<u32>> {
        Toolkit::shared()
    }

    // ==================== Construction ====================

    #[test]
    fn of_deduplicates_and_keeps_order() {
        // Given
        let tk = toolkit();
        let [a, b, c] = [tk.spawn(), tk.spawn(), tk.spawn()];

        // When
        let collection = Collection::of(&tk, [c, a, c, b, a]);

        // Then
        assert_eq!(collection.widgets(), &[c, a, b]);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn of_drops_dead_widgets() {
        // Given
        let tk = toolkit();
        let a = tk.spawn();
        let b = tk.spawn();
        tk.destroy(a);

        // When
        let collection = Collection::of(&tk, [a, b]);

        // Then
        assert_eq!(collection.widgets(), &[b]);
    }

    #[test]
    fn new_is_empty() {
        let tk = toolkit();
        let collection = Collection::new(&tk);
        assert!(collection.is_empty());
        assert_eq!(collection.len(), 0);
    }

    // ==================== Union ====================

    #[test]
    fn union_deduplicates_by_identity() {
        // Given
        let tk = toolkit();
        let [a, b, c] = [tk.spawn(), tk.spawn(), tk.spawn()];
        let left = Collection::of(&tk, [a, b]);
        let right = Collection::of(&tk, [b, c]);

        // When
        let merged = left.union(&right);

        // Then - |A ∪ B| with left order first
        assert_eq!(merged.widgets(), &[a, b, c]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn union_with_self_is_identity() {
        // Given
        let tk = toolkit();
        let collection = Collection::of(&tk, tk.spawn_many(4).unwrap());

        // When
        let merged = collection.union(&collection);

        // Then
        assert_eq!(merged.widgets(), collection.widgets());
    }

    #[test]
    fn union_leaves_inputs_untouched() {
        // Given
        let tk = toolkit();
        let [a, b] = [tk.spawn(), tk.spawn()];
        let left = Collection::single(&tk, a);
        let right = Collection::single(&tk, b);

        // When
        let _ = left.union(&right);

        // Then
        assert_eq!(left.widgets(), &[a]);
        assert_eq!(right.widgets(), &[b]);
    }

    #[test]
    fn union_accepts_reissued_slot() {
        // Given - Aggregate still holds a widget that was destroyed
        let tk = toolkit();
        let stale = tk.spawn();
        let aggregate = Collection::single(&tk, stale);
        tk.destroy(stale);
        let reissued = tk.spawn();

        // When
        let merged = aggregate.union(&Collection::single(&tk, reissued));

        // Then
        assert_eq!(reissued.id(), stale.id());
        assert_eq!(merged.widgets(), &[reissued]);
        assert!(merged.contains(reissued));
        assert!(!merged.contains(stale));
    }

    #[test]
    #[should_panic(expected = "different toolkits")]
    fn union_across_toolkits_panics() {
        let tk1 = toolkit();
        let tk2 = toolkit();
        let left = Collection::single(&tk1, tk1.spawn());
        let right = Collection::single(&tk2, tk2.spawn());

        let _ = left.union(&right);
    }

    // ==================== Difference ====================

    #[test]
    fn difference_removes_only_shared_members() {
        // Given
        let tk = toolkit();
        let [a, b, c, d] = [tk.spawn(), tk.spawn(), tk.spawn(), tk.spawn()];
        let aggregate = Collection::of(&tk, [a, b, c]);
        let target = Collection::of(&tk, [b, d]);

        // When
        let reduced = aggregate.difference(&target);

        // Then - d was never a member, a and c keep their order
        assert_eq!(reduced.widgets(), &[a, c]);
        assert!(!reduced.contains(b));
    }

    #[test]
    fn difference_with_self_is_empty() {
        let tk = toolkit();
        let collection = Collection::of(&tk, tk.spawn_many(3).unwrap());

        assert!(collection.difference(&collection).is_empty());
    }

    #[test]
    fn difference_with_stale_target_keeps_reissued_member() {
        // Given - Target references the old generation of a reused slot
        let tk = toolkit();
        let stale = tk.spawn();
        let target = Collection::single(&tk, stale);
        tk.destroy(stale);
        let reissued = tk.spawn();
        let aggregate = Collection::single(&tk, reissued);

        // When
        let reduced = aggregate.difference(&target);

        // Then
        assert_eq!(reduced.widgets(), &[reissued]);
    }

    // ==================== Native Layer ====================

    #[test]
    fn dispatch_fires_members_in_order() {
        // Given
        let tk = toolkit();
        let widgets = tk.spawn_many(3).unwrap();
        let collection = Collection::of(&tk, widgets.iter().rev().copied());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        collection.attach(
            "e",
            listener(move |ev, args: &[u32]| s.borrow_mut().push((ev.target(), args.to_vec()))),
        );

        // When
        collection.dispatch("e", &[7]);

        // Then
        let expected: Vec<_> = widgets.iter().rev().map(|w| (*w, vec![7])).collect();
        assert_eq!(*seen.borrow(), expected);
    }

    #[test]
    fn detach_removes_listeners_from_members() {
        // Given
        let tk = toolkit();
        let collection = Collection::of(&tk, tk.spawn_many(2).unwrap());
        collection.attach("e", listener(|_, _| {}));

        // When
        collection.detach("e");

        // Then
        for w in collection.iter() {
            assert_eq!(tk.listener_count(w, "e"), 0);
        }
    }
}

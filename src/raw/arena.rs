use alloc::vec::Vec;

use super::handle::Handle;

#[derive(Clone)]
struct Slot<T> {
    // Bumped every time the slot is vacated, invalidating outstanding handles.
    generation: u32,
    element: Option<T>,
}

/// Generational slot arena. Vacated slots are reused, but never under a handle issued earlier.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    // Slots whose generation is exhausted. They stay empty for good.
    retired: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len() + self.retired)
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(index) = self.free.pop() {
            // Reuse a vacated slot under its current generation.
            let slot = &mut self.slots[index];
            slot.element = Some(element);
            Handle::new(index, slot.generation)
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot {
                generation: 0,
                element: Some(element),
            });
            Handle::new(self.slots.len() - 1, 0)
        }
    }

    /// Returns true if `handle` refers to a live element.
    #[inline]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        self.try_get(handle).is_some()
    }

    #[inline]
    pub(crate) fn try_get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.element.as_ref())
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.try_get(handle).expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.element.as_mut())
            .expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns mutable references to two distinct live elements.
    pub(crate) fn get2_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        assert!(a.index() != b.index(), "`Arena::get2_mut()` - handles alias the same slot!");
        assert!(self.contains(a) && self.contains(b), "`Arena::get2_mut()` - `handle` is invalid!");

        let (low, high, swapped) = if a.index() < b.index() { (a, b, false) } else { (b, a, true) };
        let (head, tail) = self.slots.split_at_mut(high.index());
        let low = head[low.index()].element.as_mut().expect("`Arena::get2_mut()` - `handle` is invalid!");
        let high = tail[0].element.as_mut().expect("`Arena::get2_mut()` - `handle` is invalid!");

        if swapped { (high, low) } else { (low, high) }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = &mut self.slots[handle.index()];
        assert!(slot.generation == handle.generation(), "`Arena::take()` - `handle` is invalid!");
        let element = slot.element.take().expect("`Arena::take()` - `handle` is invalid!");
        self.vacate(handle.index());
        element
    }

    /// Drops every element. Slots are kept for reuse, and every outstanding handle goes stale.
    pub(crate) fn clear(&mut self) {
        for index in 0..self.slots.len() {
            if self.slots[index].element.take().is_some() {
                self.vacate(index);
            }
        }
    }

    /// Bumps the generation of an emptied slot and frees it, or retires it once the generation
    /// can no longer be bumped.
    fn vacate(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                self.free.push(index);
            }
            None => self.retired += 1,
        }
    }
}

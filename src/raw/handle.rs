use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// A slot index paired with the generation of the slot it was issued for.
///
/// The index is stored off-by-one in a `NonZero` so `Option<Handle>` costs nothing extra.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct Handle {
    index: NonZero<RawHandle>,
    generation: u32,
}

impl Handle {
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        assert!(index <= Self::MAX, "`Handle::new()` - `index` > `Handle::MAX`!");
        // `index + 1` cannot be zero and cannot overflow.
        Self {
            index: NonZero::new((index + 1) as RawHandle).unwrap(),
            generation,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.index.get() - 1) as usize
    }

    #[inline]
    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

use std::ops::{Index, IndexMut};
use tracing::trace;

pub(crate) trait Resettable {
    fn reset(&mut self);
}

/// Slot index plus the generation it was handed out under. A handle goes
/// stale as soon as its slot is freed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Handle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

struct Slot<T> {
    value: T,
    generation: u32,
    live: bool,
}

/// Allocation counters for one pool. `allocated` only ever grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PoolUsage {
    pub allocated: usize,
    pub free: usize,
}

impl PoolUsage {
    pub fn live(&self) -> usize {
        self.allocated - self.free
    }
}

/// Arena of reusable values addressed by generation-checked handles.
/// Freed slots are reset and pushed on a LIFO free list; storage is never
/// released while the pool lives.
pub(crate) struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Pool<T>
where
    T: Resettable + Default,
{
    pub(crate) fn new(prewarm: usize) -> Self {
        let mut pool = Pool {
            slots: Vec::with_capacity(prewarm),
            free: Vec::with_capacity(prewarm),
        };
        pool.fill(prewarm);
        pool
    }

    /// Allocates `count` more idle slots.
    fn fill(&mut self, count: usize) {
        let start = self.slots.len();
        for _ in 0..count {
            self.slots.push(Slot {
                value: T::default(),
                generation: 0,
                live: false,
            });
        }
        // Lowest index comes out first.
        self.free.extend((start..start + count).rev().map(|i| i as u32));
    }

    pub(crate) fn obtain(&mut self) -> Handle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.slots.len() as u32;
                trace!(allocated = index + 1, "pool exhausted, growing");
                self.slots.push(Slot {
                    value: T::default(),
                    generation: 0,
                    live: false,
                });
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.live = true;
        Handle {
            index,
            generation: slot.generation,
        }
    }

    /// Resets the value and recycles the slot. Returns false, leaving the
    /// pool untouched, when `handle` is stale.
    pub(crate) fn free(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        slot.value.reset();
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        true
    }

    /// Frees every handle in order, skipping stale ones. Returns how many
    /// were freed.
    pub(crate) fn free_all<I>(&mut self, handles: I) -> usize
    where
        I: IntoIterator<Item = Handle>,
    {
        let mut freed = 0;
        for handle in handles {
            if self.free(handle) {
                freed += 1;
            }
        }
        freed
    }
}

impl<T> Pool<T> {
    fn slot_mut(&mut self, handle: Handle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
    }

    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| &mut slot.value)
    }

    pub(crate) fn usage(&self) -> PoolUsage {
        PoolUsage {
            allocated: self.slots.len(),
            free: self.free.len(),
        }
    }
}

impl<T> Index<Handle> for Pool<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, handle: Handle) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("stale pool handle {}:{}", handle.index, handle.generation),
        }
    }
}

impl<T> IndexMut<Handle> for Pool<T> {
    #[inline(always)]
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        match self.slot_mut(handle) {
            Some(slot) => &mut slot.value,
            None => panic!("stale pool handle {}:{}", handle.index, handle.generation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pool, PoolUsage, Resettable};

    #[derive(Default)]
    struct Counter {
        value: u32,
        resets: u32,
    }

    impl Resettable for Counter {
        fn reset(&mut self) {
            self.value = 0;
            self.resets += 1;
        }
    }

    #[test]
    fn prewarmed_pool_hands_out_lowest_index_first() {
        let mut pool = Pool::<Counter>::new(3);
        assert_eq!(
            pool.usage(),
            PoolUsage {
                allocated: 3,
                free: 3
            }
        );
        let a = pool.obtain();
        let b = pool.obtain();
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
        assert_eq!(pool.usage().live(), 2);
    }

    #[test]
    fn pool_grows_when_exhausted() {
        let mut pool = Pool::<Counter>::new(1);
        let _ = pool.obtain();
        let grown = pool.obtain();
        assert_eq!(grown.index, 1);
        assert_eq!(
            pool.usage(),
            PoolUsage {
                allocated: 2,
                free: 0
            }
        );
    }

    #[test]
    fn free_resets_and_recycles_slot() {
        let mut pool = Pool::<Counter>::new(0);
        let handle = pool.obtain();
        pool[handle].value = 42;
        assert!(pool.free(handle));

        let reused = pool.obtain();
        assert_eq!(reused.index, handle.index);
        assert_ne!(reused.generation, handle.generation);
        assert_eq!(pool[reused].value, 0);
        assert_eq!(pool[reused].resets, 1);
        assert_eq!(pool.usage().allocated, 1);
    }

    #[test]
    fn double_free_is_rejected() {
        let mut pool = Pool::<Counter>::new(2);
        let handle = pool.obtain();
        assert!(pool.free(handle));
        assert!(!pool.free(handle));
        assert_eq!(pool.usage().free, 2);
        assert!(pool.get(handle).is_none());
        assert!(pool.get_mut(handle).is_none());
    }

    #[test]
    fn stale_handle_does_not_reach_reused_slot() {
        let mut pool = Pool::<Counter>::new(1);
        let old = pool.obtain();
        pool.free(old);
        let new = pool.obtain();
        pool[new].value = 7;
        assert!(!pool.free(old));
        assert_eq!(pool[new].value, 7);
    }

    #[test]
    fn free_all_counts_only_live_handles() {
        let mut pool = Pool::<Counter>::new(4);
        let handles: Vec<_> = (0..4).map(|_| pool.obtain()).collect();
        assert!(pool.free(handles[2]));
        assert_eq!(pool.free_all(handles.iter().copied()), 3);
        assert_eq!(pool.usage().free, 4);
    }

    #[test]
    #[should_panic(expected = "stale pool handle")]
    fn indexing_with_stale_handle_panics() {
        let mut pool = Pool::<Counter>::new(1);
        let handle = pool.obtain();
        pool.free(handle);
        let _ = &pool[handle];
    }
}

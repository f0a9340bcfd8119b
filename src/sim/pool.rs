//! Fixed-capacity entity pool
//!
//! Slots are recycled through a free list, so spawn and release are O(1).
//! Callers hold a `Handle` (slot index + generation) rather than a reference;
//! a handle to a released slot simply stops resolving.

/// Stable reference to a pooled entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Pool with a hard capacity; spawning into a full pool is a silent no-op
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    capacity: usize,
    count: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            capacity,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// Insert a value; `None` when the pool is full
    pub fn spawn(&mut self, value: T) -> Option<Handle> {
        if self.is_full() {
            return None;
        }
        let index = if let Some(i) = self.free_list.pop() {
            self.slots[i as usize].value = Some(value);
            i
        } else {
            let i = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            i
        };
        self.count += 1;
        Some(Handle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Return a slot to the free list. Releasing twice is harmless.
    pub fn release(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.count = self.count.saturating_sub(1);
        Some(value)
    }

    /// Live entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    Handle {
                        index: i as u32,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|s| s.value.as_ref())
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|s| s.value.as_mut())
    }

    /// Keep entries for which `keep` returns true; release the rest
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(value) = slot.value.as_mut() else {
                continue;
            };
            if !keep(value) {
                slot.value = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_list.push(i as u32);
                self.count = self.count.saturating_sub(1);
            }
        }
    }

    /// Release every entry, keeping slot storage for reuse
    pub fn clear(&mut self) {
        self.retain(|_| false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_rejects_when_full() {
        let mut pool = Pool::with_capacity(2);
        assert!(pool.spawn(1).is_some());
        assert!(pool.spawn(2).is_some());
        assert!(pool.spawn(3).is_none());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = Pool::with_capacity(4);
        let h = pool.spawn("a").expect("slot");
        assert_eq!(pool.release(h), Some("a"));
        assert_eq!(pool.release(h), None);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_stale_handle_does_not_resolve_after_reuse() {
        let mut pool = Pool::with_capacity(1);
        let old = pool.spawn(10).expect("slot");
        pool.release(old);
        let new = pool.spawn(20).expect("slot reused");
        assert_eq!(old.index(), new.index());
        assert_eq!(pool.release(old), None);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.release(new), Some(20));
    }

    #[test]
    fn test_retain_frees_slots() {
        let mut pool = Pool::with_capacity(3);
        for v in 0..3 {
            pool.spawn(v);
        }
        pool.retain(|v| *v != 1);
        assert_eq!(pool.len(), 2);
        assert!(pool.spawn(99).is_some());
        assert!(pool.is_full());
        let values: Vec<_> = pool.values().copied().collect();
        assert_eq!(values, vec![0, 99, 2]);
    }
}

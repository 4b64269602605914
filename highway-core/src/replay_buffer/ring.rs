//! Fixed-capacity ring shared by the replay buffers.
use super::SampleIndex;

/// Slots written in order, wrapping around to overwrite the oldest item.
///
/// Each slot keeps the number of times it was written.
#[derive(Debug, Clone)]
pub(crate) struct Ring<T> {
    capacity: usize,
    items: Vec<T>,
    /// Slot written by the next push.
    next: usize,
    generations: Vec<u64>,
}

impl<T> Ring<T> {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
            next: 0,
            generations: vec![0; capacity],
        }
    }

    /// Writes an item and returns its slot.
    pub fn push(&mut self, item: T) -> usize {
        let slot = self.next;
        if self.items.len() < self.capacity {
            self.items.push(item);
        } else {
            self.items[slot] = item;
        }
        self.generations[slot] += 1;
        self.next = (slot + 1) % self.capacity;
        slot
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.items.get(slot)
    }

    /// Handle of the item currently at `slot`.
    pub fn index(&self, slot: usize) -> SampleIndex {
        SampleIndex {
            slot,
            generation: self.generations[slot],
        }
    }

    /// Returns `true` if `ix` refers to the item currently at its slot.
    pub fn is_current(&self, ix: &SampleIndex) -> bool {
        ix.slot < self.items.len() && self.generations[ix.slot] == ix.generation
    }

    /// Iterates over items from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = if self.is_full() {
            self.items.split_at(self.next)
        } else {
            self.items.split_at(self.items.len())
        };
        older.iter().chain(newer.iter())
    }
}

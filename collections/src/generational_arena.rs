use std::collections::VecDeque;

use thiserror::Error;

const MAX_SLOTS: usize = u32::MAX as usize;

/// Slot reference into a [`GenArena`]. A handle stays valid until the slot it
/// points to is removed; reusing the slot bumps its generation, so handles
/// that outlive their item are rejected instead of aliasing the new one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("handle does not refer to a live slot")]
    NotFound,
    #[error("arena cannot grow past {0} slots")]
    OutOfMemory(usize),
}

pub struct GenArena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_slots: VecDeque<u32>,
    max_slots: usize,
    len: usize,
}

impl<T> GenArena<T> {
    pub fn new(initial_capacity: usize) -> Self {
        Self::bounded(initial_capacity, MAX_SLOTS)
    }

    /// Arena that refuses to grow past `max_slots` live items.
    pub fn bounded(initial_capacity: usize, max_slots: usize) -> Self {
        let max_slots = max_slots.min(MAX_SLOTS);
        assert!(initial_capacity > 0, "Initial capacity cannot be zero");
        assert!(
            initial_capacity <= max_slots,
            "Initial capacity cannot exceed the slot limit"
        );

        let mut arena = Self {
            items: Vec::with_capacity(initial_capacity),
            generations: Vec::with_capacity(initial_capacity),
            free_slots: VecDeque::with_capacity(initial_capacity),
            max_slots,
            len: 0,
        };
        arena.extend_slots(initial_capacity);
        arena
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    pub fn add(&mut self, item: T) -> Result<Handle, Error> {
        if self.free_slots.is_empty() {
            let current = self.items.len();
            if current >= self.max_slots {
                return Err(Error::OutOfMemory(self.max_slots));
            }
            let new_size = (current * 2).max(1).min(self.max_slots);
            self.extend_slots(new_size);
        }

        let index = self.free_slots.pop_front().ok_or(Error::OutOfMemory(self.max_slots))?;
        let slot = index as usize;
        self.items[slot] = Some(item);
        self.len += 1;

        Ok(Handle::new(index, self.generations[slot]))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.slot(handle).is_some()
    }

    pub fn borrow(&self, handle: Handle) -> Result<&T, Error> {
        let slot = self.slot(handle).ok_or(Error::NotFound)?;
        self.items[slot].as_ref().ok_or(Error::NotFound)
    }

    pub fn borrow_mut(&mut self, handle: Handle) -> Result<&mut T, Error> {
        let slot = self.slot(handle).ok_or(Error::NotFound)?;
        self.items[slot].as_mut().ok_or(Error::NotFound)
    }

    pub fn remove(&mut self, handle: Handle) -> Result<T, Error> {
        let slot = self.slot(handle).ok_or(Error::NotFound)?;
        let item = self.items[slot].take().ok_or(Error::NotFound)?;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free_slots.push_back(handle.index);
        self.len -= 1;
        Ok(item)
    }

    pub fn replace(&mut self, handle: Handle, item: T) -> Result<T, Error> {
        let current = self.borrow_mut(handle)?;
        Ok(std::mem::replace(current, item))
    }

    fn slot(&self, handle: Handle) -> Option<usize> {
        let slot = handle.index as usize;
        let live = slot < self.items.len()
            && self.generations[slot] == handle.generation
            && self.items[slot].is_some();
        live.then_some(slot)
    }

    fn extend_slots(&mut self, new_size: usize) {
        for slot in self.items.len()..new_size {
            self.items.push(None);
            self.generations.push(0);
            self.free_slots.push_back(slot as u32);
        }
    }
}

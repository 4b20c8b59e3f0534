//! Indexed object-group container.
//!
//! Slots are addressed by a dense index; disabled firmware entries leave holes.

use vfe_core::{VfeError, VfeResult};

/// Fixed-size, sparsely populated group of objects.
#[derive(Debug, Clone)]
pub struct ObjGroup<T> {
    what: &'static str,
    slots: Vec<Option<T>>,
}

impl<T> ObjGroup<T> {
    /// Allocate `len` empty slots, refusing anything past `capacity`.
    pub fn with_slots(what: &'static str, len: usize, capacity: usize) -> VfeResult<Self> {
        if len > capacity {
            return Err(VfeError::AllocationFailure {
                what,
                requested: len,
                capacity,
            });
        }
        let mut slots = Vec::new();
        slots.resize_with(len, || None);
        Ok(Self { what, slots })
    }

    /// Place `obj` at `index`. Each slot may be filled once.
    pub fn insert(&mut self, index: usize, obj: T) -> VfeResult<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(VfeError::InvalidOperandIndex {
                what: self.what,
                entry: index,
                index,
                len,
            })?;
        if slot.is_some() {
            return Err(VfeError::DuplicateIndex {
                what: self.what,
                index,
            });
        }
        *slot = Some(obj);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Number of slots, populated or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Populated slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|obj| (i, obj)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|obj| (i, obj)))
    }

    /// Indices of populated slots.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(i, _)| i)
    }
}

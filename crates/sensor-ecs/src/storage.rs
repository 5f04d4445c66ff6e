use std::any::Any;

/// Type-erased view of a component column, so deregistration can strip an
/// entity from every column without knowing the component types.
pub(crate) trait ComponentColumn: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove_slot(&mut self, slot: u32) -> bool;
}

/// Sparse-set column for one component type. O(1) insert/remove/lookup and
/// dense iteration.
pub(crate) struct SparseSet<T> {
    /// Entity slot -> position in `dense`.
    sparse: Vec<Option<usize>>,
    dense: Vec<T>,
    /// Entity slot owning each dense value.
    slots: Vec<u32>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Insert or replace the value for a slot, returning the previous one.
    pub fn insert(&mut self, slot: u32, value: T) -> Option<T> {
        let idx = slot as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        match self.sparse[idx] {
            Some(pos) => Some(std::mem::replace(&mut self.dense[pos], value)),
            None => {
                self.sparse[idx] = Some(self.dense.len());
                self.dense.push(value);
                self.slots.push(slot);
                None
            }
        }
    }

    pub fn get(&self, slot: u32) -> Option<&T> {
        let pos = (*self.sparse.get(slot as usize)?)?;
        self.dense.get(pos)
    }

    pub fn get_mut(&mut self, slot: u32) -> Option<&mut T> {
        let pos = (*self.sparse.get(slot as usize)?)?;
        self.dense.get_mut(pos)
    }

    /// Remove and return the value for a slot.
    pub fn take(&mut self, slot: u32) -> Option<T> {
        let pos = self.sparse.get_mut(slot as usize)?.take()?;
        let value = self.dense.swap_remove(pos);
        self.slots.swap_remove(pos);
        if let Some(&moved) = self.slots.get(pos) {
            self.sparse[moved as usize] = Some(pos);
        }
        Some(value)
    }

    /// (slot, value) pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots.iter().copied().zip(self.dense.iter())
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }
}

impl<T: Send + Sync + 'static> ComponentColumn for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_slot(&mut self, slot: u32) -> bool {
        self.take(slot).is_some()
    }
}

use std::fmt;

/// A generational entity id: slot index plus a generation bumped on every reuse.
///
/// Ordering is by slot first, then generation, so sets of ids iterate in
/// registration-slot order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EntityId {
    /// Create an id from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out and recycles entity slots.
#[derive(Default)]
pub(crate) struct IdAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    live: usize,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.alive[index as usize] = true;
                EntityId {
                    index,
                    generation: self.generations[index as usize],
                }
            }
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                self.alive.push(true);
                EntityId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Release a slot. Returns `false` for stale or unknown ids.
    pub fn release(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.index as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        let idx = id.index as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == id.generation
    }

    pub fn len(&self) -> usize {
        self.live
    }

    /// The live id occupying `index`, if any.
    pub fn live_at(&self, index: u32) -> Option<EntityId> {
        let idx = index as usize;
        (*self.alive.get(idx)?).then(|| EntityId {
            index,
            generation: self.generations[idx],
        })
    }

    /// Ids of every live entity in slot order.
    pub fn live_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| EntityId {
                index: idx as u32,
                generation: self.generations[idx],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!((a.index, b.index), (0, 1));
        assert_eq!(a.generation, 0);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn released_slot_is_reused_with_new_generation() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate();
        assert!(ids.release(a));
        let reused = ids.allocate();
        assert_eq!(reused.index, 0);
        assert_eq!(reused.generation, 1);
        assert_ne!(a, reused);
        assert!(!ids.is_alive(a));
        assert!(ids.is_alive(reused));
    }

    #[test]
    fn double_release_fails() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate();
        assert!(ids.release(a));
        assert!(!ids.release(a));
        assert_eq!(ids.len(), 0);
    }

    #[test]
    fn live_ids_skip_released() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate();
        let b = ids.allocate();
        ids.release(a);
        assert_eq!(ids.live_ids().collect::<Vec<_>>(), vec![b]);
    }
}

use std::any::TypeId;
use std::collections::HashMap;

use tracing::trace;

use crate::entity::{EntityId, IdAllocator};
use crate::storage::{ComponentColumn, SparseSet};

/// Marker trait for types that can be attached to entities.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// Errors raised by the entity manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    #[error("entity {0} is not registered")]
    NotRegistered(EntityId),
}

/// Owns entity lifetimes and their components.
///
/// Anything holding an `EntityId` holds a non-owning handle: once the entity
/// is deregistered, lookups through that id return `None`, even after its
/// slot has been reused.
#[derive(Default)]
pub struct EntityManager {
    ids: IdAllocator,
    columns: HashMap<TypeId, Box<dyn ComponentColumn>>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Entity lifetime ----

    /// Register a new, empty entity.
    pub fn register_entity(&mut self) -> EntityId {
        let id = self.ids.allocate();
        trace!(entity = %id, "registered entity");
        id
    }

    /// Destroy an entity and all of its components. Returns `false` if the
    /// id was not registered.
    pub fn deregister_entity(&mut self, id: EntityId) -> bool {
        if !self.ids.release(id) {
            return false;
        }
        for column in self.columns.values_mut() {
            column.remove_slot(id.index);
        }
        trace!(entity = %id, "deregistered entity");
        true
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.len() == 0
    }

    /// Every registered entity, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.live_ids()
    }

    // ---- Components ----

    fn column<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.columns
            .get(&TypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref::<SparseSet<T>>())
    }

    fn column_mut<T: Component>(&mut self) -> Option<&mut SparseSet<T>> {
        self.columns
            .get_mut(&TypeId::of::<T>())
            .and_then(|c| c.as_any_mut().downcast_mut::<SparseSet<T>>())
    }

    /// Attach a component, replacing and returning any previous one of the same type.
    pub fn insert_component<T: Component>(
        &mut self,
        id: EntityId,
        component: T,
    ) -> Result<Option<T>, EntityError> {
        if !self.ids.is_alive(id) {
            return Err(EntityError::NotRegistered(id));
        }
        let column = self
            .columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));
        let set = column
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("component type mismatch");
        Ok(set.insert(id.index, component))
    }

    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        if !self.ids.is_alive(id) {
            return None;
        }
        self.column::<T>()?.get(id.index)
    }

    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.ids.is_alive(id) {
            return None;
        }
        self.column_mut::<T>()?.get_mut(id.index)
    }

    /// Every entity carrying a `T`, with its component.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.column::<T>()
            .into_iter()
            .flat_map(|set| set.iter())
            .filter_map(move |(slot, value)| self.ids.live_at(slot).map(|id| (id, value)))
    }

    /// Number of entities carrying a `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.column::<T>().map_or(0, |set| set.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Label(&'static str);

    #[test]
    fn register_and_deregister() {
        let mut em = EntityManager::new();
        let e = em.register_entity();
        assert_eq!(em.len(), 1);
        assert_eq!(em.entities().collect::<Vec<_>>(), vec![e]);
        assert!(em.deregister_entity(e));
        assert!(em.is_empty());
        assert_eq!(em.entities().count(), 0);
        assert!(!em.deregister_entity(e));
    }

    #[test]
    fn insert_and_get_component() {
        let mut em = EntityManager::new();
        let e = em.register_entity();
        assert_eq!(em.insert_component(e, Counter(1)), Ok(None));
        assert_eq!(em.insert_component(e, Counter(2)), Ok(Some(Counter(1))));
        assert_eq!(em.component::<Counter>(e), Some(&Counter(2)));
        em.component_mut::<Counter>(e).unwrap().0 = 5;
        assert_eq!(em.component::<Counter>(e), Some(&Counter(5)));
        assert_eq!(em.count::<Counter>(), 1);
        assert_eq!(em.component::<Label>(e), None);
    }

    #[test]
    fn insert_on_unregistered_entity_fails() {
        let mut em = EntityManager::new();
        let e = em.register_entity();
        em.deregister_entity(e);
        assert_eq!(
            em.insert_component(e, Counter(0)),
            Err(EntityError::NotRegistered(e))
        );
    }

    #[test]
    fn deregister_strips_components() {
        let mut em = EntityManager::new();
        let e = em.register_entity();
        em.insert_component(e, Counter(1)).unwrap();
        em.insert_component(e, Label("sensor")).unwrap();
        em.deregister_entity(e);
        assert_eq!(em.count::<Counter>(), 0);
        assert_eq!(em.count::<Label>(), 0);
    }

    #[test]
    fn stale_id_does_not_see_new_occupant() {
        let mut em = EntityManager::new();
        let old = em.register_entity();
        em.insert_component(old, Counter(1)).unwrap();
        em.deregister_entity(old);

        let new = em.register_entity();
        em.insert_component(new, Counter(2)).unwrap();
        assert_eq!(old.index(), new.index());
        assert_eq!(em.component::<Counter>(old), None);
        assert_eq!(em.component::<Counter>(new), Some(&Counter(2)));
    }

    #[test]
    fn iter_yields_only_carriers() {
        let mut em = EntityManager::new();
        let a = em.register_entity();
        let b = em.register_entity();
        let c = em.register_entity();
        em.insert_component(a, Counter(1)).unwrap();
        em.insert_component(c, Counter(3)).unwrap();
        em.insert_component(b, Label("no counter")).unwrap();

        let mut seen: Vec<_> = em.iter::<Counter>().map(|(id, c)| (id, c.0)).collect();
        seen.sort();
        assert_eq!(seen, vec![(a, 1), (c, 3)]);
    }
}

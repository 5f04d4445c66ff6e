//! Contact event capture
//!
//! rapier reports collision events through `EventHandler` while a step is in
//! progress. We buffer them and hand the whole batch back once the step has
//! finished, so listeners only ever see settled counters.

use parking_lot::Mutex;
use rapier3d::prelude::*;

/// Whether a contact began or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Begin,
    End,
}

/// A begin/end contact between two colliders, as raised during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub kind: ContactKind,
    /// The contact ended because one of the colliders was removed.
    pub removed: bool,
}

impl ContactEvent {
    pub fn begin(collider1: ColliderHandle, collider2: ColliderHandle) -> Self {
        Self {
            collider1,
            collider2,
            kind: ContactKind::Begin,
            removed: false,
        }
    }

    pub fn end(collider1: ColliderHandle, collider2: ColliderHandle) -> Self {
        Self {
            collider1,
            collider2,
            kind: ContactKind::End,
            removed: false,
        }
    }

    /// Both colliders involved in this contact.
    pub fn colliders(&self) -> [ColliderHandle; 2] {
        [self.collider1, self.collider2]
    }

    pub fn is_begin(&self) -> bool {
        self.kind == ContactKind::Begin
    }
}

impl From<CollisionEvent> for ContactEvent {
    fn from(event: CollisionEvent) -> Self {
        match event {
            CollisionEvent::Started(h1, h2, flags) => Self {
                collider1: h1,
                collider2: h2,
                kind: ContactKind::Begin,
                removed: flags.contains(CollisionEventFlags::REMOVED),
            },
            CollisionEvent::Stopped(h1, h2, flags) => Self {
                collider1: h1,
                collider2: h2,
                kind: ContactKind::End,
                removed: flags.contains(CollisionEventFlags::REMOVED),
            },
        }
    }
}

/// `EventHandler` that records collision events in emission order.
#[derive(Default)]
pub struct ContactCollector {
    events: Mutex<Vec<ContactEvent>>,
}

impl ContactCollector {
    /// Take every event recorded since the last drain.
    pub fn drain(&self) -> Vec<ContactEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().push(event.into());
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_event_flags_are_kept() {
        let a = ColliderHandle::from_raw_parts(0, 0);
        let b = ColliderHandle::from_raw_parts(1, 0);
        let started: ContactEvent =
            CollisionEvent::Started(a, b, CollisionEventFlags::SENSOR).into();
        assert!(started.is_begin());
        assert!(!started.removed);

        let stopped: ContactEvent = CollisionEvent::Stopped(
            a,
            b,
            CollisionEventFlags::SENSOR | CollisionEventFlags::REMOVED,
        )
        .into();
        assert_eq!(stopped.kind, ContactKind::End);
        assert!(stopped.removed);
        assert_eq!(stopped.colliders(), [a, b]);
    }

    #[test]
    fn drain_empties_the_buffer() {
        let collector = ContactCollector::default();
        let a = ColliderHandle::from_raw_parts(0, 0);
        let b = ColliderHandle::from_raw_parts(1, 0);
        collector.events.lock().push(ContactEvent::begin(a, b));
        assert_eq!(collector.drain().len(), 1);
        assert!(collector.drain().is_empty());
    }
}

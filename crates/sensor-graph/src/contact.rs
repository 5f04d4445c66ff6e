use sensor_ecs::EntityId;
use sensor_physics::{ContactEvent, ContactKind};
use tracing::{trace, warn};

use crate::manager::{GraphSensorManager, OccupancyChange};
use crate::registry::SensorScene;

/// Applies a step's contact events to sensor counters, then reports the
/// settled counters to the manager.
#[derive(Debug, Default)]
pub struct SensorContactListener {
    touched: Vec<EntityId>,
}

impl SensorContactListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process every contact raised by one physics step.
    ///
    /// Counters are updated for all events first; the manager is only asked
    /// about a sensor once its count has settled, in first-touch order.
    /// Returns the sensors whose occupancy actually changed.
    pub fn process(
        &mut self,
        events: &[ContactEvent],
        scene: &mut SensorScene,
        manager: &mut GraphSensorManager,
    ) -> Vec<(EntityId, OccupancyChange)> {
        self.touched.clear();

        for event in events {
            for collider in event.colliders() {
                let Some(id) = scene.sensor_for_collider(collider) else {
                    continue;
                };
                let Some(sensor) = scene.sensor_mut(id) else {
                    continue;
                };
                match event.kind {
                    ContactKind::Begin => sensor.begin_contact(),
                    ContactKind::End => {
                        if !sensor.end_contact() {
                            warn!(entity = %id, "contact ended on a sensor with no open contacts");
                        }
                    }
                }
                trace!(entity = %id, kind = ?event.kind, count = sensor.occupy_count(), "sensor contact");
                if !self.touched.contains(&id) {
                    self.touched.push(id);
                }
            }
        }

        self.touched
            .iter()
            .filter_map(|&id| {
                let sensor = scene.sensor(id)?;
                match manager.update_graph_sensor_state(id, sensor) {
                    OccupancyChange::Unchanged => None,
                    change => Some((id, change)),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GridConfig, GridSensorGenerator};
    use crate::registry::EntityRegistry;
    use glam::Vec3;
    use sensor_physics::ColliderHandle;

    fn scene_with_grid() -> (SensorScene, GraphSensorManager, Vec<EntityId>) {
        let mut scene = SensorScene::default();
        let mut manager = GraphSensorManager::new();
        let mut generator = GridSensorGenerator::new(GridConfig {
            columns: 2,
            rows: 1,
            cell_size: 1.0,
            origin: Vec3::ZERO,
            sensor_height: 1.0,
            gap: 0.0,
        });
        let ids = manager
            .create_sensors(&mut generator, &mut scene)
            .unwrap()
            .to_vec();
        (scene, manager, ids)
    }

    fn collider_of(scene: &SensorScene, id: EntityId) -> ColliderHandle {
        scene.sensor(id).unwrap().collider.unwrap()
    }

    #[test]
    fn begin_then_end_in_separate_steps() {
        let (mut scene, mut manager, ids) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        let sensor = collider_of(&scene, ids[0]);
        let other = ColliderHandle::from_raw_parts(99, 0);

        let changes = listener.process(&[ContactEvent::begin(sensor, other)], &mut scene, &mut manager);
        assert_eq!(changes, vec![(ids[0], OccupancyChange::Entered)]);
        assert!(manager.is_occupied(ids[0]));

        let changes = listener.process(&[ContactEvent::end(other, sensor)], &mut scene, &mut manager);
        assert_eq!(changes, vec![(ids[0], OccupancyChange::Left)]);
        assert!(manager.occupied_sensors().is_empty());
    }

    #[test]
    fn begin_and_end_in_one_step_cancel_out() {
        let (mut scene, mut manager, ids) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        let sensor = collider_of(&scene, ids[1]);
        let other = ColliderHandle::from_raw_parts(99, 0);

        let events = [ContactEvent::begin(sensor, other), ContactEvent::end(sensor, other)];
        let changes = listener.process(&events, &mut scene, &mut manager);
        assert!(changes.is_empty());
        assert!(!manager.is_occupied(ids[1]));
    }

    #[test]
    fn stays_occupied_while_any_contact_is_open() {
        let (mut scene, mut manager, ids) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        let sensor = collider_of(&scene, ids[0]);
        let a = ColliderHandle::from_raw_parts(50, 0);
        let b = ColliderHandle::from_raw_parts(51, 0);

        listener.process(
            &[ContactEvent::begin(sensor, a), ContactEvent::begin(sensor, b)],
            &mut scene,
            &mut manager,
        );
        let changes = listener.process(&[ContactEvent::end(sensor, a)], &mut scene, &mut manager);
        assert!(changes.is_empty());
        assert!(manager.is_occupied(ids[0]));
        assert_eq!(scene.sensor(ids[0]).unwrap().occupy_count(), 1);
    }

    #[test]
    fn events_on_unknown_colliders_are_ignored() {
        let (mut scene, mut manager, _) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        let a = ColliderHandle::from_raw_parts(70, 0);
        let b = ColliderHandle::from_raw_parts(71, 0);
        let changes = listener.process(&[ContactEvent::begin(a, b)], &mut scene, &mut manager);
        assert!(changes.is_empty());
        assert!(manager.occupied_sensors().is_empty());
    }

    #[test]
    fn deregistered_sensor_is_ignored() {
        let (mut scene, mut manager, ids) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        let sensor = collider_of(&scene, ids[0]);
        scene.deregister_entity(ids[0]);

        let other = ColliderHandle::from_raw_parts(99, 0);
        let changes = listener.process(&[ContactEvent::begin(sensor, other)], &mut scene, &mut manager);
        assert!(changes.is_empty());
    }

    #[test]
    fn falling_ball_occupies_then_leaves_when_removed() {
        let (mut scene, mut manager, ids) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        scene.physics_mut().create_ground(0.0);
        let target = scene.sensor(ids[1]).unwrap().center;
        let (ball, _) = scene
            .physics_mut()
            .add_dynamic_ball(target + Vec3::Y * 2.0, 0.2, Vec3::ZERO);

        for _ in 0..120 {
            let events = scene.step();
            listener.process(&events, &mut scene, &mut manager);
        }
        assert_eq!(manager.occupied_sensors().iter().copied().collect::<Vec<_>>(), vec![ids[1]]);

        scene.physics_mut().remove_rigid_body(ball);
        let events = scene.step();
        let changes = listener.process(&events, &mut scene, &mut manager);
        assert_eq!(changes, vec![(ids[1], OccupancyChange::Left)]);
        assert!(manager.occupied_sensors().is_empty());
    }

    #[test]
    fn reset_with_ball_inside_ignores_removed_sensor_contact() {
        let (mut scene, mut manager, ids) = scene_with_grid();
        let mut listener = SensorContactListener::new();
        scene.physics_mut().create_ground(0.0);
        let sensor = collider_of(&scene, ids[0]);
        let center = scene.sensor(ids[0]).unwrap().center;
        scene.physics_mut().add_dynamic_ball(center, 0.2, Vec3::ZERO);

        for _ in 0..10 {
            let events = scene.step();
            listener.process(&events, &mut scene, &mut manager);
        }
        assert!(manager.is_occupied(ids[0]));

        manager.reset(&mut scene);
        assert_eq!(scene.sensor_count(), 0);

        let events = scene.step();
        assert!(events.iter().any(|e| {
            e.kind == ContactKind::End && e.removed && e.colliders().contains(&sensor)
        }));
        let changes = listener.process(&events, &mut scene, &mut manager);
        assert!(changes.is_empty());
        assert!(manager.occupied_sensors().is_empty());
        assert!(manager.sensors().is_empty());
    }
}

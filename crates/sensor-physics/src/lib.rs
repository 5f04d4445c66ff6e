//! Sensor Physics - Physics simulation using rapier3d
//!
//! Hosts sensor colliders and the bodies that occupy them, and reports the
//! contact begin/end events raised by every step.

mod events;

pub use events::{ContactCollector, ContactEvent, ContactKind};
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/60)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,

    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,

    /// Collision events raised during the current step
    contacts: ContactCollector,
    step_count: u64,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            contacts: ContactCollector::default(),
            step_count: 0,
        }
    }

    /// Step the physics simulation and return the contact events it raised,
    /// in the order rapier emitted them.
    pub fn step(&mut self) -> Vec<ContactEvent> {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.contacts,
        );
        self.step_count += 1;

        let events = self.contacts.drain();
        if !events.is_empty() {
            trace!(step = self.step_count, count = events.len(), "contact events");
        }
        events
    }

    /// Number of steps taken so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Add a fixed box sensor. It never pushes bodies back, it only reports
    /// begin/end contacts.
    pub fn add_sensor(&mut self, center: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![center.x, center.y, center.z])
            .sensor(true)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set.insert(collider)
    }

    /// Whether a collider exists and is a sensor
    pub fn is_sensor(&self, handle: ColliderHandle) -> bool {
        self.collider_set
            .get(handle)
            .map_or(false, |collider| collider.is_sensor())
    }

    /// Add a static collider (ground, walls, etc.)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Add a dynamic rigid body with a collider
    pub fn add_dynamic_body(
        &mut self,
        rigid_body: RigidBody,
        collider: Collider,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let rb_handle = self.rigid_body_set.insert(rigid_body);
        let col_handle =
            self.collider_set
                .insert_with_parent(collider, rb_handle, &mut self.rigid_body_set);
        (rb_handle, col_handle)
    }

    /// Drop a dynamic ball into the world
    pub fn add_dynamic_ball(
        &mut self,
        position: Vec3,
        radius: f32,
        velocity: Vec3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .linvel(vector![velocity.x, velocity.y, velocity.z])
            .build();
        let collider = ColliderBuilder::ball(radius)
            .friction(0.5)
            .restitution(0.2)
            .build();
        self.add_dynamic_body(body, collider)
    }

    /// Remove a rigid body and its colliders. Contacts it had end on the next step.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    /// Remove a collider. Contacts it had end on the next step.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> bool {
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true)
            .is_some()
    }

    /// Get a collider by handle
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// World-space position of a rigid body
    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let t = body.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

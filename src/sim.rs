//! Headless sensor-grid simulation
//!
//! Drops balls over the grid, steps physics on a fixed clock and feeds every
//! step's contacts through the listener into the manager.

use anyhow::Result;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use sensor_core::SimClock;
use sensor_graph::{
    GraphSensorManager, GridSensorGenerator, OccupancyChange, SensorContactListener, SensorScene,
};
use sensor_physics::RigidBodyHandle;

use crate::settings::SimSettings;

/// A dropped ball and the simulated time at which it goes away
struct Ball {
    body: RigidBodyHandle,
    expires_at: f64,
}

/// Totals gathered over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimReport {
    pub steps: u64,
    pub sensors: usize,
    pub entered: u64,
    pub left: u64,
    /// Balls removed while sitting inside a sensor box
    pub expired_in_sensor: u64,
    pub peak_occupied: usize,
    pub final_occupied: usize,
}

pub struct Simulation {
    settings: SimSettings,
    clock: SimClock,
    scene: SensorScene,
    manager: GraphSensorManager,
    listener: SensorContactListener,
    balls: Vec<Ball>,
    report: SimReport,
}

impl Simulation {
    /// Build the scene and create the sensor grid.
    ///
    /// Physics always integrates with the clock's fixed step, so each step the
    /// clock hands out advances rapier by exactly that much.
    pub fn new(settings: SimSettings) -> Result<Self> {
        settings.validate()?;

        let mut physics = settings.physics.clone();
        if physics.timestep != settings.clock.fixed_timestep {
            warn!(
                physics = physics.timestep,
                clock = settings.clock.fixed_timestep,
                "physics timestep differs from the clock step, using the clock step"
            );
            physics.timestep = settings.clock.fixed_timestep;
        }

        let mut scene = SensorScene::new(physics);
        scene.physics_mut().create_ground(settings.grid.origin.y);

        let mut manager = GraphSensorManager::new();
        manager.init(&mut scene);
        let mut generator = GridSensorGenerator::new(settings.grid.clone());
        let sensors = manager.create_sensors(&mut generator, &mut scene)?.len();

        Ok(Self {
            clock: SimClock::new(settings.clock.clone()),
            settings,
            scene,
            manager,
            listener: SensorContactListener::new(),
            balls: Vec::new(),
            report: SimReport {
                sensors,
                ..Default::default()
            },
        })
    }

    /// Drop `ball_count` balls at random spots over the grid.
    pub fn drop_balls(&mut self) {
        let sim = &self.settings.simulation;
        let grid = &self.settings.grid;
        let mut rng = StdRng::seed_from_u64(sim.seed);
        let extent = Vec3::new(
            grid.columns as f32 * grid.cell_size,
            0.0,
            grid.rows as f32 * grid.cell_size,
        );

        for _ in 0..sim.ball_count {
            let position = grid.origin
                + sim.drop_offset()
                + Vec3::new(rng.gen::<f32>() * extent.x, 0.0, rng.gen::<f32>() * extent.z);
            let velocity = if sim.max_speed > 0.0 {
                Vec3::new(
                    rng.gen_range(-sim.max_speed..=sim.max_speed),
                    0.0,
                    rng.gen_range(-sim.max_speed..=sim.max_speed),
                )
            } else {
                Vec3::ZERO
            };
            let (body, _) = self
                .scene
                .physics_mut()
                .add_dynamic_ball(position, sim.ball_radius, velocity);
            let lifetime = sim.ball_lifetime * rng.gen_range(0.5..=1.0);
            self.balls.push(Ball {
                body,
                expires_at: self.clock.total_time + lifetime as f64,
            });
        }
        info!("dropped {} balls", sim.ball_count);
    }

    /// Run the configured number of frames.
    pub fn run(&mut self) -> &SimReport {
        let frame_delta = self.settings.simulation.frame_delta;
        for _ in 0..self.settings.simulation.frames {
            let steps = self.clock.advance(frame_delta);
            for _ in 0..steps {
                self.fixed_step();
            }
            self.expire_balls();
        }
        &self.report
    }

    fn fixed_step(&mut self) {
        let events = self.scene.step();
        let changes = self
            .listener
            .process(&events, &mut self.scene, &mut self.manager);

        for (id, change) in changes {
            match change {
                OccupancyChange::Entered => self.report.entered += 1,
                OccupancyChange::Left => self.report.left += 1,
                OccupancyChange::Unchanged => {}
            }
            if let Some(sensor) = self.scene.sensor(id) {
                debug!(node = %sensor.node, ?change, "occupancy changed");
            }
        }

        let occupied = self.manager.occupied_sensors().len();
        self.report.steps += 1;
        self.report.peak_occupied = self.report.peak_occupied.max(occupied);
        self.report.final_occupied = occupied;

        let interval = self.settings.simulation.report_interval;
        if interval > 0 && self.report.steps % interval == 0 {
            info!(
                step = self.report.steps,
                "occupied nodes: [{}]",
                self.occupied_nodes().join(", ")
            );
        }
    }

    fn expire_balls(&mut self) {
        let now = self.clock.total_time;
        let (expired, live): (Vec<_>, Vec<_>) =
            self.balls.drain(..).partition(|ball| ball.expires_at <= now);
        self.balls = live;

        for ball in expired {
            if let Some(position) = self.scene.physics().body_position(ball.body) {
                match self.settings.grid.cell_at(position) {
                    Some(node) => {
                        let inside = self
                            .scene
                            .sensors()
                            .any(|(_, sensor)| sensor.node == node && sensor.contains(position));
                        if inside {
                            self.report.expired_in_sensor += 1;
                        }
                        debug!(%node, inside, "removing ball");
                    }
                    None => debug!(?position, "removing ball outside the grid"),
                }
            }
            self.scene.physics_mut().remove_rigid_body(ball.body);
        }
    }

    /// Grid nodes of the currently occupied sensors, in id order.
    pub fn occupied_nodes(&self) -> Vec<String> {
        self.manager
            .occupied_sensors()
            .iter()
            .filter_map(|id| self.scene.sensor(*id))
            .map(|sensor| sensor.node.to_string())
            .collect()
    }

    pub fn manager(&self) -> &GraphSensorManager {
        &self.manager
    }

    pub fn scene(&self) -> &SensorScene {
        &self.scene
    }

    /// Tear the sensors down and return the final report.
    pub fn shutdown(&mut self) -> SimReport {
        self.manager.shutdown(&mut self.scene);
        self.report.clone()
    }
}

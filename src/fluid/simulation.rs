//! Fluid simulation facade.
//!
//! [`FluidSimulation`] bundles the environment, the particle store and the
//! solver behind the operations a host needs: spawn, step, read back.

use bevy::prelude::*;

use super::boundary::Rectangle;
use super::environment::Environment;
use super::error::FluidError;
use super::params::FluidParams;
use super::particle::{Particle, ParticleStore, ParticleView};
use super::solver::{Solver, StepReport};
use super::vector::Vector2;

/// Main fluid simulation resource.
#[derive(Resource, Clone, Debug)]
pub struct FluidSimulation {
    env: Environment,
    store: ParticleStore,
    solver: Solver,
    ticks: u64,
    last_report: StepReport,
}

impl FluidSimulation {
    /// Builds an empty simulation from validated parameters.
    pub fn new(params: &FluidParams) -> Result<Self, FluidError> {
        Ok(Self {
            env: Environment::new(params)?,
            store: ParticleStore::new(),
            solver: Solver::new(),
            ticks: 0,
            last_report: StepReport::default(),
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Number of particle slots, inactive ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.store.get(index)
    }

    /// Steps taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 * self.env.time_delta()
    }

    pub fn last_report(&self) -> &StepReport {
        &self.last_report
    }

    /// Fills `region` with particles spaced `particle_size` apart.
    /// Returns how many were spawned.
    pub fn spawn_in_rectangle(&mut self, region: Rectangle, kinematic: bool) -> Result<usize, FluidError> {
        let template = self.env.template(kinematic);
        let spawned = self
            .store
            .spawn_in_rectangle(region, self.env.particle_size(), &template)?;
        debug!(
            "Spawned {} {} particle(s) in {:?}",
            spawned,
            if kinematic { "kinematic" } else { "fluid" },
            region
        );
        Ok(spawned)
    }

    /// Spawns one particle with an initial velocity and returns its slot.
    pub fn spawn_particle(
        &mut self,
        position: Vector2,
        velocity: Vector2,
        kinematic: bool,
    ) -> Result<usize, FluidError> {
        if !position.is_finite() {
            return Err(FluidError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        if !velocity.is_finite() {
            return Err(FluidError::NonFiniteVelocity {
                x: velocity.x,
                y: velocity.y,
            });
        }
        let template = self.env.template(kinematic).with_velocity(velocity);
        Ok(self.store.spawn(position, &template))
    }

    /// Spawns a fluid block inside an open-topped tank.
    ///
    /// Walls are kinematic particles `wall_layers` thick on the bottom, left
    /// and right of `inner`. Returns the total number spawned.
    pub fn spawn_tank(&mut self, inner: Rectangle, fill: Rectangle, wall_layers: usize) -> Result<usize, FluidError> {
        let thickness = wall_layers as f64 * self.env.particle_size();
        let bottom = Rectangle::new(
            inner.left - thickness,
            inner.bottom - thickness,
            inner.width + 2.0 * thickness,
            thickness,
        );
        let left = Rectangle::new(inner.left - thickness, inner.bottom, thickness, inner.height);
        let right = Rectangle::new(inner.right(), inner.bottom, thickness, inner.height);

        let mut spawned = self.spawn_in_rectangle(fill, false)?;
        for wall in [bottom, left, right] {
            spawned += self.spawn_in_rectangle(wall, true)?;
        }
        Ok(spawned)
    }

    /// Advances the simulation by one timestep.
    pub fn step(&mut self) -> StepReport {
        self.last_report = self.solver.step(&mut self.env, &mut self.store);
        self.ticks += 1;
        self.last_report
    }

    /// Runs `steps` timesteps back to back.
    pub fn advance(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Snapshot of active particles.
    pub fn particles(&self) -> impl Iterator<Item = ParticleView> + Clone + '_ {
        self.store.views()
    }

    /// Mean relative deviation from rest density over active fluid particles.
    pub fn average_density_error(&self) -> f64 {
        let rest = self.env.rest_density();
        let (sum, count) = self
            .store
            .as_slice()
            .iter()
            .filter(|p| p.active && !p.kinematic)
            .fold((0.0, 0usize), |(sum, count), p| {
                (sum + (p.density - rest).abs() / rest, count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

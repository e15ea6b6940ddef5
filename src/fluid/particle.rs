//! Particle records and the slot store that owns them.
//!
//! Particles live in one contiguous `Vec` addressed by slot index. Slot
//! indices are what the spatial grid stores, so they stay stable for the
//! lifetime of a particle. A particle removed by the open boundary keeps its
//! slot as an inactive tombstone until a later spawn claims it.

use super::boundary::Rectangle;
use super::error::{ensure_positive, FluidError};
use super::vector::Vector2;

/// Most particles a single rectangle spawn may create.
pub const MAX_SPAWN_BATCH: usize = 1 << 22;

/// One SPH particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector2,
    /// Reported velocity, half a step ahead of `velocity2`.
    pub velocity: Vector2,
    /// Integrator velocity.
    pub velocity2: Vector2,
    /// Acceleration accumulated during the force pass.
    pub force: Vector2,
    pub mass: f64,
    pub viscosity: f64,
    pub density: f64,
    pub pressure: f64,
    /// Contributes density and forces but is never moved.
    pub kinematic: bool,
    /// False once the particle left an open domain.
    pub active: bool,
}

impl Particle {
    /// Creates an active particle at rest from a template.
    pub fn new(position: Vector2, template: &ParticleTemplate) -> Self {
        Self {
            position,
            velocity: template.velocity,
            velocity2: template.velocity,
            force: Vector2::ZERO,
            mass: template.mass,
            viscosity: template.viscosity,
            density: 0.0,
            pressure: 0.0,
            kinematic: template.kinematic,
            active: true,
        }
    }
}

/// Per-spawn settings shared by every particle of a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleTemplate {
    pub mass: f64,
    pub viscosity: f64,
    pub kinematic: bool,
    /// Initial velocity, applied to both velocity fields.
    pub velocity: Vector2,
}

impl ParticleTemplate {
    pub fn new(mass: f64, viscosity: f64) -> Self {
        Self {
            mass,
            viscosity,
            kinematic: false,
            velocity: Vector2::ZERO,
        }
    }

    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Read-only copy of the externally visible particle state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleView {
    pub active: bool,
    pub position: Vector2,
    pub kinematic: bool,
}

impl From<&Particle> for ParticleView {
    fn from(particle: &Particle) -> Self {
        Self {
            active: particle.active,
            position: particle.position,
            kinematic: particle.kinematic,
        }
    }
}

/// Owns every particle slot of a simulation.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    /// Slots of deactivated particles, reused by later spawns.
    free: Vec<usize>,
    active: usize,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of slots, active or not.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Stores a particle, reusing a freed slot when one exists.
    pub fn spawn(&mut self, position: Vector2, template: &ParticleTemplate) -> usize {
        let particle = Particle::new(position, template);
        self.active += 1;
        match self.free.pop() {
            Some(index) => {
                self.particles[index] = particle;
                index
            }
            None => {
                self.particles.push(particle);
                self.particles.len() - 1
            }
        }
    }

    /// Fills `region` with a lattice of spacing `particle_size`.
    ///
    /// Spawns `round(width / size) x round(height / size)` particles centred
    /// at `left + (i + 0.5) * size`, `bottom + (j + 0.5) * size`, and returns
    /// how many were created.
    ///
    /// Regions needing more than [`MAX_SPAWN_BATCH`] particles are rejected
    /// before anything is allocated.
    pub fn spawn_in_rectangle(
        &mut self,
        region: Rectangle,
        particle_size: f64,
        template: &ParticleTemplate,
    ) -> Result<usize, FluidError> {
        region.validate()?;
        let size = ensure_positive("particle_size", particle_size)?;

        let count_x = (region.width / size).round();
        let count_y = (region.height / size).round();
        if count_x * count_y > MAX_SPAWN_BATCH as f64 {
            return Err(FluidError::TooManyParticles {
                count_x,
                count_y,
                limit: MAX_SPAWN_BATCH,
            });
        }
        let (count_x, count_y) = (count_x as usize, count_y as usize);
        self.particles.reserve((count_x * count_y).saturating_sub(self.free.len()));

        for i in 0..count_x {
            for j in 0..count_y {
                let position = Vector2::new(
                    region.left + (i as f64 + 0.5) * size,
                    region.bottom + (j as f64 + 0.5) * size,
                );
                self.spawn(position, template);
            }
        }

        Ok(count_x * count_y)
    }

    /// Marks a slot inactive and frees it. Returns false if it already was.
    pub fn deactivate(&mut self, index: usize) -> bool {
        match self.particles.get_mut(index) {
            Some(particle) if particle.active => {
                particle.active = false;
                self.free.push(index);
                self.active -= 1;
                true
            }
            _ => false,
        }
    }

    /// Snapshot of active particles, in slot order.
    pub fn views(&self) -> impl Iterator<Item = ParticleView> + Clone + '_ {
        self.particles
            .iter()
            .filter(|particle| particle.active)
            .map(ParticleView::from)
    }
}

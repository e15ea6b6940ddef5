//! Fluid simulation parameters.
//!
//! Every constant of the solver lives here. They are read once when a
//! [`crate::fluid::environment::Environment`] is built; changing them at
//! runtime only takes effect for the next simulation (the demo rebuilds on
//! reset).

use bevy::prelude::*;

use super::boundary::BoundaryPolicy;
use super::error::{ensure_non_negative, ensure_positive, FluidError};
use super::vector::Vector2;

/// Parameters controlling the fluid simulation behavior.
///
/// Defaults describe water in a 0.9 m square box at centimetre resolution.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct FluidParams {
    /// Lattice spacing of spawned particles in meters.
    pub particle_size: f64,

    /// Kernel support radius as a multiple of `particle_size`.
    pub smoothing_ratio: f64,

    /// Pressure stiffness `k` in `p = k * (rho - rho0)`.
    pub stiffness: f64,

    /// Rest density in kg/m², water is about 1000.
    pub rest_density: f64,

    /// Per-particle viscosity coefficient.
    /// Higher values = thicker fluid.
    pub viscosity: f64,

    /// Gravity acceleration, applied without mass scaling.
    pub gravity: Vector2,

    /// Fixed timestep in seconds.
    pub time_delta: f64,

    /// Domain extent; the domain spans `[0, x] x [0, y]`.
    pub domain: Vector2,

    /// What happens at the domain edges.
    pub boundary: BoundaryPolicy,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            particle_size: 0.01,
            smoothing_ratio: 1.5,
            stiffness: 100.0,
            rest_density: 1000.0,
            viscosity: 1.0,
            gravity: Vector2::new(0.0, -9.8),
            time_delta: 0.001,
            domain: Vector2::new(0.9, 0.9),
            boundary: BoundaryPolicy::Open,
        }
    }
}

impl FluidParams {
    pub fn water() -> Self {
        Self::default()
    }

    /// Thick, slow-settling fluid.
    pub fn honey() -> Self {
        Self {
            viscosity: 20.0,
            ..Self::default()
        }
    }

    /// Water on a torus: nothing ever leaves the domain.
    pub fn periodic() -> Self {
        Self {
            boundary: BoundaryPolicy::Periodic,
            ..Self::default()
        }
    }

    pub fn with_particle_size(mut self, particle_size: f64) -> Self {
        self.particle_size = particle_size;
        self
    }

    pub fn with_smoothing_ratio(mut self, smoothing_ratio: f64) -> Self {
        self.smoothing_ratio = smoothing_ratio;
        self
    }

    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_rest_density(mut self, rest_density: f64) -> Self {
        self.rest_density = rest_density;
        self
    }

    pub fn with_viscosity(mut self, viscosity: f64) -> Self {
        self.viscosity = viscosity;
        self
    }

    pub fn with_gravity(mut self, gravity: Vector2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_time_delta(mut self, time_delta: f64) -> Self {
        self.time_delta = time_delta;
        self
    }

    pub fn with_domain(mut self, width: f64, height: f64) -> Self {
        self.domain = Vector2::new(width, height);
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Kernel support radius `h`.
    pub fn smoothing_radius(&self) -> f64 {
        self.smoothing_ratio * self.particle_size
    }

    /// Mass of one particle: a `particle_size` square at rest density.
    pub fn particle_mass(&self) -> f64 {
        self.particle_size * self.particle_size * self.rest_density
    }

    /// Checks every value a simulation depends on.
    pub fn validate(&self) -> Result<(), FluidError> {
        ensure_positive("particle_size", self.particle_size)?;
        ensure_positive("smoothing_ratio", self.smoothing_ratio)?;
        ensure_positive("smoothing_radius", self.smoothing_radius())?;
        ensure_non_negative("stiffness", self.stiffness)?;
        ensure_positive("rest_density", self.rest_density)?;
        ensure_non_negative("viscosity", self.viscosity)?;
        ensure_positive("time_delta", self.time_delta)?;
        if !self.gravity.is_finite() {
            let value = if self.gravity.x.is_finite() {
                self.gravity.y
            } else {
                self.gravity.x
            };
            return Err(FluidError::InvalidParameter {
                name: "gravity",
                value,
            });
        }
        if !(self.domain.is_finite() && self.domain.x > 0.0 && self.domain.y > 0.0) {
            return Err(FluidError::InvalidDomain {
                width: self.domain.x,
                height: self.domain.y,
            });
        }
        Ok(())
    }
}

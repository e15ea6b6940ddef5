//! Validated, immutable solver constants plus the neighbor grid.

use bevy::log::info;

use super::boundary::BoundaryPolicy;
use super::error::FluidError;
use super::kernel::Poly6Kernel;
use super::params::FluidParams;
use super::particle::ParticleTemplate;
use super::spatial::{SpatialGrid, Topology};
use super::vector::Vector2;

/// Everything a solver step reads, derived once from [`FluidParams`].
///
/// The grid is the only part mutated after construction, and only by the
/// solver's rebuild stage.
#[derive(Clone, Debug)]
pub struct Environment {
    particle_size: f64,
    h: f64,
    stiffness: f64,
    rest_density: f64,
    viscosity: f64,
    mass: f64,
    gravity: Vector2,
    time_delta: f64,
    domain: Vector2,
    boundary: BoundaryPolicy,
    kernel: Poly6Kernel,
    grid: SpatialGrid,
}

impl Environment {
    pub fn new(params: &FluidParams) -> Result<Self, FluidError> {
        params.validate()?;

        let h = params.smoothing_radius();
        let topology = match params.boundary {
            BoundaryPolicy::Open => Topology::Bounded,
            BoundaryPolicy::Periodic => Topology::Periodic,
        };
        let grid = SpatialGrid::new(params.domain.x, params.domain.y, h, topology)?;

        let env = Self {
            particle_size: params.particle_size,
            h,
            stiffness: params.stiffness,
            rest_density: params.rest_density,
            viscosity: params.viscosity,
            mass: params.particle_mass(),
            gravity: params.gravity,
            time_delta: params.time_delta,
            domain: params.domain,
            boundary: params.boundary,
            kernel: Poly6Kernel::new(h),
            grid,
        };

        info!(
            "Fluid environment: {}x{} grid, h={:.4}, mass={:.4}, {:?} boundary",
            env.grid.count_x(),
            env.grid.count_y(),
            env.h,
            env.mass,
            env.boundary
        );

        Ok(env)
    }

    pub fn particle_size(&self) -> f64 {
        self.particle_size
    }

    /// Kernel support radius.
    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn rest_density(&self) -> f64 {
        self.rest_density
    }

    /// Viscosity given to new particles.
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Mass given to new particles.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn gravity(&self) -> Vector2 {
        self.gravity
    }

    pub fn time_delta(&self) -> f64 {
        self.time_delta
    }

    pub fn domain(&self) -> Vector2 {
        self.domain
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    pub fn kernel(&self) -> &Poly6Kernel {
        &self.kernel
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut SpatialGrid {
        &mut self.grid
    }

    /// Template for particles spawned into this environment.
    pub fn template(&self, kinematic: bool) -> ParticleTemplate {
        ParticleTemplate::new(self.mass, self.viscosity).with_kinematic(kinematic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_defaults() {
        let env = Environment::new(&FluidParams::default()).unwrap();
        assert!((env.h() - 0.015).abs() < 1e-12);
        assert!((env.mass() - 0.1).abs() < 1e-12);
        assert_eq!(env.kernel().support_radius(), env.h());
        assert_eq!(env.grid().topology(), Topology::Bounded);
        assert!(env.grid().count_x() as f64 * env.h() >= 0.9);
        assert_eq!(env.grid().radius(), env.h());
    }

    #[test]
    fn test_periodic_policy_uses_periodic_grid() {
        let env = Environment::new(&FluidParams::periodic()).unwrap();
        assert_eq!(env.boundary(), BoundaryPolicy::Periodic);
        assert_eq!(env.grid().topology(), Topology::Periodic);
        assert!(env.grid().cell_width() >= env.h());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = Environment::new(&FluidParams::default().with_time_delta(-0.001)).unwrap_err();
        assert_eq!(
            err,
            FluidError::InvalidParameter {
                name: "time_delta",
                value: -0.001
            }
        );
    }

    #[test]
    fn test_template_uses_derived_mass() {
        let env = Environment::new(&FluidParams::honey()).unwrap();
        let template = env.template(true);
        assert_eq!(template.mass, env.mass());
        assert_eq!(template.viscosity, 20.0);
        assert!(template.kinematic);
    }
}

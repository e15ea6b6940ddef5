//! Weakly compressible SPH solver.
//!
//! One [`Solver::step`] advances every active particle by one fixed timestep
//! in four stages, each finishing for all particles before the next starts:
//!
//! 1. Grid rebuild: every active particle is bucketed by position.
//! 2. Density and pressure: `rho = sum W(r) m` over neighbors including self,
//!    then `p = max(k (rho - rho0), 0)`.
//! 3. Forces: symmetric pressure term, artificial viscosity using the same
//!    kernel gradient, then gravity as a plain acceleration.
//! 4. Integration: semi-implicit Euler followed by the boundary policy.
//!
//! Kinematic particles take part in stages 1 and 2 only.

use std::time::{Duration, Instant};

use bevy::log::{debug, trace};

use super::boundary::BoundaryOutcome;
use super::environment::Environment;
use super::kernel::Poly6Kernel;
use super::particle::{Particle, ParticleStore};
use super::spatial::NeighborFold;
use super::vector::Vector2;

/// Softening added to `r²` in the viscosity term, in units of `h²`.
const VISCOSITY_SOFTENING: f64 = 0.01;

/// Sums `W(|r|) m` over neighbors.
struct DensityFold<'a> {
    particles: &'a [Particle],
    kernel: &'a Poly6Kernel,
}

impl NeighborFold for DensityFold<'_> {
    type State = f64;

    #[inline]
    fn fold(&mut self, candidate: usize, separation: Vector2, density: f64) -> f64 {
        density + self.kernel.value(separation.length()) * self.particles[candidate].mass
    }
}

/// Accumulates pressure and viscosity acceleration on `target`.
struct ForceFold<'a> {
    particles: &'a [Particle],
    kernel: &'a Poly6Kernel,
    target: usize,
    softening: f64,
}

impl NeighborFold for ForceFold<'_> {
    type State = Vector2;

    #[inline]
    fn fold(&mut self, candidate: usize, separation: Vector2, mut force: Vector2) -> Vector2 {
        if candidate == self.target {
            return force;
        }
        let p = &self.particles[self.target];
        let n = &self.particles[candidate];

        // Pressure
        let wp = self.kernel.gradient(separation);
        let fp = -n.mass
            * (n.pressure / (n.density * n.density) + p.pressure / (p.density * p.density));
        force += wp * fp;

        // Viscosity
        let r2 = separation.length_squared() + self.softening;
        let dv = p.velocity - n.velocity;
        let fv = n.mass * (p.viscosity + n.viscosity) / (n.density * p.density)
            * separation.dot(wp)
            / r2;
        force += dv * fv;

        force
    }
}

/// Wall-clock time spent in each stage of one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageTimings {
    pub grid: Duration,
    pub density: Duration,
    pub forces: Duration,
    pub integrate: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.grid + self.density + self.forces + self.integrate
    }
}

/// Summary of one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Active particles after the step.
    pub active: usize,
    /// Particles removed by the open boundary during the step.
    pub deactivated: usize,
    pub timings: StageTimings,
}

/// Per-simulation solver with its own scratch buffers.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    densities: Vec<f64>,
    forces: Vec<Vector2>,
    escaped: Vec<usize>,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every active particle by one timestep.
    pub fn step(&mut self, env: &mut Environment, store: &mut ParticleStore) -> StepReport {
        let start = Instant::now();
        rebuild_grid(env, store.as_slice());
        let grid_done = Instant::now();

        self.update_densities(env, store.as_mut_slice());
        let density_done = Instant::now();

        self.update_forces(env, store.as_mut_slice());
        let forces_done = Instant::now();

        self.integrate(env, store.as_mut_slice());
        let deactivated = self.escaped.len();
        for &index in &self.escaped {
            store.deactivate(index);
        }
        let integrate_done = Instant::now();

        let timings = StageTimings {
            grid: grid_done - start,
            density: density_done - grid_done,
            forces: forces_done - density_done,
            integrate: integrate_done - forces_done,
        };
        trace!(
            "SPH step: grid {:?}, density {:?}, forces {:?}, integrate {:?}",
            timings.grid,
            timings.density,
            timings.forces,
            timings.integrate
        );
        if deactivated > 0 {
            debug!("{} particle(s) left the domain", deactivated);
        }

        StepReport {
            active: store.active_count(),
            deactivated,
            timings,
        }
    }

    fn update_densities(&mut self, env: &Environment, particles: &mut [Particle]) {
        self.densities.clear();
        self.densities.resize(particles.len(), 0.0);

        let grid = env.grid();
        let mut fold = DensityFold {
            particles: &*particles,
            kernel: env.kernel(),
        };
        for (i, particle) in particles.iter().enumerate() {
            if particle.active {
                self.densities[i] = grid.fold_neighbors(particle.position, &mut fold, 0.0);
            }
        }

        let stiffness = env.stiffness();
        let rest_density = env.rest_density();
        for (particle, &density) in particles.iter_mut().zip(&self.densities) {
            if !particle.active {
                continue;
            }
            particle.density = density;
            particle.pressure = (stiffness * (density - rest_density)).max(0.0);
        }
    }

    fn update_forces(&mut self, env: &Environment, particles: &mut [Particle]) {
        self.forces.clear();
        self.forces.resize(particles.len(), Vector2::ZERO);

        let grid = env.grid();
        let gravity = env.gravity();
        let mut fold = ForceFold {
            particles: &*particles,
            kernel: env.kernel(),
            target: 0,
            softening: VISCOSITY_SOFTENING * env.h() * env.h(),
        };
        for (i, particle) in particles.iter().enumerate() {
            if !particle.active || particle.kinematic {
                continue;
            }
            fold.target = i;
            self.forces[i] = grid.fold_neighbors(particle.position, &mut fold, Vector2::ZERO) + gravity;
        }

        for (particle, &force) in particles.iter_mut().zip(&self.forces) {
            if particle.active && !particle.kinematic {
                particle.force = force;
            }
        }
    }

    fn integrate(&mut self, env: &Environment, particles: &mut [Particle]) {
        self.escaped.clear();

        let dt = env.time_delta();
        let domain = env.domain();
        let policy = env.boundary();
        for (i, particle) in particles.iter_mut().enumerate() {
            if !particle.active || particle.kinematic {
                continue;
            }

            particle.velocity2 += particle.force * dt;
            let moved = particle.position + particle.velocity2 * dt;
            particle.velocity = particle.velocity2 + particle.force * (0.5 * dt);

            match policy.apply(moved, domain) {
                BoundaryOutcome::Inside(position) => particle.position = position,
                BoundaryOutcome::Escaped => {
                    particle.position = moved;
                    self.escaped.push(i);
                }
            }
        }
    }
}

/// Clears the grid and inserts every active particle.
fn rebuild_grid(env: &mut Environment, particles: &[Particle]) {
    let grid = env.grid_mut();
    grid.clear();
    for (i, particle) in particles.iter().enumerate() {
        if particle.active {
            grid.insert(particle.position, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::boundary::{BoundaryPolicy, Rectangle};
    use crate::fluid::params::FluidParams;

    fn setup(params: &FluidParams) -> (Environment, ParticleStore, Solver) {
        (
            Environment::new(params).unwrap(),
            ParticleStore::new(),
            Solver::new(),
        )
    }

    #[test]
    fn test_isolated_particle_density_is_self_contribution() {
        let (mut env, mut store, mut solver) = setup(&FluidParams::default());
        let index = store.spawn(Vector2::new(0.45, 0.45), &env.template(false));

        solver.step(&mut env, &mut store);

        let p = store.get(index).unwrap();
        let expected = env.kernel().value(0.0) * env.mass();
        assert!((p.density - expected).abs() <= expected * 1e-12);
        assert_eq!(p.pressure, 0.0);
        assert_eq!(p.force, env.gravity());
    }

    #[test]
    fn test_pressure_never_negative() {
        let (mut env, mut store, mut solver) = setup(&FluidParams::default());

        // A loose block and a tight pair: densities both below and above rest
        let template = env.template(false);
        store
            .spawn_in_rectangle(Rectangle::new(0.1, 0.1, 0.1, 0.1), 0.02, &template)
            .unwrap();
        store.spawn(Vector2::new(0.5, 0.5), &template);
        store.spawn(Vector2::new(0.503, 0.5), &template);

        solver.step(&mut env, &mut store);

        let particles = store.as_slice();
        assert!(particles.iter().all(|p| p.pressure >= 0.0));
        assert!(particles.iter().any(|p| p.pressure > 0.0));
        assert!(particles.iter().any(|p| p.density < env.rest_density()));
    }

    #[test]
    fn test_pair_pressure_is_symmetric_and_repulsive() {
        let params = FluidParams::default()
            .with_smoothing_ratio(1.0)
            .with_gravity(Vector2::ZERO);
        let (mut env, mut store, mut solver) = setup(&params);
        let a = store.spawn(Vector2::new(0.45, 0.45), &env.template(false));
        let b = store.spawn(Vector2::new(0.455, 0.45), &env.template(false));

        solver.step(&mut env, &mut store);

        let fa = store.get(a).unwrap().force;
        let fb = store.get(b).unwrap().force;
        assert!(store.get(a).unwrap().pressure > 0.0);
        assert!(fa.x < 0.0, "left particle pushed left: {fa:?}");
        assert!(fb.x > 0.0, "right particle pushed right: {fb:?}");
        assert!((fa + fb).length() <= fa.length() * 1e-9);
        assert!(fa.y.abs() < 1e-12);
    }

    #[test]
    fn test_ballistic_motion() {
        let (mut env, mut store, mut solver) = setup(&FluidParams::default());
        let p0 = Vector2::new(0.45, 0.8);
        let index = store.spawn(p0, &env.template(false));

        let steps = 50;
        for _ in 0..steps {
            solver.step(&mut env, &mut store);
        }

        let g = env.gravity();
        let dt = env.time_delta();
        let n = steps as f64;
        let p = store.get(index).unwrap();
        assert!((p.velocity2 - g * (n * dt)).length() < 1e-12);
        let expected = p0 + g * (dt * dt * n * (n + 1.0) / 2.0);
        assert!((p.position - expected).length() < 1e-12);
        assert!((p.velocity - (p.velocity2 + g * (0.5 * dt))).length() < 1e-12);
    }

    #[test]
    fn test_kinematic_particles_stay_put() {
        let (mut env, mut store, mut solver) = setup(&FluidParams::default());
        let wall = store.spawn(Vector2::new(0.45, 0.1), &env.template(true));
        store.spawn(Vector2::new(0.45, 0.11), &env.template(false));

        for _ in 0..10 {
            solver.step(&mut env, &mut store);
        }

        let p = store.get(wall).unwrap();
        assert_eq!(p.position, Vector2::new(0.45, 0.1));
        assert_eq!(p.velocity2, Vector2::ZERO);
        assert!(p.density > env.kernel().value(0.0) * env.mass());
    }

    #[test]
    fn test_open_boundary_deactivates() {
        let (mut env, mut store, mut solver) = setup(&FluidParams::default());
        let template = env.template(false).with_velocity(Vector2::new(0.0, -5.0));
        let index = store.spawn(Vector2::new(0.3, 0.001), &template);

        let report = solver.step(&mut env, &mut store);

        assert_eq!(report.deactivated, 1);
        assert_eq!(report.active, 0);
        assert!(!store.get(index).unwrap().active);

        // Inactive particles are no longer touched
        let frozen = *store.get(index).unwrap();
        let report = solver.step(&mut env, &mut store);
        assert_eq!(report.deactivated, 0);
        assert_eq!(*store.get(index).unwrap(), frozen);
        assert!(env.grid().is_empty());
    }

    #[test]
    fn test_periodic_boundary_wraps() {
        let params = FluidParams::default().with_boundary(BoundaryPolicy::Periodic);
        let (mut env, mut store, mut solver) = setup(&params);
        let template = env.template(false).with_velocity(Vector2::new(0.0, -5.0));
        let index = store.spawn(Vector2::new(0.3, 0.001), &template);

        let report = solver.step(&mut env, &mut store);

        assert_eq!(report.deactivated, 0);
        assert_eq!(report.active, 1);
        let p = store.get(index).unwrap();
        assert!(p.active);
        assert!(p.position.y > 0.85 && p.position.y < 0.9);
    }
}

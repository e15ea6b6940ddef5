//! Smoothed-particle hydrodynamics in two dimensions.
//!
//! # Architecture
//!
//! - [`vector`]: `f64` vectors and torus arithmetic
//! - [`kernel`]: Poly6 smoothing kernel
//! - [`spatial`]: bucket grid for fixed-radius neighbor search
//! - [`params`]: simulation parameters
//! - [`environment`]: validated constants, kernel and grid
//! - [`particle`]: particle records and the slot store
//! - [`boundary`]: domain edge policies and rectangles
//! - [`solver`]: density, force and integration passes
//! - [`simulation`]: the facade hosts drive
//! - [`plugin`], [`render`]: Bevy integration
//!
//! # Example
//!
//! ```rust,no_run
//! use sph2d::fluid::prelude::*;
//!
//! let mut sim = FluidSimulation::new(&FluidParams::default()).unwrap();
//! sim.spawn_in_rectangle(Rectangle::new(0.1, 0.1, 0.2, 0.4), false).unwrap();
//! sim.advance(100);
//! for particle in sim.particles() {
//!     println!("{:?}", particle.position);
//! }
//! ```

pub mod boundary;
pub mod environment;
pub mod error;
pub mod kernel;
pub mod params;
pub mod particle;
pub mod plugin;
pub mod render;
pub mod simulation;
pub mod solver;
pub mod spatial;
pub mod vector;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::boundary::*;
    pub use super::environment::*;
    pub use super::error::*;
    pub use super::kernel::*;
    pub use super::params::*;
    pub use super::particle::*;
    pub use super::plugin::*;
    pub use super::render::*;
    pub use super::simulation::*;
    pub use super::solver::*;
    pub use super::spatial::*;
    pub use super::vector::*;
}

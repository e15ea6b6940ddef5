//! sph2d - real-time 2D fluid simulation for Bevy
//!
//! A weakly compressible SPH (smoothed-particle hydrodynamics) solver with a
//! Poly6 kernel, a uniform bucket grid for neighbor search and kinematic
//! particles for walls.
//!
//! # Features
//!
//! - **Fixed-step solver**: density, pressure, viscosity and gravity per tick
//! - **Open or periodic domains**: particles either leave for good or wrap
//! - **Kinematic walls**: static particles that push fluid without moving
//! - **Bevy integration**: plugin with pause/step control and gizmo rendering
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use sph2d::fluid::boundary::Rectangle;
//! use sph2d::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins((FluidPlugin::default(), FluidRenderPlugin))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands, mut queue: ResMut<SpawnQueue>) {
//!     commands.spawn(Camera2d);
//!     queue.push(Rectangle::new(0.1, 0.1, 0.2, 0.4), false);
//! }
//! ```

pub mod fluid;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
}

//! Fluid rendering.
//!
//! Particles are drawn as 2D gizmo circles, one per active particle.

use bevy::math::Isometry2d;
use bevy::prelude::*;

use super::simulation::FluidSimulation;

/// Configuration for fluid rendering.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct FluidRenderConfig {
    /// Color for fluid particles.
    pub fluid_color: Color,
    /// Color for kinematic (wall) particles.
    pub kinematic_color: Color,
    /// Visual diameter as a multiple of `particle_size`.
    pub size_scale: f32,
}

impl Default for FluidRenderConfig {
    fn default() -> Self {
        Self {
            fluid_color: Color::srgba_u8(173, 216, 230, 128),
            kinematic_color: Color::srgba_u8(45, 45, 45, 128),
            size_scale: 1.0,
        }
    }
}

/// Plugin that draws every active particle each frame.
#[derive(Default)]
pub struct FluidRenderPlugin;

impl Plugin for FluidRenderPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FluidRenderConfig>()
            .init_resource::<FluidRenderConfig>()
            .add_systems(PostUpdate, draw_particles);
    }
}

/// Circle center, radius and color for each active particle.
pub fn particle_circles<'a>(
    simulation: &'a FluidSimulation,
    config: &'a FluidRenderConfig,
) -> impl Iterator<Item = (Vec2, f32, Color)> + 'a {
    let radius = simulation.environment().particle_size() as f32 * 0.5 * config.size_scale;
    simulation.particles().map(move |view| {
        let color = if view.kinematic {
            config.kinematic_color
        } else {
            config.fluid_color
        };
        (
            Vec2::new(view.position.x as f32, view.position.y as f32),
            radius,
            color,
        )
    })
}

fn draw_particles(
    simulation: Option<Res<FluidSimulation>>,
    config: Res<FluidRenderConfig>,
    mut gizmos: Gizmos,
) {
    let Some(simulation) = simulation else {
        return;
    };

    for (center, radius, color) in particle_circles(&simulation, &config) {
        gizmos.circle_2d(Isometry2d::from_translation(center), radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::boundary::Rectangle;
    use crate::fluid::params::FluidParams;

    #[test]
    fn test_circles_for_active_particles_only() {
        let mut sim = FluidSimulation::new(&FluidParams::default()).unwrap();
        sim.spawn_in_rectangle(Rectangle::new(0.1, 0.1, 0.02, 0.01), false)
            .unwrap();
        sim.spawn_in_rectangle(Rectangle::new(0.5, 0.5, 0.01, 0.01), true)
            .unwrap();
        let config = FluidRenderConfig::default();

        let circles: Vec<_> = particle_circles(&sim, &config).collect();
        assert_eq!(circles.len(), 3);
        assert_eq!(
            circles
                .iter()
                .filter(|(_, _, color)| *color == config.kinematic_color)
                .count(),
            1
        );
        assert!((circles[0].0.x - 0.105).abs() < 1e-6);
        assert!((circles[0].1 - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_size_scale_widens_circles() {
        let mut sim = FluidSimulation::new(&FluidParams::default()).unwrap();
        sim.spawn_in_rectangle(Rectangle::new(0.1, 0.1, 0.01, 0.01), false)
            .unwrap();
        let config = FluidRenderConfig {
            size_scale: 2.0,
            ..default()
        };

        let (_, radius, _) = particle_circles(&sim, &config).next().unwrap();
        assert!((radius - 0.01).abs() < 1e-6);
    }
}

//! sph2d - fluid tank demo
//!
//! A block of water collapses inside an open-topped tank of kinematic wall
//! particles. Click to pour more fluid in.

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use sph2d::fluid::boundary::Rectangle;
use sph2d::prelude::*;

/// Minimum time between two click spawns.
const SPAWN_COOLDOWN: Duration = Duration::from_millis(100);

/// Screen pixels per meter.
const PIXELS_PER_METER: f32 = 700.0;

fn main() {
    let params = FluidParams::default();
    let center = Vec2::new(params.domain.x as f32, params.domain.y as f32) * 0.5;

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "sph2d - 2D SPH Fluid".to_string(),
                resolution: bevy::window::WindowResolution::new(1280, 720),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((FluidPlugin::with_params(params), FluidRenderPlugin))
        .insert_resource(SceneCenter(center))
        .init_resource::<SpawnCooldown>()
        .add_systems(Startup, (setup_scene, fill_tank))
        .add_systems(Update, (handle_input, spawn_at_cursor, update_debug_ui))
        .run();
}

#[derive(Resource)]
struct SceneCenter(Vec2);

#[derive(Resource, Default)]
struct SpawnCooldown(Option<Duration>);

/// Marker for debug text.
#[derive(Component)]
struct DebugText;

fn setup_scene(mut commands: Commands, center: Res<SceneCenter>) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_METER,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(center.0.x, center.0.y, 0.0),
    ));

    commands.spawn((
        Text::new("sph2d"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        DebugText,
    ));
}

/// Tank of 0.6 x 0.4 m with 4-layer walls, left third filled with water.
fn fill_tank(simulation: Option<ResMut<FluidSimulation>>) {
    let Some(mut simulation) = simulation else {
        return;
    };
    let inner = Rectangle::new(0.1, 0.1, 0.6, 0.4);
    let fill = Rectangle::new(0.1, 0.1, 0.2, 0.4);
    match simulation.spawn_tank(inner, fill, 4) {
        Ok(spawned) => info!("Tank scene ready with {spawned} particles"),
        Err(err) => error!("Failed to build tank scene: {err}"),
    }
}

/// Handle keyboard input for simulation control.
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    params: Res<FluidParams>,
    mut state: ResMut<FluidState>,
    mut queue: ResMut<SpawnQueue>,
    mut commands: Commands,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        state.toggle_pause();
    }

    if keyboard.just_pressed(KeyCode::KeyS) && state.paused {
        state.request_step();
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        match FluidSimulation::new(&params) {
            Ok(simulation) => {
                commands.insert_resource(simulation);
                commands.run_system_cached(fill_tank);
                queue.clear();
                state.frame = 0;
                info!("Simulation reset");
            }
            Err(err) => error!("Failed to reset simulation: {err}"),
        }
    }
}

/// Queues a `particle_size` square of fluid under the cursor while the left
/// button is held.
fn spawn_at_cursor(
    time: Res<Time>,
    mouse: Res<ButtonInput<MouseButton>>,
    params: Res<FluidParams>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut cooldown: ResMut<SpawnCooldown>,
    mut queue: ResMut<SpawnQueue>,
) {
    if !mouse.pressed(MouseButton::Left) {
        return;
    }
    let now = time.elapsed();
    if let Some(last) = cooldown.0 {
        if now < last + SPAWN_COOLDOWN {
            return;
        }
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    cooldown.0 = Some(now);
    let position = Vector2::new(world.x as f64, world.y as f64);
    queue.push(Rectangle::centered(position, params.particle_size), false);
}

/// Update the debug UI text.
fn update_debug_ui(
    state: Res<FluidState>,
    simulation: Option<Res<FluidSimulation>>,
    mut text_query: Query<&mut Text, With<DebugText>>,
) {
    let Some(simulation) = simulation else {
        return;
    };
    for mut text in text_query.iter_mut() {
        let status = if state.paused { "PAUSED" } else { "Running" };
        text.0 = format!(
            "sph2d ({})\n\n\
             Controls:\n  \
             Space - Pause/Resume\n  \
             S - Step (when paused)\n  \
             R - Reset\n  \
             Left click - Add fluid\n\n\
             Particles: {}\n\
             Tick: {} ({:.3} s)\n\
             Density Error: {:.2}%\n\
             Step: {:?}",
            status,
            simulation.active_count(),
            simulation.ticks(),
            simulation.elapsed(),
            simulation.average_density_error() * 100.0,
            simulation.last_report().timings.total()
        );
    }
}

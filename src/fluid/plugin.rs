//! Bevy plugin for fluid simulation.

use bevy::prelude::*;

use super::boundary::Rectangle;
use super::params::FluidParams;
use super::simulation::FluidSimulation;

/// Solver steps run per rendered frame unless configured otherwise.
pub const DEFAULT_STEPS_PER_FRAME: usize = 5;

/// Plugin that adds a 2D SPH simulation to a Bevy app.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use sph2d::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(FluidPlugin::with_params(FluidParams::honey()))
///         .run();
/// }
/// ```
pub struct FluidPlugin {
    params: FluidParams,
    steps_per_frame: usize,
}

impl Default for FluidPlugin {
    fn default() -> Self {
        Self::with_params(FluidParams::default())
    }
}

impl FluidPlugin {
    pub fn with_params(params: FluidParams) -> Self {
        Self {
            params,
            steps_per_frame: DEFAULT_STEPS_PER_FRAME,
        }
    }

    /// Number of solver steps per `Update`.
    pub fn with_steps_per_frame(mut self, steps_per_frame: usize) -> Self {
        self.steps_per_frame = steps_per_frame;
        self
    }
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FluidParams>()
            .register_type::<FluidState>();

        app.insert_resource(self.params.clone())
            .insert_resource(FluidState::new(self.steps_per_frame))
            .init_resource::<SpawnQueue>();

        match FluidSimulation::new(&self.params) {
            Ok(simulation) => {
                app.insert_resource(simulation).add_systems(
                    Update,
                    (drain_spawn_queue, run_simulation).chain(),
                );
            }
            Err(err) => {
                error!("Fluid simulation disabled: {err}");
            }
        }
    }
}

/// Host-side stepping state.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct FluidState {
    pub paused: bool,
    /// One step pending while paused.
    pub step_requested: bool,
    /// Frames in which the simulation advanced.
    pub frame: u64,
    pub steps_per_frame: usize,
}

impl Default for FluidState {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS_PER_FRAME)
    }
}

impl FluidState {
    pub fn new(steps_per_frame: usize) -> Self {
        Self {
            paused: false,
            step_requested: false,
            frame: 0,
            steps_per_frame,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Runs a single step on the next frame. Only meaningful while paused.
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }
}

/// A rectangle fill waiting to be applied to the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub region: Rectangle,
    pub kinematic: bool,
}

/// Spawn requests staged by input systems, drained before each batch of
/// steps.
#[derive(Resource, Clone, Debug, Default)]
pub struct SpawnQueue {
    requests: Vec<SpawnRequest>,
}

impl SpawnQueue {
    pub fn push(&mut self, region: Rectangle, kinematic: bool) {
        self.requests.push(SpawnRequest { region, kinematic });
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

/// Applies staged spawns; rejected requests are logged and dropped.
fn drain_spawn_queue(mut queue: ResMut<SpawnQueue>, mut simulation: ResMut<FluidSimulation>) {
    if queue.is_empty() {
        return;
    }
    for request in queue.requests.drain(..) {
        match simulation.spawn_in_rectangle(request.region, request.kinematic) {
            Ok(spawned) => info!(
                "Spawned {} particle(s), {} active",
                spawned,
                simulation.active_count()
            ),
            Err(err) => warn!("Rejected spawn request: {err}"),
        }
    }
}

/// Advances the simulation for this frame.
fn run_simulation(mut state: ResMut<FluidState>, mut simulation: ResMut<FluidSimulation>) {
    if state.paused {
        if !state.step_requested {
            return;
        }
        state.step_requested = false;
        simulation.step();
    } else {
        simulation.advance(state.steps_per_frame);
    }
    state.frame += 1;
}

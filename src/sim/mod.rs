pub mod simulation;

pub use simulation::{SimProps, Simulation};

use crate::particle_system::{self, Particle};
use crate::phase::Phase;

/// Mutable per-substance simulation state. One instance exists per
/// visualized substance; every stage receives it as an explicit handle
/// (never module-level state) and the orchestrator owns it.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Stored enthalpy of the sample in joules, clamped at zero.
    pub enthalpy_j: f64,
    /// Simulated time in seconds, monotonic.
    pub sim_time_s: f64,
    pub particles: Vec<Particle>,
    /// Last phase that was not a supercritical transition.
    pub last_stable_phase: Phase,
    pub transition_start_s: f64,
    pub transition_duration_s: f64,
    pub in_transition: bool,
    /// Set by the particle stage when every particle has locked to its
    /// supercritical wave slot; gates the condensed-side transition.
    pub all_particles_settled: bool,
}

impl SimulationState {
    pub fn new(particle_count: usize) -> Self {
        Self {
            enthalpy_j: 0.0,
            sim_time_s: 0.0,
            particles: particle_system::init_particles(particle_count),
            last_stable_phase: Phase::Solid,
            transition_start_s: 0.0,
            transition_duration_s: 1.0,
            in_transition: false,
            all_particles_settled: true,
        }
    }
}

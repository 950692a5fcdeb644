//! Immutable per-tick output consumed by the rendering layer.

use crate::constants::STANDARD_PRESSURE_PA;
use crate::geometry::{Bounds, Rect};
use crate::particle_system::Particle;
use crate::phase::Phase;
use serde::{Deserialize, Serialize};

/// Everything the renderer needs for one frame. Published by the
/// orchestrator after each tick; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSnapshot {
    pub phase: Phase,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub enthalpy_j: f64,
    pub melting_point_k: f64,
    pub boiling_point_k: f64,
    pub sublimation_point_k: f64,
    pub melt_progress: f64,
    pub boil_progress: f64,
    pub sublimation_progress: f64,
    pub scf_transition_progress: f64,
    pub matter_rect: Rect,
    pub vapor_bounds: Bounds,
    pub compression_factor: f64,
    pub scf_opacity: f64,
    pub particles: Vec<Particle>,
    pub path_progress: f64,
    pub mean_particle_speed: f64,
    pub power_input_w: f64,
    pub sim_time_s: f64,
}

impl PhysicsSnapshot {
    /// Snapshot for a freshly selected substance, before the first tick:
    /// a settled solid lattice at rest.
    pub fn initial(pressure_pa: f64, enthalpy_j: f64, particles: Vec<Particle>) -> Self {
        let rect = Rect::initial_footprint();
        Self {
            phase: Phase::Solid,
            temperature_k: 0.0,
            pressure_pa,
            enthalpy_j,
            melting_point_k: 0.0,
            boiling_point_k: 0.0,
            sublimation_point_k: 0.0,
            melt_progress: 0.0,
            boil_progress: 0.0,
            sublimation_progress: 0.0,
            scf_transition_progress: 0.0,
            matter_rect: rect,
            vapor_bounds: Bounds::from_rect(&rect),
            compression_factor: 1.0,
            scf_opacity: 0.0,
            particles,
            path_progress: 0.0,
            mean_particle_speed: 0.0,
            power_input_w: 0.0,
            sim_time_s: 0.0,
        }
    }

    /// JSON export for out-of-process renderers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for PhysicsSnapshot {
    fn default() -> Self {
        Self::initial(STANDARD_PRESSURE_PA, 0.0, Vec::new())
    }
}

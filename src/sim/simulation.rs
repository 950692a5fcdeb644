//! Per-substance simulation orchestrator.
//!
//! Owns one `SimulationState` and a seeded RNG, sequences the stages in
//! strict order every tick (thermodynamics → geometry → particles), and
//! publishes an immutable snapshot. Single-threaded and cooperative: the
//! external scheduler calls `tick` at whatever cadence it likes; nothing
//! inside a tick suspends.

use crate::constants::{
    BASE_PARTICLE_COUNT, MAX_FRAME_DT_S, MIN_PARTICLE_COUNT, STANDARD_PRESSURE_PA,
};
use crate::enthalpy::seed_enthalpy;
use crate::geometry::{Bounds, GeometryInput, derive_geometry};
use crate::particle_system::{ParticleInput, init_particles, update_particles};
use crate::phase::Phase;
use crate::sim::SimulationState;
use crate::snapshot::PhysicsSnapshot;
use crate::substance::SubstanceProperties;
use crate::thermodynamics::{ThermoInput, step_thermodynamics};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub struct SimProps {
    pub substance: SubstanceProperties,
    pub target_temp_k: f64,
    pub pressure_pa: f64,
    pub time_scale: f64,
    pub paused: bool,
    pub view_bounds: Bounds,
    /// 0.1 to 1.0; scales the particle count for rendering performance.
    pub quality_scale: f64,
    pub seed: u64,
}

impl SimProps {
    pub fn new(substance: SubstanceProperties) -> Self {
        Self {
            substance,
            target_temp_k: 300.0,
            pressure_pa: STANDARD_PRESSURE_PA,
            time_scale: 1.0,
            paused: false,
            view_bounds: Bounds { min_x: 0.0, max_x: 400.0, min_y: 0.0, max_y: 400.0 },
            quality_scale: 1.0,
            seed: 0,
        }
    }
}

fn effective_particle_count(quality_scale: f64) -> usize {
    let scaled = (BASE_PARTICLE_COUNT as f64 * quality_scale).floor() as usize;
    scaled.max(MIN_PARTICLE_COUNT)
}

pub struct Simulation {
    substance: SubstanceProperties,
    pub target_temp_k: f64,
    pub pressure_pa: f64,
    pub time_scale: f64,
    pub paused: bool,
    pub view_bounds: Bounds,
    pub state: SimulationState,
    rng: StdRng,
    snapshot: PhysicsSnapshot,
}

impl Simulation {
    pub fn new(props: SimProps) -> Simulation {
        let particle_count = effective_particle_count(props.quality_scale);
        let mut state = SimulationState::new(particle_count);
        state.enthalpy_j = seed_enthalpy(&props.substance, props.target_temp_k);

        let snapshot = PhysicsSnapshot::initial(
            props.pressure_pa,
            state.enthalpy_j,
            state.particles.clone(),
        );

        Simulation {
            substance: props.substance,
            target_temp_k: props.target_temp_k,
            pressure_pa: props.pressure_pa,
            time_scale: props.time_scale,
            paused: props.paused,
            view_bounds: props.view_bounds,
            state,
            rng: StdRng::seed_from_u64(props.seed),
            snapshot,
        }
    }

    pub fn substance(&self) -> &SubstanceProperties {
        &self.substance
    }

    /// Swap the visualized substance. Enthalpy is reseeded so the new sample
    /// starts consistent with the current target temperature, and the
    /// lattice restarts fully trapped.
    pub fn set_substance(&mut self, substance: SubstanceProperties) {
        self.substance = substance;
        self.state.enthalpy_j = seed_enthalpy(&self.substance, self.target_temp_k);
        self.state.particles = init_particles(self.state.particles.len());
        self.state.last_stable_phase = Phase::Solid;
        self.state.in_transition = false;
        self.state.all_particles_settled = true;
    }

    /// Rescale the particle population; the lattice restarts fully trapped
    /// when the count actually changes.
    pub fn set_quality_scale(&mut self, quality_scale: f64) {
        let count = effective_particle_count(quality_scale);
        if count != self.state.particles.len() {
            self.state.particles = init_particles(count);
        }
    }

    pub fn snapshot(&self) -> &PhysicsSnapshot {
        &self.snapshot
    }

    /// Advance one frame. `raw_dt_s` is the wall-clock delta; it is clamped
    /// to the maximum step and scaled by the time-scale multiplier. While
    /// paused this is a no-op and the previous snapshot stays current.
    pub fn tick(&mut self, raw_dt_s: f64) -> &PhysicsSnapshot {
        if self.paused {
            return &self.snapshot;
        }

        let dt = raw_dt_s.clamp(0.0, MAX_FRAME_DT_S) * self.time_scale;
        self.state.sim_time_s += dt;

        // 1. Thermodynamics and the phase state machine
        let thermo = step_thermodynamics(
            &mut self.state,
            &ThermoInput {
                props: &self.substance,
                target_temp_k: self.target_temp_k,
                pressure_pa: self.pressure_pa,
                dt_s: dt,
                time_scale: self.time_scale,
            },
        );

        // 2. Visual footprint
        let geometry = derive_geometry(&GeometryInput {
            props: &self.substance,
            phase: thermo.phase,
            pressure_pa: self.pressure_pa,
            temperature_k: thermo.temperature_k,
            melt_progress: thermo.melt_progress,
            sublimation_progress: thermo.sublimation_progress,
            scf_transition_progress: thermo.scf_transition_progress,
            view_bounds: self.view_bounds,
        });

        // 3. Particle population and kinematics
        let particles = update_particles(
            &mut self.state,
            &mut self.rng,
            &ParticleInput {
                props: &self.substance,
                phase: thermo.phase,
                detected_phase: thermo.detected_phase,
                matter_rect: geometry.matter_rect,
                vapor_bounds: geometry.vapor_bounds,
                temperature_k: thermo.temperature_k,
                dt_s: dt,
                time_scale: self.time_scale,
                scf_transition_progress: thermo.scf_transition_progress,
                boil_progress: thermo.boil_progress,
                melt_progress: thermo.melt_progress,
                sublimation_progress: thermo.sublimation_progress,
                compression_factor: geometry.compression_factor,
            },
        );

        // 4. Publish
        self.snapshot = PhysicsSnapshot {
            phase: thermo.phase,
            temperature_k: thermo.temperature_k,
            pressure_pa: self.pressure_pa,
            enthalpy_j: self.state.enthalpy_j,
            melting_point_k: thermo.melting_point_k,
            boiling_point_k: thermo.boiling_point_k,
            sublimation_point_k: thermo.sublimation_point_k,
            melt_progress: thermo.melt_progress,
            boil_progress: thermo.boil_progress,
            sublimation_progress: thermo.sublimation_progress,
            scf_transition_progress: thermo.scf_transition_progress,
            matter_rect: geometry.matter_rect,
            vapor_bounds: geometry.vapor_bounds,
            compression_factor: geometry.compression_factor,
            scf_opacity: geometry.scf_opacity,
            particles: self.state.particles.clone(),
            path_progress: particles.path_progress,
            mean_particle_speed: particles.mean_free_speed,
            power_input_w: thermo.power_w,
            sim_time_s: self.state.sim_time_s,
        };

        &self.snapshot
    }
}

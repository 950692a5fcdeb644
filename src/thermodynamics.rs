//! Enthalpy-driven phase state machine.
//!
//! One call per tick: resolves the active enthalpy ladder into a detected
//! phase, runs the supercritical hysteresis machine against the target
//! environment, substitutes sinusoidal two-phase coexistence at the
//! equilibrium boundaries, and integrates the resulting power input into the
//! stored enthalpy.

use crate::constants::{SAMPLE_MASS_KG, THERMAL_TAU_S, TRIPLE_POINT_PRESSURE_RATIO, TRIPLE_POINT_TEMP_WINDOW_K};
use crate::enthalpy::{StandardLadder, SublimationLadder};
use crate::phase::Phase;
use crate::phase_model::{boiling_point, melting_point, sublimation_point};
use crate::sim::SimulationState;
use crate::substance::SubstanceProperties;

// Supercritical transition pacing
const SCF_MIN_DURATION_FROM_CONDENSED_S: f64 = 2.5;
const SCF_MIN_DURATION_FROM_GAS_S: f64 = 1.0;
const SCF_EXIT_BASE_DURATION_S: f64 = 2.0;
const SCF_INERTIA_SCALE: f64 = 0.6;
const SCF_INERTIA_FLOOR: f64 = 0.8;

// Equilibrium oscillation gains
const EQUILIBRIUM_GAIN: f64 = 5.0;
const TRIPLE_GAIN: f64 = 2.0;

const TIME_SCALE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct ThermoInput<'a> {
    pub props: &'a SubstanceProperties,
    pub target_temp_k: f64,
    pub pressure_pa: f64,
    pub dt_s: f64,
    pub time_scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermoOutput {
    /// Phase after hysteresis and equilibrium overrides; what the renderer sees.
    pub phase: Phase,
    /// Phase straight off the enthalpy ladder, before overrides.
    pub detected_phase: Phase,
    pub temperature_k: f64,
    pub melting_point_k: f64,
    pub boiling_point_k: f64,
    pub sublimation_point_k: f64,
    pub melt_progress: f64,
    pub boil_progress: f64,
    pub sublimation_progress: f64,
    pub scf_transition_progress: f64,
    pub power_w: f64,
}

pub fn step_thermodynamics(state: &mut SimulationState, input: &ThermoInput) -> ThermoOutput {
    let props = input.props;
    let m = SAMPLE_MASS_KG;
    let c_solid = props.specific_heat_solid_j_kg_k;
    let c_liquid = props.specific_heat_liquid_j_kg_k;
    let c_gas = props.specific_heat_gas_j_kg_k;
    let time_scale = input.time_scale.max(TIME_SCALE_EPSILON);

    // Regime selection. The sublimation ladder additionally needs fusion
    // data; without it the standard ladder still applies below the triple
    // pressure.
    let in_sublimation_regime = props
        .triple_point
        .is_some_and(|tp| input.pressure_pa < tp.pressure_pa);
    let sublimation_path = in_sublimation_regime && props.enthalpy_fusion_j_mol.is_some();

    let mut melt_k = 0.0;
    let mut boil_k = 0.0;
    let mut sub_k = 0.0;
    let mut standard_ladder = None;
    let mut sublimation_ladder = None;

    let point = if sublimation_path {
        sub_k = sublimation_point(props, input.pressure_pa);
        let ladder = SublimationLadder::new(props, sub_k);
        let point = ladder.resolve(state.enthalpy_j);
        sublimation_ladder = Some(ladder);
        point
    } else {
        melt_k = melting_point(props, input.pressure_pa);
        boil_k = boiling_point(props, input.pressure_pa, melt_k);
        let ladder = StandardLadder::new(props, melt_k, boil_k);
        let point = ladder.resolve(state.enthalpy_j);
        standard_ladder = Some(ladder);
        point
    };

    let detected_phase = point.phase;
    let mut temperature_k = point.temperature_k;
    let mut melt_progress = point.melt_progress;
    let mut boil_progress = point.boil_progress;
    let mut sublimation_progress = point.sublimation_progress;

    // Critical-point test runs against the *target* environment, not the
    // enthalpy-derived temperature, so the transition starts as soon as the
    // dial crosses the critical point.
    let is_supercritical = !in_sublimation_regime
        && props.critical_point.is_some_and(|cp| {
            input.target_temp_k >= cp.temp_k && input.pressure_pa >= cp.pressure_pa
        });

    // --- Supercritical hysteresis ---
    let mut phase = detected_phase;
    let mut scf_transition_progress = 0.0;

    if is_supercritical {
        if !state.in_transition && state.last_stable_phase != Phase::Supercritical {
            state.in_transition = true;
            state.transition_start_s = state.sim_time_s;
            state.last_stable_phase = phase; // source phase for the crossing

            let source_cp = if phase == Phase::Gas { c_gas } else { c_liquid };
            let thermal_inertia = (props.molar_mass_g_mol / 20.0) * (source_cp / 1000.0);
            let physics_time = SCF_INERTIA_SCALE * thermal_inertia.max(SCF_INERTIA_FLOOR) / time_scale;

            let from_condensed = state.last_stable_phase.is_condensed();
            let min_duration = if from_condensed {
                SCF_MIN_DURATION_FROM_CONDENSED_S
            } else {
                SCF_MIN_DURATION_FROM_GAS_S
            };
            state.transition_duration_s = physics_time.max(min_duration);
        }

        let elapsed = state.sim_time_s - state.transition_start_s;
        let progress = (elapsed / state.transition_duration_s.max(TIME_SCALE_EPSILON)).min(1.0);
        scf_transition_progress = progress;

        let timer_done = progress >= 1.0;
        // Coming from anything condensed, the particle lattice must also have
        // dissolved into the wave field before the state flips.
        let requires_mechanical_lock = state.last_stable_phase != Phase::Gas;
        let ready = if requires_mechanical_lock {
            timer_done && state.all_particles_settled
        } else {
            timer_done
        };

        if ready {
            phase = Phase::Supercritical;
            state.in_transition = false;
            state.last_stable_phase = Phase::Supercritical;
        } else {
            phase = Phase::TransitionScf;
        }
    } else if state.last_stable_phase == Phase::Supercritical {
        // Exiting: fixed decaying window, no mechanical gate.
        if !state.in_transition {
            state.in_transition = true;
            state.transition_start_s = state.sim_time_s;
            state.transition_duration_s = (SCF_EXIT_BASE_DURATION_S / time_scale).max(1.0);
        }

        let elapsed = state.sim_time_s - state.transition_start_s;
        let progress = (elapsed / state.transition_duration_s.max(TIME_SCALE_EPSILON)).min(1.0);
        scf_transition_progress = 1.0 - progress;

        if progress < 1.0 {
            phase = Phase::TransitionScf;
        } else {
            state.in_transition = false;
            state.last_stable_phase = detected_phase;
            phase = detected_phase;
        }
    }

    // --- Equilibrium boundary detection (integer-Kelvin rounding) ---
    let target_rounded = input.target_temp_k.round();

    let is_triple_point = !is_supercritical
        && !in_sublimation_regime
        && props.triple_point.is_some_and(|tp| {
            let t_diff = (input.target_temp_k - tp.temp_k).abs();
            let p_ratio =
                input.pressure_pa.max(tp.pressure_pa) / input.pressure_pa.min(tp.pressure_pa);
            t_diff < TRIPLE_POINT_TEMP_WINDOW_K && p_ratio < TRIPLE_POINT_PRESSURE_RATIO
        });

    let is_equilibrium_sub = in_sublimation_regime && target_rounded == sub_k.round();
    let is_equilibrium_melt = !is_supercritical
        && !in_sublimation_regime
        && !is_triple_point
        && target_rounded == melt_k.round();
    let is_equilibrium_boil = !is_supercritical
        && !in_sublimation_regime
        && !is_triple_point
        && target_rounded == boil_k.round();

    // --- Power input ---
    let oscillation = (state.sim_time_s * 1.5).sin();
    let power_w;

    if is_triple_point {
        // Hold the sample at the fully-melted threshold while the displayed
        // melt ratio breathes around two-thirds coexistence.
        let triple_melt_ratio = 0.675 + oscillation * 0.075;
        let target_enthalpy = standard_ladder.map_or(state.enthalpy_j, |l| l.melt_end_j);
        power_w = (target_enthalpy - state.enthalpy_j) * TRIPLE_GAIN;
        phase = Phase::EquilibriumTriple;
        temperature_k = melt_k;
        melt_progress = triple_melt_ratio;
        boil_progress = 0.15;
        sublimation_progress = 0.0;
    } else if is_equilibrium_sub {
        let target_ratio = 0.5 + oscillation * 0.2;
        let target_enthalpy = sublimation_ladder.map_or(state.enthalpy_j, |l| {
            l.sub_start_j + (l.sub_end_j - l.sub_start_j) * target_ratio
        });
        power_w = (target_enthalpy - state.enthalpy_j) * EQUILIBRIUM_GAIN;
        phase = Phase::EquilibriumSub;
        temperature_k = sub_k;
        sublimation_progress = target_ratio;
    } else if is_equilibrium_melt {
        let target_ratio = 0.45 + oscillation * 0.25;
        let target_enthalpy = standard_ladder.map_or(state.enthalpy_j, |l| {
            l.melt_start_j + (l.melt_end_j - l.melt_start_j) * target_ratio
        });
        power_w = (target_enthalpy - state.enthalpy_j) * EQUILIBRIUM_GAIN;
        phase = Phase::EquilibriumMelt;
        temperature_k = melt_k;
        melt_progress = target_ratio;
    } else if is_equilibrium_boil {
        let target_ratio = 0.25 + (state.sim_time_s * 2.5).sin() * 0.15;
        let target_enthalpy = standard_ladder.map_or(state.enthalpy_j, |l| {
            l.boil_start_j + (l.boil_end_j - l.boil_start_j) * target_ratio
        });
        power_w = (target_enthalpy - state.enthalpy_j) * EQUILIBRIUM_GAIN;
        phase = Phase::EquilibriumBoil;
        temperature_k = boil_k;
        boil_progress = target_ratio;
    } else {
        // Fixed-time-constant relaxation toward the target temperature,
        // with the specific heat of whatever phase is active.
        let active_specific_heat = match phase {
            Phase::Liquid | Phase::Melting | Phase::Boiling => c_liquid,
            Phase::Gas | Phase::Supercritical => c_gas,
            Phase::Sublimation => (c_solid + c_gas) / 2.0,
            _ => c_solid,
        };
        let thermal_mass = m * active_specific_heat;
        power_w = (thermal_mass / THERMAL_TAU_S) * (input.target_temp_k - temperature_k);
    }

    // Integrate and floor. Enthalpy never goes negative.
    state.enthalpy_j += power_w * input.dt_s;
    if state.enthalpy_j < 0.0 {
        state.enthalpy_j = 0.0;
    }

    ThermoOutput {
        phase,
        detected_phase,
        temperature_k,
        melting_point_k: melt_k,
        boiling_point_k: boil_k,
        sublimation_point_k: sub_k,
        melt_progress,
        boil_progress,
        sublimation_progress,
        scf_transition_progress,
        power_w,
    }
}

//! Equilibrium phase-boundary temperatures as functions of pressure, and the
//! (T, P) → phase classifier used by both the integrator and external callers.
//!
//! All functions are total: physically impossible configurations resolve to
//! `0.0` or the never-boils sentinel instead of NaN.

use crate::constants::{
    CC_DENOMINATOR_EPSILON, MIN_PRESSURE_PA, NEVER_BOILS_K, R_GAS_J_PER_MOL_K,
    STANDARD_PRESSURE_PA, TRIPLE_POINT_PRESSURE_RATIO, TRIPLE_POINT_TEMP_WINDOW_K,
    TURNOVER_DROP_K_PER_PA, TURNOVER_PEAK_PRESSURE_PA, WATER_LIKE_SLOPE_K_PER_PA,
};
use crate::phase::Phase;
use crate::substance::SubstanceProperties;

/// Phase classification at a target (T, P), with the boundary temperatures
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePrediction {
    pub phase: Phase,
    pub melting_point_k: f64,
    pub boiling_point_k: f64,
    pub sublimation_point_k: f64,
    pub is_supercritical: bool,
    pub is_triple_point: bool,
}

fn simon_glatzel(props: &SubstanceProperties, pressure_pa: f64) -> f64 {
    let a = props.simon_a();
    let c = props.simon_c();
    let radicand = (pressure_pa - STANDARD_PRESSURE_PA) / a + 1.0;
    if radicand < 0.0 {
        return 0.0;
    }
    props.melting_point_k * radicand.powf(1.0 / c)
}

/// Melting point at `pressure_pa` via the Simon-Glatzel equation, with the
/// substance's special-behavior overrides applied first.
pub fn melting_point(props: &SubstanceProperties, pressure_pa: f64) -> f64 {
    // Absolute cutoff: below this pressure the substance has no solid phase.
    if let Some(cutoff_pa) = props.special.cant_freeze_below_pa {
        if pressure_pa < cutoff_pa {
            return 0.0;
        }
    }

    // Ice-like substances melt *earlier* under pressure.
    if props.special.water_like {
        let delta_p = pressure_pa - STANDARD_PRESSURE_PA;
        return (props.melting_point_k + WATER_LIKE_SLOPE_K_PER_PA * delta_p).max(0.0);
    }

    // Alkali-metal turnover: Simon-Glatzel up to the peak, linear decay past it.
    if props.special.high_pressure_turnover && pressure_pa >= TURNOVER_PEAK_PRESSURE_PA {
        let max_t = simon_glatzel(props, TURNOVER_PEAK_PRESSURE_PA);
        let excess = pressure_pa - TURNOVER_PEAK_PRESSURE_PA;
        return (max_t - excess * TURNOVER_DROP_K_PER_PA).max(0.0);
    }

    simon_glatzel(props, pressure_pa)
}

/// Boiling point at `pressure_pa` via the inverted Clausius-Clapeyron
/// relation, floored just above the melting point so the enthalpy ladder
/// always has a liquid bucket.
pub fn boiling_point(props: &SubstanceProperties, pressure_pa: f64, melting_point_k: f64) -> f64 {
    let dh_vap = props.boiling_enthalpy_j_mol();

    let log_pressure_term = (pressure_pa.max(1.0) / STANDARD_PRESSURE_PA).ln();
    let denominator =
        1.0 / props.boiling_point_k - R_GAS_J_PER_MOL_K * log_pressure_term / dh_vap;

    let t_boil = if denominator <= CC_DENOMINATOR_EPSILON {
        NEVER_BOILS_K
    } else {
        1.0 / denominator
    };

    if t_boil < melting_point_k {
        melting_point_k + 0.1
    } else {
        t_boil
    }
}

/// Sublimation point at `pressure_pa`, anchored at the triple point with
/// ΔHsub = ΔHfus + ΔHvap. Zero when the substance has no triple point or no
/// tabulated fusion enthalpy.
pub fn sublimation_point(props: &SubstanceProperties, pressure_pa: f64) -> f64 {
    let (triple, dh_sub_mol) = match (props.triple_point, props.sublimation_enthalpy_j_mol()) {
        (Some(tp), Some(dh)) => (tp, dh),
        _ => return 0.0,
    };

    let safe_pressure = pressure_pa.max(MIN_PRESSURE_PA);
    let log_term = (safe_pressure / triple.pressure_pa).ln();
    let inv_t_sub = 1.0 / triple.temp_k - R_GAS_J_PER_MOL_K * log_term / dh_sub_mol;

    1.0 / inv_t_sub
}

/// Classify the phase at a target (T, P).
///
/// Order matters: sublimation regime first, then supercritical, then the
/// triple-point window, then the standard ladder. Equilibrium phases are
/// detected by integer-Kelvin rounding against the boundary temperatures.
pub fn predict_state(
    props: &SubstanceProperties,
    temperature_k: f64,
    pressure_pa: f64,
) -> PhasePrediction {
    let is_sublimation_regime = props
        .triple_point
        .is_some_and(|tp| pressure_pa < tp.pressure_pa);

    let is_supercritical = !is_sublimation_regime
        && props.critical_point.is_some_and(|cp| {
            temperature_k >= cp.temp_k && pressure_pa >= cp.pressure_pa
        });

    let is_triple_point = !is_sublimation_regime
        && !is_supercritical
        && props.triple_point.is_some_and(|tp| {
            let t_diff = (temperature_k - tp.temp_k).abs();
            let p_ratio = pressure_pa.max(tp.pressure_pa) / pressure_pa.min(tp.pressure_pa);
            t_diff < TRIPLE_POINT_TEMP_WINDOW_K && p_ratio < TRIPLE_POINT_PRESSURE_RATIO
        });

    let mut melt_k = 0.0;
    let mut boil_k = 0.0;
    let mut sub_k = 0.0;

    let t_target_round = temperature_k.round();

    let phase = if is_supercritical {
        // Boundaries still computed for reference display.
        melt_k = melting_point(props, pressure_pa);
        boil_k = boiling_point(props, pressure_pa, melt_k);
        Phase::Supercritical
    } else if is_triple_point {
        // All three boundaries converge at the triple point.
        if let Some(tp) = props.triple_point {
            melt_k = tp.temp_k;
            boil_k = tp.temp_k;
            sub_k = tp.temp_k;
        }
        Phase::EquilibriumTriple
    } else if is_sublimation_regime {
        sub_k = sublimation_point(props, pressure_pa);
        if t_target_round == sub_k.round() {
            Phase::EquilibriumSub
        } else if temperature_k < sub_k {
            Phase::Solid
        } else {
            Phase::Gas
        }
    } else {
        melt_k = melting_point(props, pressure_pa);
        boil_k = boiling_point(props, pressure_pa, melt_k);

        if t_target_round == melt_k.round() {
            Phase::EquilibriumMelt
        } else if t_target_round == boil_k.round() {
            Phase::EquilibriumBoil
        } else if temperature_k < melt_k {
            Phase::Solid
        } else if temperature_k < boil_k {
            Phase::Liquid
        } else {
            Phase::Gas
        }
    };

    PhasePrediction {
        phase,
        melting_point_k: melt_k,
        boiling_point_k: boil_k,
        sublimation_point_k: sub_k,
        is_supercritical,
        is_triple_point,
    }
}

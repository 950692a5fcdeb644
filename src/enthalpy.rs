//! Conversions between stored enthalpy and (phase, temperature, progress)
//! for the fixed sample mass.
//!
//! A ladder is a monotone sequence of cumulative-enthalpy thresholds. Inside
//! a single-phase bucket the temperature is linear in enthalpy; inside a
//! latent-heat bucket the temperature pins to the boundary and the fractional
//! position becomes the transition progress.

use crate::constants::SAMPLE_MASS_KG;
use crate::math_utils::inverse_lerp;
use crate::phase::Phase;
use crate::substance::SubstanceProperties;

/// Where a given enthalpy lands on a ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderPoint {
    pub phase: Phase,
    pub temperature_k: f64,
    pub melt_progress: f64,
    pub boil_progress: f64,
    pub sublimation_progress: f64,
}

fn div_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// Standard regime: solid → melt → liquid → boil → gas.
#[derive(Debug, Clone, Copy)]
pub struct StandardLadder {
    pub melting_point_k: f64,
    pub boiling_point_k: f64,
    pub melt_start_j: f64,
    pub melt_end_j: f64,
    pub boil_start_j: f64,
    pub boil_end_j: f64,
    heat_capacity_solid: f64,
    heat_capacity_liquid: f64,
    heat_capacity_gas: f64,
}

impl StandardLadder {
    pub fn new(props: &SubstanceProperties, melting_point_k: f64, boiling_point_k: f64) -> Self {
        let m = SAMPLE_MASS_KG;
        let heat_capacity_solid = m * props.specific_heat_solid_j_kg_k;
        let heat_capacity_liquid = m * props.specific_heat_liquid_j_kg_k;
        let heat_capacity_gas = m * props.specific_heat_gas_j_kg_k;

        let melt_start_j = heat_capacity_solid * melting_point_k;
        let melt_end_j = melt_start_j + m * props.latent_heat_fusion_j_kg;
        let boil_start_j = melt_end_j + heat_capacity_liquid * (boiling_point_k - melting_point_k);
        let boil_end_j = boil_start_j + m * props.latent_heat_vaporization_j_kg;

        Self {
            melting_point_k,
            boiling_point_k,
            melt_start_j,
            melt_end_j,
            boil_start_j,
            boil_end_j,
            heat_capacity_solid,
            heat_capacity_liquid,
            heat_capacity_gas,
        }
    }

    pub fn resolve(&self, enthalpy_j: f64) -> LadderPoint {
        let (phase, temperature_k, melt_progress, boil_progress) = if enthalpy_j < self.melt_start_j
        {
            (Phase::Solid, div_or_zero(enthalpy_j, self.heat_capacity_solid), 0.0, 0.0)
        } else if enthalpy_j < self.melt_end_j {
            (
                Phase::Melting,
                self.melting_point_k,
                inverse_lerp(self.melt_start_j, self.melt_end_j, enthalpy_j),
                0.0,
            )
        } else if enthalpy_j < self.boil_start_j {
            (
                Phase::Liquid,
                self.melting_point_k
                    + div_or_zero(enthalpy_j - self.melt_end_j, self.heat_capacity_liquid),
                1.0,
                0.0,
            )
        } else if enthalpy_j < self.boil_end_j {
            (
                Phase::Boiling,
                self.boiling_point_k,
                1.0,
                inverse_lerp(self.boil_start_j, self.boil_end_j, enthalpy_j),
            )
        } else {
            (
                Phase::Gas,
                self.boiling_point_k
                    + div_or_zero(enthalpy_j - self.boil_end_j, self.heat_capacity_gas),
                1.0,
                1.0,
            )
        };

        LadderPoint { phase, temperature_k, melt_progress, boil_progress, sublimation_progress: 0.0 }
    }
}

/// Sublimation regime: solid → gas directly, no liquid bucket.
#[derive(Debug, Clone, Copy)]
pub struct SublimationLadder {
    pub sublimation_point_k: f64,
    pub sub_start_j: f64,
    pub sub_end_j: f64,
    heat_capacity_solid: f64,
    heat_capacity_gas: f64,
}

impl SublimationLadder {
    pub fn new(props: &SubstanceProperties, sublimation_point_k: f64) -> Self {
        let m = SAMPLE_MASS_KG;
        let heat_capacity_solid = m * props.specific_heat_solid_j_kg_k;
        let heat_capacity_gas = m * props.specific_heat_gas_j_kg_k;

        // Per-mass sublimation heat approximated as fusion + vaporization.
        let latent_sub_j =
            m * (props.latent_heat_fusion_j_kg + props.latent_heat_vaporization_j_kg);
        let sub_start_j = heat_capacity_solid * sublimation_point_k;
        let sub_end_j = sub_start_j + latent_sub_j;

        Self {
            sublimation_point_k,
            sub_start_j,
            sub_end_j,
            heat_capacity_solid,
            heat_capacity_gas,
        }
    }

    pub fn resolve(&self, enthalpy_j: f64) -> LadderPoint {
        // <= so zero enthalpy (absolute zero) resolves to Solid.
        if enthalpy_j <= self.sub_start_j {
            LadderPoint {
                phase: Phase::Solid,
                temperature_k: div_or_zero(enthalpy_j, self.heat_capacity_solid),
                melt_progress: 0.0,
                boil_progress: 0.0,
                sublimation_progress: 0.0,
            }
        } else if enthalpy_j < self.sub_end_j {
            LadderPoint {
                phase: Phase::Sublimation,
                temperature_k: self.sublimation_point_k,
                melt_progress: 0.0,
                boil_progress: 0.0,
                sublimation_progress: inverse_lerp(self.sub_start_j, self.sub_end_j, enthalpy_j),
            }
        } else {
            // Fully sublimated gas also reports melt/boil complete so the
            // particle stage treats it as free gas.
            LadderPoint {
                phase: Phase::Gas,
                temperature_k: self.sublimation_point_k
                    + div_or_zero(enthalpy_j - self.sub_end_j, self.heat_capacity_gas),
                melt_progress: 1.0,
                boil_progress: 1.0,
                sublimation_progress: 1.0,
            }
        }
    }
}

/// Enthalpy consistent with holding the sample at `target_temp_k`, built on
/// the standard-pressure solid/liquid ladder. Used when a substance is
/// selected so the simulation starts settled instead of at absolute zero.
pub fn seed_enthalpy(props: &SubstanceProperties, target_temp_k: f64) -> f64 {
    let m = SAMPLE_MASS_KG;
    if target_temp_k < props.melting_point_k {
        m * props.specific_heat_solid_j_kg_k * target_temp_k
    } else {
        let solid_j = m * props.specific_heat_solid_j_kg_k * props.melting_point_k;
        let fusion_j = m * props.latent_heat_fusion_j_kg;
        let liquid_j = m * props.specific_heat_liquid_j_kg_k * (target_temp_k - props.melting_point_k);
        solid_j + fusion_j + liquid_j
    }
}

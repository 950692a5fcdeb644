// src/substance.rs - Substance records with thermal and phase-boundary properties

use crate::constants::{
    DEFAULT_VAPORIZATION_ENTHALPY_J_MOL, SIMON_A_FROM_BULK_MODULUS, SIMON_DEFAULT_BULK_MODULUS_GPA,
    SIMON_DEFAULT_C,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fixed (temperature, pressure) point on the phase diagram.
/// Used for both triple and critical points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePoint {
    pub temp_k: f64,
    pub pressure_pa: f64,
}

/// Substance-specific departures from the standard melting-curve model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialBehavior {
    /// Below this pressure the substance never solidifies (helium).
    pub cant_freeze_below_pa: Option<f64>,
    /// Melting point falls linearly with pressure instead of Simon-Glatzel (ice).
    pub water_like: bool,
    /// Melting curve peaks near 3 GPa then decays (alkali metals).
    pub high_pressure_turnover: bool,
}

/// Thermophysical constants for one substance. Read-only once constructed;
/// the data layer guarantees every physical field is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceProperties {
    pub name: String,
    pub molar_mass_g_mol: f64,
    pub melting_point_k: f64,
    pub boiling_point_k: f64,
    pub latent_heat_fusion_j_kg: f64,
    pub latent_heat_vaporization_j_kg: f64,
    pub specific_heat_solid_j_kg_k: f64,
    pub specific_heat_liquid_j_kg_k: f64,
    pub specific_heat_gas_j_kg_k: f64,
    pub enthalpy_fusion_j_mol: Option<f64>,
    pub enthalpy_vaporization_j_mol: Option<f64>,
    pub triple_point: Option<PhasePoint>,
    pub critical_point: Option<PhasePoint>,
    pub simon_a_pa: Option<f64>,
    pub simon_c: Option<f64>,
    pub bulk_modulus_gpa: Option<f64>,
    pub special: SpecialBehavior,
}

impl SubstanceProperties {
    pub fn molar_mass_kg(&self) -> f64 {
        self.molar_mass_g_mol / 1000.0
    }

    /// Molar vaporization enthalpy, estimated from the per-mass latent heat
    /// when no tabulated value exists.
    pub fn vaporization_enthalpy_j_mol(&self) -> f64 {
        self.enthalpy_vaporization_j_mol
            .unwrap_or(self.latent_heat_vaporization_j_kg * self.molar_mass_kg())
    }

    /// Molar vaporization enthalpy for the boiling-point equation, which
    /// falls back to a generic constant rather than a per-mass estimate.
    pub fn boiling_enthalpy_j_mol(&self) -> f64 {
        self.enthalpy_vaporization_j_mol
            .unwrap_or(DEFAULT_VAPORIZATION_ENTHALPY_J_MOL)
    }

    /// Molar sublimation enthalpy (fusion + vaporization). None without a
    /// tabulated fusion enthalpy.
    pub fn sublimation_enthalpy_j_mol(&self) -> Option<f64> {
        let fusion = self.enthalpy_fusion_j_mol?;
        Some(fusion + self.vaporization_enthalpy_j_mol())
    }

    /// Simon-Glatzel `a` coefficient in Pa, estimated from the bulk modulus
    /// when no fitted value exists.
    pub fn simon_a(&self) -> f64 {
        self.simon_a_pa.unwrap_or_else(|| {
            self.bulk_modulus_gpa.unwrap_or(SIMON_DEFAULT_BULK_MODULUS_GPA)
                * 1e9
                * SIMON_A_FROM_BULK_MODULUS
        })
    }

    pub fn simon_c(&self) -> f64 {
        self.simon_c.unwrap_or(SIMON_DEFAULT_C)
    }
}

/// Built-in substance catalog. Values are standard-reference approximations;
/// anything the renderer selects dynamically arrives through the same struct.
pub static SUBSTANCES: Lazy<HashMap<&'static str, SubstanceProperties>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "water",
        SubstanceProperties {
            name: "water".to_string(),
            molar_mass_g_mol: 18.015,
            melting_point_k: 273.15,
            boiling_point_k: 373.15,
            latent_heat_fusion_j_kg: 334_000.0,
            latent_heat_vaporization_j_kg: 2_256_000.0,
            specific_heat_solid_j_kg_k: 2108.0,
            specific_heat_liquid_j_kg_k: 4186.0,
            specific_heat_gas_j_kg_k: 1996.0,
            enthalpy_fusion_j_mol: Some(6010.0),
            enthalpy_vaporization_j_mol: Some(40_660.0),
            triple_point: Some(PhasePoint { temp_k: 273.16, pressure_pa: 611.657 }),
            critical_point: Some(PhasePoint { temp_k: 647.096, pressure_pa: 22.064e6 }),
            simon_a_pa: None,
            simon_c: None,
            bulk_modulus_gpa: Some(2.2),
            special: SpecialBehavior { water_like: true, ..Default::default() },
        },
    );

    m.insert(
        "carbon_dioxide",
        SubstanceProperties {
            name: "carbon_dioxide".to_string(),
            molar_mass_g_mol: 44.01,
            melting_point_k: 216.6,
            boiling_point_k: 194.7, // sublimes at 1 atm; listed point is the sublimation temperature
            latent_heat_fusion_j_kg: 205_000.0,
            latent_heat_vaporization_j_kg: 574_000.0,
            specific_heat_solid_j_kg_k: 1200.0,
            specific_heat_liquid_j_kg_k: 2430.0,
            specific_heat_gas_j_kg_k: 846.0,
            enthalpy_fusion_j_mol: Some(9020.0),
            enthalpy_vaporization_j_mol: Some(16_500.0),
            triple_point: Some(PhasePoint { temp_k: 216.58, pressure_pa: 517_950.0 }),
            critical_point: Some(PhasePoint { temp_k: 304.13, pressure_pa: 7.375e6 }),
            simon_a_pa: None,
            simon_c: None,
            bulk_modulus_gpa: None,
            special: SpecialBehavior::default(),
        },
    );

    m.insert(
        "argon",
        SubstanceProperties {
            name: "argon".to_string(),
            molar_mass_g_mol: 39.948,
            melting_point_k: 83.81,
            boiling_point_k: 87.30,
            latent_heat_fusion_j_kg: 29_500.0,
            latent_heat_vaporization_j_kg: 161_000.0,
            specific_heat_solid_j_kg_k: 826.0,
            specific_heat_liquid_j_kg_k: 1078.0,
            specific_heat_gas_j_kg_k: 520.0,
            enthalpy_fusion_j_mol: Some(1180.0),
            enthalpy_vaporization_j_mol: Some(6430.0),
            triple_point: Some(PhasePoint { temp_k: 83.806, pressure_pa: 68_891.0 }),
            critical_point: Some(PhasePoint { temp_k: 150.69, pressure_pa: 4.863e6 }),
            simon_a_pa: Some(2.114e8),
            simon_c: Some(1.593),
            bulk_modulus_gpa: None,
            special: SpecialBehavior::default(),
        },
    );

    m.insert(
        "sodium",
        SubstanceProperties {
            name: "sodium".to_string(),
            molar_mass_g_mol: 22.99,
            melting_point_k: 370.87,
            boiling_point_k: 1156.0,
            latent_heat_fusion_j_kg: 113_000.0,
            latent_heat_vaporization_j_kg: 4_260_000.0,
            specific_heat_solid_j_kg_k: 1228.0,
            specific_heat_liquid_j_kg_k: 1380.0,
            specific_heat_gas_j_kg_k: 904.0,
            enthalpy_fusion_j_mol: Some(2600.0),
            enthalpy_vaporization_j_mol: Some(97_420.0),
            triple_point: None,
            critical_point: Some(PhasePoint { temp_k: 2573.0, pressure_pa: 35.0e6 }),
            simon_a_pa: None,
            simon_c: None,
            bulk_modulus_gpa: Some(6.3),
            special: SpecialBehavior { high_pressure_turnover: true, ..Default::default() },
        },
    );

    m.insert(
        "helium",
        SubstanceProperties {
            name: "helium".to_string(),
            molar_mass_g_mol: 4.0026,
            melting_point_k: 0.95,
            boiling_point_k: 4.22,
            latent_heat_fusion_j_kg: 3450.0,
            latent_heat_vaporization_j_kg: 20_800.0,
            specific_heat_solid_j_kg_k: 2500.0,
            specific_heat_liquid_j_kg_k: 4500.0,
            specific_heat_gas_j_kg_k: 5193.0,
            enthalpy_fusion_j_mol: Some(13.8),
            enthalpy_vaporization_j_mol: Some(83.0),
            triple_point: None, // no solid-liquid-gas triple point
            critical_point: Some(PhasePoint { temp_k: 5.1953, pressure_pa: 227_460.0 }),
            simon_a_pa: None,
            simon_c: None,
            bulk_modulus_gpa: None,
            special: SpecialBehavior { cant_freeze_below_pa: Some(2.5e6), ..Default::default() },
        },
    );

    m.insert(
        "iron",
        SubstanceProperties {
            name: "iron".to_string(),
            molar_mass_g_mol: 55.845,
            melting_point_k: 1811.0,
            boiling_point_k: 3134.0,
            latent_heat_fusion_j_kg: 247_000.0,
            latent_heat_vaporization_j_kg: 6_088_000.0,
            specific_heat_solid_j_kg_k: 449.0,
            specific_heat_liquid_j_kg_k: 820.0,
            specific_heat_gas_j_kg_k: 372.0,
            enthalpy_fusion_j_mol: Some(13_810.0),
            enthalpy_vaporization_j_mol: Some(340_000.0),
            triple_point: None,
            critical_point: None,
            simon_a_pa: None,
            simon_c: None,
            bulk_modulus_gpa: Some(170.0),
            special: SpecialBehavior::default(),
        },
    );

    m
});

pub fn get_substance(name: &str) -> Option<&'static SubstanceProperties> {
    SUBSTANCES.get(name)
}

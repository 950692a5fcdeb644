pub const R_GAS_J_PER_MOL_K: f64 = 8.314; // ideal gas constant
pub const STANDARD_PRESSURE_PA: f64 = 101_325.0; // 1 atm reference

// Physical constants for the visualized sample (resolution-independent)
pub const SAMPLE_MASS_KG: f64 = 0.001; // 1 gram sample drives every enthalpy ladder
pub const THERMAL_TAU_S: f64 = 0.5; // relaxation time toward the target temperature
pub const NEVER_BOILS_K: f64 = 50_000.0; // sentinel when Clausius-Clapeyron degenerates
pub const MIN_PRESSURE_PA: f64 = 1e-9; // log-term floor, keeps ln(P) finite at vacuum
pub const CC_DENOMINATOR_EPSILON: f64 = 1e-4;
pub const DEFAULT_VAPORIZATION_ENTHALPY_J_MOL: f64 = 97_000.0;

// Melting-curve special cases
pub const SIMON_DEFAULT_BULK_MODULUS_GPA: f64 = 50.0;
pub const SIMON_A_FROM_BULK_MODULUS: f64 = 0.05; // a ≈ 5% of the bulk modulus in Pa
pub const SIMON_DEFAULT_C: f64 = 2.0;
pub const TURNOVER_PEAK_PRESSURE_PA: f64 = 3e9; // alkali-metal melting curves peak near 3 GPa
pub const TURNOVER_DROP_K_PER_PA: f64 = 5e-8;
pub const WATER_LIKE_SLOPE_K_PER_PA: f64 = -7.4e-8; // ice-like negative dT/dP

// Equilibrium windows
pub const TRIPLE_POINT_TEMP_WINDOW_K: f64 = 1.0;
pub const TRIPLE_POINT_PRESSURE_RATIO: f64 = 1.1;

// Particle lattice and visual footprint
pub const LATTICE_COLS: usize = 10;
pub const LATTICE_ROWS: usize = 5;
pub const PARTICLE_RADIUS: f64 = 6.0;
pub const BASE_PARTICLE_COUNT: usize = 50;
pub const MIN_PARTICLE_COUNT: usize = 10;
pub const INIT_FOOTPRINT_W: f64 = 134.0;
pub const INIT_FOOTPRINT_H: f64 = 134.0;
pub const FOOTPRINT_CENTER_X: f64 = 200.0; // lattice column midline in view units
pub const FOOTPRINT_FLOOR_Y: f64 = 300.0; // condensed mass sits on this baseline
pub const MIN_PACKED_HEIGHT: f64 = LATTICE_ROWS as f64 * PARTICLE_RADIUS * 2.0;

// Kinematics guards
pub const MAX_PARTICLE_SPEED: f64 = 1000.0;
pub const WORLD_LIMIT: f64 = 2000.0; // beyond this a particle is considered lost and reset
pub const MAX_FRAME_DT_S: f64 = 0.1; // oversized frame deltas are clamped, not queued

pub mod constants;
pub mod enthalpy;
pub mod geometry;
pub mod math_utils;
pub mod particle_system;
pub mod phase;
pub mod phase_model;
pub mod sim;
pub mod snapshot;
pub mod substance;
pub mod thermodynamics;

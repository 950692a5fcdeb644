//! Coarse particle animation consistent with the thermodynamic phase.
//!
//! Particles are a visual proxy, not a molecular simulation: a fixed lattice
//! of "trapped" particles stands in for the condensed body, and population
//! transfer rules free or recapture them so the head-count tracks the active
//! transition progress. Free particles get simple Newtonian motion with a
//! velocity-rescaling thermostat.

use crate::constants::{
    LATTICE_COLS, LATTICE_ROWS, MAX_PARTICLE_SPEED, PARTICLE_RADIUS, WORLD_LIMIT,
};
use crate::geometry::{Bounds, Rect};
use crate::math_utils::{clamp, lerp};
use crate::phase::Phase;
use crate::sim::SimulationState;
use crate::substance::SubstanceProperties;
use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

// Supercritical wave field
const WAVE_FREQUENCY: f64 = 0.05;
const WAVE_SPEED: f64 = 5.0;
const WAVE_AMPLITUDE: f64 = 10.0;
const WAVE_LOCK_DIST_SQ: f64 = 100.0;
const SCF_STAGGER_SPAN: f64 = 0.6;
const SCF_BLEND_WINDOW: f64 = 0.4;

// Kinematics
const RISING_TOP_MARGIN: f64 = 50.0;
const STRAY_PROMOTE_PROBABILITY: f64 = 0.05;
const BOUNDARY_SWAP_PROBABILITY: f64 = 0.05;
const CONDENSE_SNAP_MARGIN: f64 = 2.0;
const BLOCK_RECAPTURE_DIST_SQ: f64 = 90_000.0;
const TRIPLE_POINT_GAS_FRACTION: f64 = 0.15;
const KINETIC_TEMP_SCALE: f64 = 50.0;
const THERMOSTAT_RELAXATION: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleState {
    /// Pinned to its lattice home; part of the condensed body.
    Trapped,
    /// Freed from the lattice, buoyant, not yet fully gaseous.
    Rising,
    Gas,
    /// Falling back toward its lattice home.
    Condensing,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Stable id; doubles as the lattice slot and FIFO priority key.
    pub id: usize,
    pub state: ParticleState,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub home: DVec2,
}

fn lattice_home(rect: &Rect, id: usize, y_offset: f64) -> DVec2 {
    let col = id % LATTICE_COLS;
    let row = id / LATTICE_COLS;
    let cell_w = rect.w / LATTICE_COLS as f64;
    let cell_h = rect.h / LATTICE_ROWS as f64;
    DVec2::new(
        rect.x + col as f64 * cell_w + cell_w / 2.0,
        rect.y + row as f64 * cell_h + cell_h / 2.0 + y_offset,
    )
}

/// Fresh fully-trapped lattice over the initial footprint.
pub fn init_particles(count: usize) -> Vec<Particle> {
    let init = Rect::initial_footprint();
    (0..count)
        .map(|i| {
            let home = lattice_home(&init, i, 0.0);
            Particle {
                id: i,
                state: ParticleState::Trapped,
                pos: home,
                vel: DVec2::ZERO,
                radius: PARTICLE_RADIUS,
                home,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ParticleInput<'a> {
    pub props: &'a SubstanceProperties,
    pub phase: Phase,
    pub detected_phase: Phase,
    pub matter_rect: Rect,
    pub vapor_bounds: Bounds,
    /// Kinematic temperature target from the integrator.
    pub temperature_k: f64,
    pub dt_s: f64,
    pub time_scale: f64,
    pub scf_transition_progress: f64,
    pub boil_progress: f64,
    pub melt_progress: f64,
    pub sublimation_progress: f64,
    pub compression_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleOutput {
    pub mean_free_speed: f64,
    /// 0..10 keyframe selector for the condensed-mass outline.
    pub path_progress: f64,
}

fn is_free(state: ParticleState) -> bool {
    matches!(state, ParticleState::Gas | ParticleState::Rising)
}

fn lowest_trapped_index(particles: &[Particle]) -> Option<usize> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.state == ParticleState::Trapped)
        .min_by_key(|(_, p)| p.id)
        .map(|(i, _)| i)
}

fn highest_index_with(particles: &[Particle], matches_state: fn(ParticleState) -> bool) -> Option<usize> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, p)| matches_state(p.state))
        .max_by_key(|(_, p)| p.id)
        .map(|(i, _)| i)
}

fn first_index_with(particles: &[Particle], state: ParticleState) -> Option<usize> {
    particles.iter().position(|p| p.state == state)
}

fn start_condensing(p: &mut Particle) {
    p.state = ParticleState::Condensing;
    p.vel.x *= 0.1;
    p.vel.y = 50.0;
}

pub fn update_particles(
    state: &mut SimulationState,
    rng: &mut impl Rng,
    input: &ParticleInput,
) -> ParticleOutput {
    let n = state.particles.len();
    let n_f = n.max(1) as f64;
    let last_stable = state.last_stable_phase;
    let sim_time = state.sim_time_s;
    let dt = input.dt_s;

    let scf_mode = matches!(input.phase, Phase::Supercritical | Phase::TransitionScf);
    let standard_gas = matches!(input.phase, Phase::Gas | Phase::Boiling);
    let boiling_like = standard_gas
        || input.phase == Phase::EquilibriumBoil
        || (scf_mode
            && matches!(last_stable, Phase::Liquid | Phase::Solid | Phase::Melting));

    // During an SCF entry from a condensed phase the boil ratio is not
    // meaningful; the transition progress drives the evaporation instead.
    let mut effective_boil_progress = input.boil_progress;
    if input.phase == Phase::TransitionScf && last_stable != Phase::Gas {
        effective_boil_progress = input.scf_transition_progress;
    }

    let sublimating = input.phase.is_sublimating();

    // --- Population transfer, at most one particle per rule per tick ---
    if sublimating {
        let target_gas = (input.sublimation_progress * n_f).floor() as usize;
        let current_gas = state
            .particles
            .iter()
            .filter(|p| is_free(p.state) || p.state == ParticleState::Condensing)
            .count();

        if current_gas < target_gas {
            // FIFO detach: lowest id is the exposed surface particle.
            if let Some(i) = lowest_trapped_index(&state.particles) {
                let p = &mut state.particles[i];
                p.state = ParticleState::Rising;
                p.vel = DVec2::new(
                    (rng.random::<f64>() - 0.5) * 60.0,
                    -60.0 - rng.random::<f64>() * 40.0,
                );
            }
        } else if current_gas > target_gas {
            // FIFO deposit: the highest-id free particle settles first,
            // filling the gap just above the remaining solid.
            if let Some(i) = highest_index_with(&state.particles, is_free) {
                start_condensing(&mut state.particles[i]);
            }
        }

        // Dynamic equilibrium: occasionally trade one particle across the
        // solid/vapor boundary without changing the head-count.
        if input.phase == Phase::EquilibriumSub
            && rng.random::<f64>() < BOUNDARY_SWAP_PROBABILITY * input.time_scale
        {
            let detach = lowest_trapped_index(&state.particles);
            let deposit =
                highest_index_with(&state.particles, |s| s == ParticleState::Gas);
            if let (Some(di), Some(gi)) = (detach, deposit) {
                let p = &mut state.particles[di];
                p.state = ParticleState::Rising;
                p.vel = DVec2::new((rng.random::<f64>() - 0.5) * 30.0, -30.0);
                let g = &mut state.particles[gi];
                g.state = ParticleState::Condensing;
                g.vel.x *= 0.1;
                g.vel.y = 30.0;
            }
        }
    } else if input.phase == Phase::EquilibriumTriple {
        let target_gas = (n_f * TRIPLE_POINT_GAS_FRACTION).floor() as usize;
        let active_gas = state.particles.iter().filter(|p| is_free(p.state)).count();

        if active_gas < target_gas {
            if let Some(i) = first_index_with(&state.particles, ParticleState::Trapped) {
                let p = &mut state.particles[i];
                p.state = ParticleState::Rising;
                p.vel = DVec2::new(
                    (rng.random::<f64>() - 0.5) * 50.0,
                    -50.0 - rng.random::<f64>() * 50.0,
                );
            }
        } else if active_gas > target_gas {
            if let Some(i) = first_index_with(&state.particles, ParticleState::Gas) {
                start_condensing(&mut state.particles[i]);
            }
        }

        if rng.random::<f64>() < BOUNDARY_SWAP_PROBABILITY * input.time_scale {
            let trapped = first_index_with(&state.particles, ParticleState::Trapped);
            let gas = first_index_with(&state.particles, ParticleState::Gas);
            if let (Some(ti), Some(gi)) = (trapped, gas) {
                let p = &mut state.particles[ti];
                p.state = ParticleState::Rising;
                p.vel = DVec2::new((rng.random::<f64>() - 0.5) * 40.0, -40.0);
                let g = &mut state.particles[gi];
                g.state = ParticleState::Condensing;
                g.vel.x *= 0.1;
                g.vel.y = 40.0;
            }
        }
    } else if boiling_like {
        let target_gas = (effective_boil_progress * n_f).floor() as usize;
        let active_gas = state.particles.iter().filter(|p| is_free(p.state)).count();

        if active_gas < target_gas {
            if let Some(i) = first_index_with(&state.particles, ParticleState::Trapped) {
                let p = &mut state.particles[i];
                p.state = ParticleState::Rising;
                p.vel = DVec2::new(
                    (rng.random::<f64>() - 0.5) * 50.0,
                    -50.0 - rng.random::<f64>() * 50.0,
                );
            }
        } else if active_gas > target_gas && !scf_mode {
            if let Some(i) = first_index_with(&state.particles, ParticleState::Gas) {
                start_condensing(&mut state.particles[i]);
            }
        }
    }

    // SCF exit toward a condensed phase: progressively recapture the wave
    // field back into the lattice.
    if input.phase == Phase::TransitionScf
        && last_stable == Phase::Supercritical
        && input.detected_phase != Phase::Gas
    {
        let target_trapped = ((1.0 - input.scf_transition_progress) * n_f).floor() as usize;
        let current_trapped = state
            .particles
            .iter()
            .filter(|p| {
                matches!(p.state, ParticleState::Trapped | ParticleState::Condensing)
            })
            .count();
        if current_trapped < target_trapped {
            if let Some(i) = first_index_with(&state.particles, ParticleState::Gas) {
                state.particles[i].state = ParticleState::Condensing;
            }
        }
    }

    // --- Kinetic statistics and thermostat factor (pre-integration) ---
    let mut kinetic_energy = 0.0;
    let mut total_speed = 0.0;
    let mut active_count = 0usize;
    for p in &state.particles {
        if p.state != ParticleState::Trapped {
            let v_sq = p.vel.length_squared();
            kinetic_energy += 0.5 * v_sq;
            total_speed += v_sq.sqrt();
            active_count += 1;
        }
    }
    let stat_count = active_count.max(1) as f64;
    let current_kinetic_temp = kinetic_energy / stat_count;
    let mean_free_speed = total_speed / stat_count;

    let mass_factor = (1.0 / input.props.molar_mass_g_mol.max(1.0)).sqrt();
    let target_kinetic_temp = input.temperature_k * mass_factor * KINETIC_TEMP_SCALE;
    // Berendsen-style rescaling: nudge, never jump.
    let lambda = if current_kinetic_temp > 0.0 {
        (1.0 + (target_kinetic_temp / current_kinetic_temp - 1.0) * THERMOSTAT_RELAXATION).sqrt()
    } else {
        1.0
    };

    let wall = input.vapor_bounds;
    let total_rows = n.div_ceil(LATTICE_COLS).max(1);
    let mut frame_settled = true;

    // --- Main per-particle pass ---
    for i in 0..n {
        let p = &mut state.particles[i];

        // Lattice home. During sublimation the lattice stays on the fixed
        // initial footprint: removing the low-id top rows exposes lower rows
        // in place instead of squashing the stack into the shrinking rect.
        if sublimating {
            p.home = lattice_home(&Rect::initial_footprint(), p.id, 0.0);
        } else {
            let squeeze = clamp(input.melt_progress, 0.0, 1.0).powf(0.4);
            let liquid_offset_y = 20.0 * squeeze * input.compression_factor;
            p.home = lattice_home(&input.matter_rect, p.id, liquid_offset_y);
        }

        // Newtonian candidate position
        if p.state == ParticleState::Gas {
            p.vel *= lambda;
        }
        let mut newton = p.pos;
        if p.state != ParticleState::Trapped {
            newton += p.vel * dt;
        }
        if is_free(p.state) {
            if newton.x - p.radius < wall.min_x {
                newton.x = wall.min_x + p.radius;
                p.vel.x = p.vel.x.abs();
            }
            if newton.x + p.radius > wall.max_x {
                newton.x = wall.max_x - p.radius;
                p.vel.x = -p.vel.x.abs();
            }
            if newton.y - p.radius < wall.min_y {
                newton.y = wall.min_y + p.radius;
                p.vel.y = p.vel.y.abs();
            }
            if newton.y + p.radius > wall.max_y {
                newton.y = wall.max_y - p.radius;
                p.vel.y = -p.vel.y.abs();
            }
        }

        // --- Supercritical wave field ---
        if scf_mode {
            let col = p.id % LATTICE_COLS;
            let row = p.id / LATTICE_COLS;
            let cell_w = wall.width() / LATTICE_COLS as f64;
            let cell_h = wall.height() / total_rows as f64;
            let target_x = wall.min_x + col as f64 * cell_w + cell_w / 2.0;
            let row_base_y = wall.min_y + row as f64 * cell_h + cell_h / 2.0;
            let wave_offset_y =
                (target_x * WAVE_FREQUENCY + sim_time * WAVE_SPEED).sin() * WAVE_AMPLITUDE;
            let scf_target_y = row_base_y + wave_offset_y;

            if input.phase == Phase::TransitionScf && last_stable == Phase::Gas {
                // Entering from gas: every particle drifts toward its wave
                // slot on a per-id staggered schedule.
                p.state = ParticleState::Gas;
                let random_factor = (p.id * 37) % n.max(1);
                let stagger_offset = random_factor as f64 / n_f * SCF_STAGGER_SPAN;
                let mut local_blend = 0.0;
                if input.scf_transition_progress > stagger_offset {
                    local_blend =
                        (input.scf_transition_progress - stagger_offset) / SCF_BLEND_WINDOW;
                }
                local_blend = clamp(local_blend, 0.0, 1.0);
                p.pos.x = lerp(newton.x, target_x, local_blend);
                p.pos.y = lerp(newton.y, scf_target_y, local_blend);
                continue;
            }

            if input.phase == Phase::TransitionScf
                && last_stable != Phase::Gas
                && last_stable != Phase::Supercritical
            {
                // Entering from a condensed phase: boil off through
                // Rising, then lock each free particle to the wave.
                if p.state != ParticleState::Gas {
                    frame_settled = false;
                }
                match p.state {
                    ParticleState::Trapped => {
                        p.pos = p.home;
                        p.vel = DVec2::ZERO;
                        continue;
                    }
                    ParticleState::Rising => {
                        p.pos = newton;
                        let dist_to_target = (p.pos.y - scf_target_y).abs();
                        if dist_to_target < 20.0 || p.pos.y < wall.min_y + RISING_TOP_MARGIN {
                            p.state = ParticleState::Gas;
                        }
                        continue;
                    }
                    ParticleState::Gas => {
                        let target = DVec2::new(target_x, scf_target_y);
                        if p.pos.distance_squared(target) < WAVE_LOCK_DIST_SQ {
                            p.pos = target
                                + DVec2::new(
                                    (rng.random::<f64>() - 0.5) * 2.0,
                                    (rng.random::<f64>() - 0.5) * 2.0,
                                );
                        } else {
                            frame_settled = false;
                            p.pos.x = lerp(p.pos.x, target_x, 0.1);
                            p.pos.y = lerp(p.pos.y, scf_target_y, 0.1);
                        }
                        continue;
                    }
                    // Condensing strays fall through to the standard pass.
                    ParticleState::Condensing => {}
                }
            }

            if input.phase == Phase::TransitionScf
                && last_stable == Phase::Supercritical
                && input.detected_phase != Phase::Gas
            {
                // Exiting toward a condensed phase: gravity-like fall back
                // onto the lattice.
                match p.state {
                    ParticleState::Trapped => {
                        p.pos = p.home;
                        p.vel = DVec2::ZERO;
                        continue;
                    }
                    ParticleState::Condensing => {
                        p.vel.y += 200.0 * dt;
                        p.vel.x += (p.home.x - p.pos.x) * 4.0 * dt;
                        p.pos += p.vel * dt;
                        if p.pos.y >= p.home.y - CONDENSE_SNAP_MARGIN {
                            p.state = ParticleState::Trapped;
                            p.pos = p.home;
                            p.vel = DVec2::ZERO;
                        }
                        continue;
                    }
                    _ => {
                        p.pos = DVec2::new(target_x, scf_target_y)
                            + DVec2::new(
                                (rng.random::<f64>() - 0.5) * 2.0,
                                (rng.random::<f64>() - 0.5) * 2.0,
                            );
                        continue;
                    }
                }
            }

            if input.phase == Phase::TransitionScf
                && last_stable == Phase::Supercritical
                && input.detected_phase == Phase::Gas
            {
                // Exiting toward gas: blend back out of the wave as the
                // transition progress decays.
                p.state = ParticleState::Gas;
                let blend = input.scf_transition_progress;
                p.pos.x = lerp(newton.x, target_x, blend);
                p.pos.y = lerp(newton.y, scf_target_y, blend);
                continue;
            }

            if input.phase == Phase::Supercritical {
                p.state = ParticleState::Gas;
                let target = DVec2::new(target_x, scf_target_y);
                if p.pos.distance_squared(target) > WAVE_LOCK_DIST_SQ {
                    p.pos.x = lerp(p.pos.x, target_x, 0.1);
                    p.pos.y = lerp(p.pos.y, scf_target_y, 0.1);
                } else {
                    p.pos = target
                        + DVec2::new(
                            (rng.random::<f64>() - 0.5) * 2.0,
                            (rng.random::<f64>() - 0.5) * 2.0,
                        );
                }
                p.vel = DVec2::new(
                    (rng.random::<f64>() - 0.5) * 200.0,
                    (rng.random::<f64>() - 0.5) * 200.0,
                );
                continue;
            }
        }

        // --- Standard pass ---
        // Non-finite coordinates are a recoverable local fault: reset to the
        // lattice, never propagate.
        if !p.pos.is_finite() {
            p.pos = p.home;
            p.vel = DVec2::ZERO;
            p.state = ParticleState::Trapped;
        }

        p.vel = p.vel.clamp(
            DVec2::splat(-MAX_PARTICLE_SPEED),
            DVec2::splat(MAX_PARTICLE_SPEED),
        );
        p.pos = newton;

        // Block phases recapture strays, except in the equilibria that keep
        // a standing vapor population.
        if input.phase.is_block() && p.state != ParticleState::Trapped {
            let dist_sq = p.pos.distance_squared(p.home);
            if (dist_sq > BLOCK_RECAPTURE_DIST_SQ || p.state == ParticleState::Gas)
                && input.phase != Phase::EquilibriumTriple
                && input.phase != Phase::EquilibriumSub
            {
                p.state = ParticleState::Condensing;
            }
        }

        if p.state == ParticleState::Trapped {
            p.pos = p.home;
            p.vel = DVec2::ZERO;
            continue;
        }

        if p.state == ParticleState::Condensing {
            p.vel.y += 300.0 * dt;
            p.vel.x += (p.home.x - p.pos.x) * 5.0 * dt;
            p.vel.x *= 0.98;
            p.pos += p.vel * dt;

            if p.pos.y >= p.home.y - CONDENSE_SNAP_MARGIN {
                p.state = ParticleState::Trapped;
                p.pos = p.home;
                p.vel = DVec2::ZERO;
            }
            continue;
        }

        if p.pos.x.abs() > WORLD_LIMIT || p.pos.y.abs() > WORLD_LIMIT {
            p.pos = p.home;
            p.vel = DVec2::ZERO;
            p.state = ParticleState::Condensing;
        }

        if p.state == ParticleState::Rising {
            let near_top = p.pos.y < wall.min_y + RISING_TOP_MARGIN;
            if near_top || rng.random::<f64>() < STRAY_PROMOTE_PROBABILITY * input.time_scale {
                p.state = ParticleState::Gas;
                let burst_angle = rng.random::<f64>() * std::f64::consts::TAU;
                let burst_magnitude = target_kinetic_temp.max(0.0).sqrt() * 3.0;
                p.vel = DVec2::new(burst_angle.cos(), burst_angle.sin()) * burst_magnitude;
            }
        }
    }

    state.all_particles_settled = frame_settled;

    // --- Pairwise elastic collisions among free particles (non-SCF) ---
    if !scf_mode {
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = state.particles.split_at_mut(j);
                let p1 = &mut head[i];
                let p2 = &mut tail[0];
                if !is_free(p1.state) || !is_free(p2.state) {
                    continue;
                }

                let delta = p2.pos - p1.pos;
                let dist_sq = delta.length_squared();
                let min_dist = p1.radius + p2.radius;
                if dist_sq >= min_dist * min_dist || dist_sq <= f64::EPSILON {
                    continue;
                }

                let dist = dist_sq.sqrt();
                let normal = delta / dist;
                let rel_vel = p2.vel - p1.vel;
                let vel_along_normal = rel_vel.dot(normal);
                if vel_along_normal > 0.0 {
                    continue; // already separating
                }

                // Equal masses: impulse splits evenly.
                let impulse = -2.0 * vel_along_normal / 2.0;
                p1.vel -= impulse * normal;
                p2.vel += impulse * normal;

                let overlap = min_dist - dist;
                p1.pos -= normal * (overlap / 2.0);
                p2.pos += normal * (overlap / 2.0);
            }
        }
    }

    // --- Path progress: keyed off the live trapped population, not time ---
    let trapped_count =
        state.particles.iter().filter(|p| p.state == ParticleState::Trapped).count();
    let contraction_progress = |trapped: usize| -> f64 {
        if trapped > 0 {
            let puddle_ratio = trapped as f64 / n_f;
            5.0 + (1.0 - puddle_ratio) * 4.5
        } else {
            10.0
        }
    };

    let path_progress = match input.phase {
        // Sublimation keeps the solid outline until the body is gone.
        Phase::Sublimation | Phase::EquilibriumSub => 0.0,
        Phase::Solid | Phase::Melting | Phase::EquilibriumMelt | Phase::EquilibriumTriple => {
            clamp(input.melt_progress * 5.0, 0.0, 5.0)
        }
        Phase::Liquid => 5.0,
        Phase::Boiling | Phase::EquilibriumBoil => {
            if trapped_count > 0 {
                contraction_progress(trapped_count)
            } else if input.phase == Phase::EquilibriumBoil {
                9.5
            } else {
                10.0
            }
        }
        Phase::TransitionScf => {
            let contracting_from_condensed =
                last_stable != Phase::Gas && last_stable != Phase::Supercritical;
            let condensing_from_scf =
                last_stable == Phase::Supercritical && input.detected_phase != Phase::Gas;
            if contracting_from_condensed || condensing_from_scf {
                contraction_progress(trapped_count)
            } else {
                10.0
            }
        }
        Phase::Gas | Phase::Supercritical => 10.0,
    };

    ParticleOutput { mean_free_speed, path_progress }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substance::get_substance;
    use approx::assert_abs_diff_eq;
    use more_asserts::{assert_gt, assert_le};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn view() -> Bounds {
        Bounds { min_x: 0.0, max_x: 400.0, min_y: 0.0, max_y: 400.0 }
    }

    fn test_input<'a>(
        props: &'a crate::substance::SubstanceProperties,
        phase: Phase,
    ) -> ParticleInput<'a> {
        ParticleInput {
            props,
            phase,
            detected_phase: phase,
            matter_rect: Rect::initial_footprint(),
            vapor_bounds: view(),
            temperature_k: 300.0,
            dt_s: 1.0 / 60.0,
            time_scale: 1.0,
            scf_transition_progress: 0.0,
            boil_progress: 0.0,
            melt_progress: 0.0,
            sublimation_progress: 0.0,
            compression_factor: 1.0,
        }
    }

    fn free_count(state: &SimulationState) -> usize {
        state.particles.iter().filter(|p| is_free(p.state)).count()
    }

    fn tick(state: &mut SimulationState, rng: &mut StdRng, input: &ParticleInput) -> ParticleOutput {
        let out = update_particles(state, rng, input);
        state.sim_time_s += input.dt_s;
        out
    }

    #[test]
    fn test_init_particles_row_major_lattice() {
        let particles = init_particles(50);
        let footprint = Rect::initial_footprint();
        assert_eq!(particles.len(), 50);
        for p in &particles {
            assert_eq!(p.state, ParticleState::Trapped);
            assert_eq!(p.pos, p.home);
            assert_eq!(p.vel, DVec2::ZERO);
            // Homes sit inside the initial footprint
            assert!(p.home.x > footprint.x && p.home.x < footprint.right());
            assert!(p.home.y > footprint.y && p.home.y < footprint.bottom());
        }
        // id 0 is the top-left slot, id 10 starts the second row
        assert_gt!(particles[10].home.y, particles[0].home.y);
        assert_abs_diff_eq!(particles[10].home.x, particles[0].home.x, epsilon = 1e-9);
    }

    #[test]
    fn test_boiling_population_converges_to_target() {
        let water = get_substance("water").unwrap();
        let mut state = SimulationState::new(20);
        let mut rng = rng();
        let mut input = test_input(water, Phase::Boiling);
        input.boil_progress = 0.5;
        input.melt_progress = 1.0;

        for _ in 0..60 {
            tick(&mut state, &mut rng, &input);
        }
        assert_eq!(free_count(&state), 10, "free population must reach floor(0.5 * 20)");
    }

    #[test]
    fn test_triple_point_population_holds_fixed_fraction() {
        let water = get_substance("water").unwrap();
        let mut state = SimulationState::new(20);
        let mut rng = rng();
        let input = test_input(water, Phase::EquilibriumTriple);

        for _ in 0..120 {
            tick(&mut state, &mut rng, &input);
        }
        // floor(0.15 * 20) = 3 free particles at dynamic equilibrium
        assert_eq!(free_count(&state), 3);
    }

    #[test]
    fn test_sublimation_detaches_lowest_ids_first() {
        let co2 = get_substance("carbon_dioxide").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        let mut input = test_input(co2, Phase::Sublimation);
        input.sublimation_progress = 0.3; // target 3 free

        for _ in 0..3 {
            tick(&mut state, &mut rng, &input);
        }
        let freed: Vec<usize> = state
            .particles
            .iter()
            .filter(|p| p.state != ParticleState::Trapped)
            .map(|p| p.id)
            .collect();
        assert_eq!(freed, vec![0, 1, 2], "lowest ids leave the lattice first");
    }

    #[test]
    fn test_sublimation_deposits_highest_ids_first() {
        let co2 = get_substance("carbon_dioxide").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();

        // Free ids 0..5 as settled gas
        for p in state.particles.iter_mut().take(5) {
            p.state = ParticleState::Gas;
            p.pos.y -= 100.0;
        }

        let mut input = test_input(co2, Phase::Sublimation);
        input.sublimation_progress = 0.0; // everything should come back
        tick(&mut state, &mut rng, &input);

        // Highest free id (4) is the first chosen for deposition
        assert_eq!(state.particles[4].state, ParticleState::Condensing);
    }

    #[test]
    fn test_trapped_particles_snap_to_home_every_tick() {
        let iron = get_substance("iron").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        state.particles[3].pos += DVec2::new(40.0, -25.0);
        state.particles[3].vel = DVec2::new(5.0, 5.0);

        tick(&mut state, &mut rng, &test_input(iron, Phase::Solid));
        let p = &state.particles[3];
        assert_eq!(p.pos, p.home);
        assert_eq!(p.vel, DVec2::ZERO);
    }

    #[test]
    fn test_condensing_particle_falls_and_snaps() {
        let iron = get_substance("iron").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        state.particles[0].state = ParticleState::Condensing;
        state.particles[0].pos = state.particles[0].home - DVec2::new(0.0, 80.0);
        state.particles[0].vel = DVec2::ZERO;

        let input = test_input(iron, Phase::Liquid);
        for _ in 0..600 {
            tick(&mut state, &mut rng, &input);
            if state.particles[0].state == ParticleState::Trapped {
                break;
            }
        }
        let p = &state.particles[0];
        assert_eq!(p.state, ParticleState::Trapped);
        assert_eq!(p.pos, p.home);
    }

    #[test]
    fn test_non_finite_particle_is_repaired() {
        let iron = get_substance("iron").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        state.particles[2].state = ParticleState::Gas;
        state.particles[2].pos = DVec2::new(f64::NAN, 150.0);

        tick(&mut state, &mut rng, &test_input(iron, Phase::Gas));
        let p = &state.particles[2];
        assert!(p.pos.is_finite());
        assert_eq!(p.state, ParticleState::Trapped);
        assert_eq!(p.pos, p.home);
    }

    #[test]
    fn test_out_of_world_particle_is_recaptured() {
        let iron = get_substance("iron").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        state.particles[1].state = ParticleState::Gas;
        state.particles[1].pos = DVec2::new(5000.0, -5000.0);
        state.particles[1].vel = DVec2::ZERO;
        // Park it outside the walls so reflection cannot pull it back first.
        let mut input = test_input(iron, Phase::Gas);
        input.vapor_bounds = Bounds { min_x: -1e6, max_x: 1e6, min_y: -1e6, max_y: 1e6 };

        tick(&mut state, &mut rng, &input);
        let p = &state.particles[1];
        assert_eq!(p.state, ParticleState::Condensing);
        assert_eq!(p.pos, p.home);
    }

    #[test]
    fn test_thermostat_accelerates_cold_gas() {
        let water = get_substance("water").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        for p in state.particles.iter_mut() {
            p.state = ParticleState::Gas;
            p.pos.y -= 100.0;
            p.vel = DVec2::new(1.0, 0.0); // far below the kinetic target
        }

        let mut input = test_input(water, Phase::Gas);
        input.temperature_k = 1000.0;
        input.boil_progress = 1.0;
        input.melt_progress = 1.0;

        let first = tick(&mut state, &mut rng, &input);
        let mut last = first;
        for _ in 0..120 {
            last = tick(&mut state, &mut rng, &input);
        }
        assert_gt!(last.mean_free_speed, first.mean_free_speed * 2.0);
    }

    #[test]
    fn test_collisions_separate_overlapping_gas_particles() {
        let water = get_substance("water").unwrap();
        let mut state = SimulationState::new(10);
        let mut rng = rng();
        state.particles[0].state = ParticleState::Gas;
        state.particles[1].state = ParticleState::Gas;
        state.particles[0].pos = DVec2::new(200.0, 200.0);
        state.particles[1].pos = DVec2::new(204.0, 200.0); // overlap: radii sum to 12
        state.particles[0].vel = DVec2::new(20.0, 0.0);
        state.particles[1].vel = DVec2::new(-20.0, 0.0);

        let mut input = test_input(water, Phase::Gas);
        input.boil_progress = 1.0;
        tick(&mut state, &mut rng, &input);

        let gap = state.particles[1].pos.x - state.particles[0].pos.x;
        assert_gt!(gap, 4.0, "overlap must be pushed apart");
        // Head-on equal-mass elastic collision swaps the velocities
        assert_le!(state.particles[0].vel.x, 0.0);
    }

    #[test]
    fn test_path_progress_by_phase() {
        let water = get_substance("water").unwrap();
        let mut rng = rng();

        let mut state = SimulationState::new(10);
        let mut input = test_input(water, Phase::Liquid);
        input.melt_progress = 1.0;
        let out = tick(&mut state, &mut rng, &input);
        assert_eq!(out.path_progress, 5.0);

        // Sublimation pins the solid outline
        let mut state = SimulationState::new(10);
        let mut input = test_input(water, Phase::Sublimation);
        input.sublimation_progress = 0.4;
        let out = tick(&mut state, &mut rng, &input);
        assert_eq!(out.path_progress, 0.0);

        // Boiling tracks the live trapped population: all trapped -> 5.0
        let mut state = SimulationState::new(10);
        let mut input = test_input(water, Phase::Boiling);
        input.melt_progress = 1.0;
        let out = tick(&mut state, &mut rng, &input);
        assert_abs_diff_eq!(out.path_progress, 5.0, epsilon = 0.5);

        // Gas renders the fully-expanded outline
        let mut state = SimulationState::new(10);
        let out = tick(&mut state, &mut rng, &test_input(water, Phase::Gas));
        assert_eq!(out.path_progress, 10.0);
    }

    #[test]
    fn test_same_seed_reproduces_trajectories() {
        let water = get_substance("water").unwrap();
        let mut input = test_input(water, Phase::Boiling);
        input.boil_progress = 0.6;
        input.melt_progress = 1.0;

        let run = |seed: u64| {
            let mut state = SimulationState::new(20);
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..90 {
                tick(&mut state, &mut rng, &input);
            }
            state.particles
        };

        assert_eq!(run(42), run(42));
        // Different seed should visibly diverge
        let a = run(42);
        let b = run(43);
        assert!(a.iter().zip(&b).any(|(x, y)| x.pos != y.pos));
    }
}

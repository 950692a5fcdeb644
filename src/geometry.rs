//! Maps thermodynamic output to the visual footprint: the condensed-mass
//! rectangle, the vapor bounds, and the supercritical fog opacity.
//!
//! Pure derivation, no internal state. View units match the particle lattice.

use crate::constants::{
    FOOTPRINT_CENTER_X, FOOTPRINT_FLOOR_Y, INIT_FOOTPRINT_H, INIT_FOOTPRINT_W, MIN_PACKED_HEIGHT,
    STANDARD_PRESSURE_PA,
};
use crate::math_utils::clamp;
use crate::phase::Phase;
use crate::substance::SubstanceProperties;
use serde::{Deserialize, Serialize};

const MELT_SQUEEZE_EXPONENT: f64 = 0.4;
const MELT_WIDTH_SPREAD: f64 = 166.0;
const MELT_HEIGHT_DROP: f64 = 64.0;
const COMPRESSION_LIMIT: f64 = 0.6; // even infinite pressure leaves 40% of the height

// Vapor expansion: thermal drive over a log-pressure density term, mapped
// asymptotically so the box approaches but never reaches the viewport edge.
const VAPOR_TEMP_NORM_K: f64 = 6000.0;
const VAPOR_PRESSURE_EXPONENT: f64 = 0.4;
const VAPOR_HALF_MAX: f64 = 0.075;
const MIN_VAPOR_PRESSURE_ATM: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// The footprint every lattice and vapor calculation starts from.
    pub fn initial_footprint() -> Rect {
        Rect {
            x: FOOTPRINT_CENTER_X - INIT_FOOTPRINT_W / 2.0,
            y: FOOTPRINT_FLOOR_Y - INIT_FOOTPRINT_H,
            w: INIT_FOOTPRINT_W,
            h: INIT_FOOTPRINT_H,
        }
    }
}

/// Axis-aligned bounds, used for both the viewport and the vapor domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_rect(rect: &Rect) -> Bounds {
        Bounds { min_x: rect.x, max_x: rect.right(), min_y: rect.y, max_y: rect.bottom() }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeometryInput<'a> {
    pub props: &'a SubstanceProperties,
    pub phase: Phase,
    pub pressure_pa: f64,
    pub temperature_k: f64,
    pub melt_progress: f64,
    pub sublimation_progress: f64,
    pub scf_transition_progress: f64,
    pub view_bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryOutput {
    pub matter_rect: Rect,
    pub vapor_bounds: Bounds,
    pub compression_factor: f64,
    pub scf_opacity: f64,
}

/// Hydrostatic compression of the condensed body. In (0, 1] whenever the
/// bulk modulus is defined, exactly 1 when it is not.
pub fn compression_factor(props: &SubstanceProperties, pressure_pa: f64) -> f64 {
    match props.bulk_modulus_gpa {
        Some(k_gpa) if k_gpa.is_finite() && k_gpa > 0.0 => {
            let k_pa = k_gpa * 1e9;
            1.0 - COMPRESSION_LIMIT * (pressure_pa / (pressure_pa + k_pa))
        }
        _ => 1.0,
    }
}

pub fn derive_geometry(input: &GeometryInput) -> GeometryOutput {
    let compression = compression_factor(input.props, input.pressure_pa);
    let sublimating = input.phase.is_sublimating();

    let (mut target_w, mut target_h) = if sublimating {
        // No puddle spreading: width holds, height shrinks linearly and is
        // allowed to vanish completely.
        (INIT_FOOTPRINT_W, INIT_FOOTPRINT_H * (1.0 - input.sublimation_progress))
    } else {
        let melt = clamp(input.melt_progress, 0.0, 1.0);
        let squeeze = melt.powf(MELT_SQUEEZE_EXPONENT);
        (
            INIT_FOOTPRINT_W + MELT_WIDTH_SPREAD * melt,
            INIT_FOOTPRINT_H - MELT_HEIGHT_DROP * squeeze,
        )
    };

    if target_h > 0.0 {
        target_h *= compression;
        if target_h < MIN_PACKED_HEIGHT && !sublimating {
            target_h = MIN_PACKED_HEIGHT;
        }
    }
    if target_h < 0.0 {
        target_h = 0.0;
    }
    if target_w < 0.0 {
        target_w = 0.0;
    }

    let matter_rect = Rect {
        x: FOOTPRINT_CENTER_X - target_w / 2.0,
        y: FOOTPRINT_FLOOR_Y - target_h,
        w: target_w,
        h: target_h,
    };

    let mut vapor_bounds = Bounds::from_rect(&matter_rect);

    if input.phase.has_vapor() {
        let view = input.view_bounds;
        let base = Rect::initial_footprint();

        // Thermal drive over a vapor-density proxy: hotter expands, higher
        // pressure (log scale) contracts.
        let t_norm = input.temperature_k.max(1.0) / VAPOR_TEMP_NORM_K;
        let p_atm = (input.pressure_pa / STANDARD_PRESSURE_PA).max(MIN_VAPOR_PRESSURE_ATM);
        let vapor_density = 10f64.powf(VAPOR_PRESSURE_EXPONENT * p_atm.log10());
        let v_prop = t_norm / vapor_density.max(f64::EPSILON);
        let expansion = v_prop / (v_prop + VAPOR_HALF_MAX);

        let left_dist = base.x - view.min_x;
        let right_dist = view.max_x - base.right();
        let top_dist = base.y - view.min_y;
        let bottom_dist = view.max_y - base.bottom();

        vapor_bounds = Bounds {
            min_x: (base.x - left_dist * expansion).max(view.min_x),
            max_x: (base.right() + right_dist * expansion).min(view.max_x),
            min_y: (base.y - top_dist * expansion).max(view.min_y),
            max_y: (base.bottom() + bottom_dist * expansion).min(view.max_y),
        };
    }

    let scf_opacity = if matches!(input.phase, Phase::Supercritical | Phase::TransitionScf) {
        let max_vol = input.view_bounds.width() * input.view_bounds.height();
        let min_vol = INIT_FOOTPRINT_W * INIT_FOOTPRINT_H;
        let current_vol = vapor_bounds.width() * vapor_bounds.height();
        let span = max_vol - min_vol;
        let density_ratio = if span.abs() < f64::EPSILON {
            0.0
        } else {
            (current_vol - min_vol) / span
        };
        clamp(0.8 - density_ratio * 0.6, 0.2, 0.8) * input.scf_transition_progress
    } else {
        0.0
    };

    GeometryOutput { matter_rect, vapor_bounds, compression_factor: compression, scf_opacity }
}

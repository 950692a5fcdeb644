use serde::{Deserialize, Serialize};

/// Matter phase state, including the transient and equilibrium states the
/// integrator can report. This is a closed set; every stage matches on it
/// exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Solid,
    Melting,
    EquilibriumMelt,
    Liquid,
    Boiling,
    EquilibriumBoil,
    EquilibriumTriple,
    Sublimation,
    EquilibriumSub,
    Gas,
    TransitionScf,
    Supercritical,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Solid => "solid",
            Phase::Melting => "melting",
            Phase::EquilibriumMelt => "equilibrium-melt",
            Phase::Liquid => "liquid",
            Phase::Boiling => "boiling",
            Phase::EquilibriumBoil => "equilibrium-boil",
            Phase::EquilibriumTriple => "equilibrium-triple",
            Phase::Sublimation => "sublimation",
            Phase::EquilibriumSub => "equilibrium-sub",
            Phase::Gas => "gas",
            Phase::TransitionScf => "transition-scf",
            Phase::Supercritical => "supercritical",
        }
    }

    /// Phases whose sample still has a condensed body holding a lattice.
    pub fn is_condensed(self) -> bool {
        matches!(
            self,
            Phase::Solid | Phase::Melting | Phase::EquilibriumMelt | Phase::Liquid | Phase::Boiling
        )
    }

    /// Phases where free particles occupy the vapor bounds.
    pub fn has_vapor(self) -> bool {
        matches!(
            self,
            Phase::Gas
                | Phase::Boiling
                | Phase::EquilibriumBoil
                | Phase::EquilibriumTriple
                | Phase::Supercritical
                | Phase::TransitionScf
                | Phase::Sublimation
                | Phase::EquilibriumSub
        )
    }

    /// Phases that keep particles pinned to the lattice unless a transfer
    /// rule explicitly frees them.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Phase::Solid
                | Phase::Liquid
                | Phase::Melting
                | Phase::EquilibriumMelt
                | Phase::EquilibriumTriple
                | Phase::EquilibriumSub
        )
    }

    pub fn is_sublimating(self) -> bool {
        matches!(self, Phase::Sublimation | Phase::EquilibriumSub)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

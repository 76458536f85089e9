use serde::{Deserialize, Serialize};

use crate::core::Float;

/// What a [`Solve`] targets: a ray height, or the paraxial best-focus
/// position.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum SolveTarget {
    MarginalRayHeight(Float),
    ChiefRayHeight(Float),
    QuickFocus,
}

/// A declarative constraint on a surface's curvature or the following
/// gap's thickness, resolved once at [`crate::sequential_model::SequentialModel`]
/// construction against the paraxial engine and then frozen into a plain
/// numeric value -- solves are never re-evaluated during a later trace.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum Solve {
    Curvature { target: SolveTarget },
    Thickness { target: SolveTarget },
}

impl Solve {
    /// Whether resolving this solve needs the ray-transfer state of the
    /// surface immediately preceding it (true for `Thickness`; `Curvature`
    /// only needs the surface's own aperture/index context).
    pub fn needs_preceding_surface(&self) -> bool {
        matches!(self, Solve::Thickness { .. })
    }

    pub fn target(&self) -> SolveTarget {
        match self {
            Solve::Curvature { target } | Solve::Thickness { target } => *target,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::core::Float;
use crate::error::OpticsError;
use crate::materials::Material;
use crate::specs::solves::Solve;

/// Specifies a gap (a thickness of a homogeneous material) in a sequential
/// optical system model.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GapSpec {
    pub thickness: Float,
    pub material: Material,
    /// A declarative constraint on this gap's thickness, resolved once at
    /// [`crate::sequential_model::SequentialModel`] construction.
    pub thickness_solve: Option<Solve>,
}

impl GapSpec {
    pub fn air(thickness: Float) -> Self {
        Self {
            thickness,
            material: Material::air(),
            thickness_solve: None,
        }
    }

    pub fn validate(&self) -> Result<(), OpticsError> {
        if self.thickness.is_nan() {
            return Err(OpticsError::InvalidMaterialData(
                "gap thickness must be a number".into(),
            ));
        }
        // Negative, finite thicknesses are valid after a fold mirror; only
        // NaN is rejected above.
        Ok(())
    }
}

/// Creates a [`GapSpec`] with a constant refractive index, mirroring the
/// common case of a catalog-free "design" glass.
#[macro_export]
macro_rules! gap {
    ($thickness:expr, $n:expr) => {
        $crate::specs::gaps::GapSpec {
            thickness: $thickness,
            material: $crate::materials::Material::constant($n),
            thickness_solve: None,
        }
    };
}

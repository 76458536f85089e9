//! Declarative, serializable specifications for building a
//! [`crate::sequential_model::SequentialModel`]. Specs validate their own
//! invariants and convert into the internal runtime types; they carry no
//! behavior beyond that.
pub mod aperture;
pub mod apodization;
pub mod fields;
pub mod gaps;
pub mod physical_aperture;
pub mod solves;
pub mod surfaces;

use serde::{Deserialize, Serialize};

use crate::core::Float;

/// A rotation of a surface or frame about its local x, y, and z axes, in
/// radians, applied in the same z-y-x order used by
/// [`crate::core::frame::Frame`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Rotation3D {
    pub rx: Float,
    pub ry: Float,
    pub rz: Float,
}

impl Rotation3D {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.rx == 0.0 && self.ry == 0.0 && self.rz == 0.0
    }
}
